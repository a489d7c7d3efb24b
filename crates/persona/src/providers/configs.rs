use anyhow::{anyhow, Result};
use std::env;
use std::time::Duration;

pub const OPENAI_HOST: &str = "https://api.openai.com";
pub const OPENAI_MODEL: &str = "gpt-4o-mini";
pub const OPENAI_TIMEOUT: Duration = Duration::from_secs(60);

/// Helper function to get environment variables with error handling
fn get_env(key: &str, required: bool, default: Option<String>) -> Result<Option<String>> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(Some(value)),
        Ok(_) | Err(env::VarError::NotPresent) if !required => Ok(default),
        Ok(_) | Err(env::VarError::NotPresent) => Err(anyhow!(
            "Environment variable '{}' is required but not set.",
            key
        )),
        Err(e) => Err(e.into()),
    }
}

#[derive(Debug, Clone)]
pub struct OpenAiProviderConfig {
    pub host: String,
    pub api_key: String,
    pub model: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<i32>,
    pub timeout: Duration,
}

impl OpenAiProviderConfig {
    pub fn new<K: Into<String>>(api_key: K) -> Self {
        Self {
            host: OPENAI_HOST.to_string(),
            api_key: api_key.into(),
            model: OPENAI_MODEL.to_string(),
            temperature: None,
            max_tokens: None,
            timeout: OPENAI_TIMEOUT,
        }
    }

    /// Load configuration from `OPENAI_API_KEY` (required), `OPENAI_HOST`, `OPENAI_MODEL`
    /// and `OPENAI_TIMEOUT_SECS`
    pub fn from_env() -> Result<Self> {
        let api_key = get_env("OPENAI_API_KEY", true, None)?
            .ok_or_else(|| anyhow!("OpenAI API key should be present"))?;
        let host = get_env("OPENAI_HOST", false, None)?.unwrap_or_else(|| OPENAI_HOST.to_string());
        let model =
            get_env("OPENAI_MODEL", false, None)?.unwrap_or_else(|| OPENAI_MODEL.to_string());
        let timeout = match get_env("OPENAI_TIMEOUT_SECS", false, None)? {
            Some(secs) => Duration::from_secs(
                secs.parse()
                    .map_err(|_| anyhow!("OPENAI_TIMEOUT_SECS must be a whole number of seconds"))?,
            ),
            None => OPENAI_TIMEOUT,
        };

        Ok(Self {
            host,
            api_key,
            model,
            temperature: None,
            max_tokens: None,
            timeout,
        })
    }
}
