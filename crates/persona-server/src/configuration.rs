use crate::error::{to_env_var, ConfigError};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment};
use persona::notifier::PushoverConfig;
use persona::providers::configs::{OpenAiProviderConfig, OPENAI_HOST, OPENAI_MODEL};
use serde::Deserialize;
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerSettings {
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

#[derive(Debug, Deserialize)]
pub struct ProviderSettings {
    #[serde(default = "default_openai_host")]
    pub host: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub max_tokens: Option<i32>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ProviderSettings {
    pub fn into_config(self) -> Result<OpenAiProviderConfig, ConfigError> {
        let api_key = self
            .api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar {
                env_var: to_env_var("provider.api_key"),
            })?;

        Ok(OpenAiProviderConfig {
            host: self.host,
            api_key,
            model: self.model,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            timeout: Duration::from_secs(self.timeout_secs),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct PersonaSettings {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_profile")]
    pub profile: PathBuf,
    #[serde(default = "default_summary")]
    pub summary: PathBuf,
    /// Optional tera template replacing the built-in system prompt
    #[serde(default)]
    pub template: Option<PathBuf>,
    #[serde(default = "default_max_rounds")]
    pub max_rounds: usize,
}

#[derive(Debug, Default, Deserialize)]
pub struct PushoverSettings {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
}

impl PushoverSettings {
    /// None unless both credentials are present
    pub fn into_config(self) -> Option<PushoverConfig> {
        let token = self.token.filter(|v| !v.is_empty())?;
        let user = self.user.filter(|v| !v.is_empty())?;
        Some(PushoverConfig::new(token, user))
    }
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    pub provider: ProviderSettings,
    pub persona: PersonaSettings,
    #[serde(default)]
    pub pushover: PushoverSettings,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::load_and_validate()
    }

    fn load_and_validate() -> Result<Self, ConfigError> {
        let builder = Config::builder()
            // Server defaults
            .set_default("server.host", default_host())?
            .set_default("server.port", default_port())?
            // Provider defaults
            .set_default("provider.host", default_openai_host())?
            .set_default("provider.model", default_model())?
            .set_default("provider.timeout_secs", default_timeout_secs())?
            // Persona defaults
            .set_default("persona.name", default_name())?
            .set_default("persona.profile", default_profile().display().to_string())?
            .set_default("persona.summary", default_summary().display().to_string())?
            .set_default("persona.max_rounds", default_max_rounds() as u64)?
            .set_default("log_level", default_log_level())?;

        let config = with_conventional_env(builder)?
            // Layer on the environment variables
            .add_source(
                Environment::with_prefix("PERSONA")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        match config.try_deserialize::<Self>() {
            Ok(settings) => Ok(settings),
            Err(err) => {
                tracing::debug!("Configuration error: {:?}", &err);
                if let config::ConfigError::NotFound(field) = &err {
                    let env_var = to_env_var(field);
                    Err(ConfigError::MissingEnvVar { env_var })
                } else {
                    Err(ConfigError::Other(err))
                }
            }
        }
    }
}

/// Accept the variables the hosting platform and the upstream services
/// document as defaults. `PERSONA_*` variables still take precedence.
fn with_conventional_env(
    mut builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    for (var, key) in [
        ("OPENAI_API_KEY", "provider.api_key"),
        ("PUSHOVER_TOKEN", "pushover.token"),
        ("PUSHOVER_USER", "pushover.user"),
    ] {
        if let Ok(value) = env::var(var) {
            builder = builder.set_default(key, value)?;
        }
    }

    if let Ok(port) = env::var("PORT") {
        match port.parse::<u16>() {
            Ok(port) => builder = builder.set_default("server.port", port)?,
            Err(_) => tracing::warn!("Ignoring PORT={}, not a valid port", port),
        }
    }
    Ok(builder)
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    7860
}

fn default_model() -> String {
    OPENAI_MODEL.to_string()
}

fn default_openai_host() -> String {
    OPENAI_HOST.to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_name() -> String {
    "Michael Salami".to_string()
}

fn default_profile() -> PathBuf {
    PathBuf::from("me/linkedin.pdf")
}

fn default_summary() -> PathBuf {
    PathBuf::from("me/summary.txt")
}

fn default_max_rounds() -> usize {
    persona::agent::DEFAULT_MAX_ROUNDS
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clean_env() {
        for (key, _) in env::vars() {
            if key.starts_with("PERSONA_") {
                env::remove_var(&key);
            }
        }
        for key in ["OPENAI_API_KEY", "PUSHOVER_TOKEN", "PUSHOVER_USER", "PORT"] {
            env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn test_default_settings() {
        clean_env();
        env::set_var("PERSONA_PROVIDER__API_KEY", "test-key");

        let settings = Settings::new().unwrap();
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.server.port, 7860);
        assert_eq!(settings.persona.name, "Michael Salami");
        assert_eq!(settings.persona.profile, PathBuf::from("me/linkedin.pdf"));
        assert_eq!(settings.persona.summary, PathBuf::from("me/summary.txt"));
        assert_eq!(settings.persona.template, None);
        assert_eq!(settings.persona.max_rounds, 8);
        assert_eq!(settings.log_level, "info");
        assert!(settings.pushover.into_config().is_none());

        let provider = settings.provider.into_config().unwrap();
        assert_eq!(provider.host, "https://api.openai.com");
        assert_eq!(provider.api_key, "test-key");
        assert_eq!(provider.model, "gpt-4o-mini");
        assert_eq!(provider.temperature, None);
        assert_eq!(provider.max_tokens, None);
        assert_eq!(provider.timeout, Duration::from_secs(60));

        env::remove_var("PERSONA_PROVIDER__API_KEY");
    }

    #[test]
    #[serial]
    fn test_missing_api_key() {
        clean_env();

        let settings = Settings::new().unwrap();
        let err = settings.provider.into_config().unwrap_err();
        match err {
            ConfigError::MissingEnvVar { env_var } => {
                assert_eq!(env_var, "PERSONA_PROVIDER__API_KEY")
            }
            other => panic!("Expected MissingEnvVar, got {:?}", other),
        }
    }

    #[test]
    #[serial]
    fn test_conventional_variables() {
        clean_env();
        env::set_var("OPENAI_API_KEY", "sk-conventional");
        env::set_var("PUSHOVER_TOKEN", "app-token");
        env::set_var("PUSHOVER_USER", "user-key");
        env::set_var("PORT", "8080");

        let settings = Settings::new().unwrap();
        assert_eq!(settings.server.port, 8080);
        let pushover = settings.pushover.into_config().unwrap();
        assert_eq!(pushover.token, "app-token");
        assert_eq!(pushover.user, "user-key");
        assert_eq!(
            settings.provider.into_config().unwrap().api_key,
            "sk-conventional"
        );

        clean_env();
    }

    #[test]
    #[serial]
    fn test_environment_override() {
        clean_env();
        env::set_var("OPENAI_API_KEY", "sk-conventional");
        env::set_var("PORT", "8080");
        env::set_var("PERSONA_SERVER__PORT", "9000");
        env::set_var("PERSONA_PROVIDER__API_KEY", "test-key");
        env::set_var("PERSONA_PROVIDER__HOST", "https://custom.openai.com");
        env::set_var("PERSONA_PROVIDER__MODEL", "gpt-4o");
        env::set_var("PERSONA_PROVIDER__TEMPERATURE", "0.8");
        env::set_var("PERSONA_PERSONA__NAME", "Jane Doe");
        env::set_var("PERSONA_PERSONA__MAX_ROUNDS", "3");
        env::set_var("PERSONA_LOG_LEVEL", "debug");

        let settings = Settings::new().unwrap();
        assert_eq!(settings.server.port, 9000);
        assert_eq!(settings.persona.name, "Jane Doe");
        assert_eq!(settings.persona.max_rounds, 3);
        assert_eq!(settings.log_level, "debug");

        let provider = settings.provider.into_config().unwrap();
        assert_eq!(provider.host, "https://custom.openai.com");
        assert_eq!(provider.api_key, "test-key");
        assert_eq!(provider.model, "gpt-4o");
        assert_eq!(provider.temperature, Some(0.8));

        clean_env();
    }

    #[test]
    #[serial]
    fn test_partial_pushover_credentials_are_ignored() {
        clean_env();
        env::set_var("PERSONA_PUSHOVER__TOKEN", "app-token");

        let settings = Settings::new().unwrap();
        assert!(settings.pushover.into_config().is_none());

        clean_env();
    }

    #[test]
    fn test_socket_addr_conversion() {
        let server_settings = ServerSettings {
            host: "127.0.0.1".to_string(),
            port: 7860,
        };
        let addr = server_settings.socket_addr().unwrap();
        assert_eq!(addr.to_string(), "127.0.0.1:7860");
    }
}
