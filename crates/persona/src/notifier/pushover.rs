use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use std::env;
use std::time::Duration;

use super::Notifier;

pub const PUSHOVER_ENDPOINT: &str = "https://api.pushover.net/1/messages.json";
const PUSHOVER_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct PushoverConfig {
    pub token: String,
    pub user: String,
    pub endpoint: String,
}

impl PushoverConfig {
    pub fn new<T: Into<String>, U: Into<String>>(token: T, user: U) -> Self {
        Self {
            token: token.into(),
            user: user.into(),
            endpoint: PUSHOVER_ENDPOINT.to_string(),
        }
    }

    /// Read `PUSHOVER_TOKEN` and `PUSHOVER_USER`, returning None unless both are set
    pub fn from_env() -> Option<Self> {
        let token = env::var("PUSHOVER_TOKEN").ok().filter(|v| !v.is_empty())?;
        let user = env::var("PUSHOVER_USER").ok().filter(|v| !v.is_empty())?;
        Some(Self::new(token, user))
    }
}

/// Sends notifications through the Pushover message API
pub struct PushoverNotifier {
    client: Client,
    config: PushoverConfig,
}

impl PushoverNotifier {
    pub fn new(config: PushoverConfig) -> Result<Self> {
        let client = Client::builder().timeout(PUSHOVER_TIMEOUT).build()?;
        Ok(Self { client, config })
    }

    async fn post(&self, text: &str) -> Result<reqwest::StatusCode> {
        let response = self
            .client
            .post(&self.config.endpoint)
            .form(&[
                ("token", self.config.token.as_str()),
                ("user", self.config.user.as_str()),
                ("message", text),
            ])
            .send()
            .await?;
        Ok(response.status())
    }
}

#[async_trait]
impl Notifier for PushoverNotifier {
    async fn notify(&self, text: &str) {
        match self.post(text).await {
            Ok(status) if status.is_success() => {
                tracing::debug!("Push notification delivered");
            }
            Ok(status) => {
                tracing::warn!("Push notification rejected: {}", status);
            }
            Err(e) => {
                tracing::warn!("Push notification failed: {}", e);
            }
        }
    }
}
