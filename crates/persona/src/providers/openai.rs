use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::StatusCode;
use serde_json::{json, Value};

use super::base::{Provider, Usage};
use super::configs::OpenAiProviderConfig;
use super::utils::{
    check_openai_context_length_error, messages_to_openai_spec, openai_response_to_message,
    tools_to_openai_spec,
};
use crate::models::message::Message;
use crate::models::tool::Tool;

/// Failure of a single chat completion request, split by whether it is worth one more attempt
#[derive(Debug, thiserror::Error)]
enum RequestError {
    #[error("Server error: {0}")]
    Transient(String),
    #[error("{0}")]
    Fatal(anyhow::Error),
}

pub struct OpenAiProvider {
    client: Client,
    config: OpenAiProviderConfig,
}

impl OpenAiProvider {
    pub fn new(config: OpenAiProviderConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self { client, config })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn get_usage(data: &Value) -> Result<Usage> {
        let usage = data
            .get("usage")
            .ok_or_else(|| anyhow!("No usage data in response"))?;

        let input_tokens = usage
            .get("prompt_tokens")
            .and_then(|v| v.as_i64())
            .map(|v| v as i32);

        let output_tokens = usage
            .get("completion_tokens")
            .and_then(|v| v.as_i64())
            .map(|v| v as i32);

        let total_tokens = usage
            .get("total_tokens")
            .and_then(|v| v.as_i64())
            .map(|v| v as i32)
            .or_else(|| match (input_tokens, output_tokens) {
                (Some(input), Some(output)) => Some(input + output),
                _ => None,
            });

        Ok(Usage::new(input_tokens, output_tokens, total_tokens))
    }

    async fn send(&self, payload: &Value) -> Result<Value, RequestError> {
        let url = format!(
            "{}/v1/chat/completions",
            self.config.host.trim_end_matches('/')
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() || e.is_connect() {
                    RequestError::Transient(e.to_string())
                } else {
                    RequestError::Fatal(e.into())
                }
            })?;

        match response.status() {
            StatusCode::OK => response
                .json()
                .await
                .map_err(|e| RequestError::Fatal(e.into())),
            status if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() => {
                Err(RequestError::Transient(status.to_string()))
            }
            status => {
                // The body usually carries an OpenAI error object worth surfacing
                let body = response.text().await.unwrap_or_default();
                Err(RequestError::Fatal(anyhow!(
                    "Request failed: {}\nResponse: {}",
                    status,
                    body
                )))
            }
        }
    }

    /// Post the payload, retrying once when the first attempt fails transiently
    async fn post(&self, payload: Value) -> Result<Value> {
        match self.send(&payload).await {
            Ok(response) => Ok(response),
            Err(RequestError::Transient(reason)) => {
                tracing::warn!("Chat completion failed ({}), retrying once", reason);
                self.send(&payload).await.map_err(|e| match e {
                    RequestError::Fatal(e) => e,
                    transient => anyhow!(transient),
                })
            }
            Err(RequestError::Fatal(e)) => Err(e),
        }
    }
}

#[async_trait]
impl Provider for OpenAiProvider {
    async fn complete(
        &self,
        system: &str,
        messages: &[Message],
        tools: &[Tool],
    ) -> Result<(Message, Usage)> {
        let system_message = json!({
            "role": "system",
            "content": system
        });

        // Convert messages and tools to OpenAI format
        let messages_spec = messages_to_openai_spec(messages);
        let tools_spec = if !tools.is_empty() {
            tools_to_openai_spec(tools)?
        } else {
            vec![]
        };

        // create messages array with system message first
        let mut messages_array = vec![system_message];
        messages_array.extend(messages_spec);

        let mut payload = json!({
            "model": self.config.model,
            "messages": messages_array
        });

        if let Some(object) = payload.as_object_mut() {
            if !tools_spec.is_empty() {
                object.insert("tools".to_string(), json!(tools_spec));
            }
            if let Some(temp) = self.config.temperature {
                object.insert("temperature".to_string(), json!(temp));
            }
            if let Some(tokens) = self.config.max_tokens {
                object.insert("max_tokens".to_string(), json!(tokens));
            }
        }

        let response = self.post(payload).await?;

        // Raise specific error if context length is exceeded
        if let Some(error) = response.get("error") {
            if let Some(err) = check_openai_context_length_error(error) {
                return Err(err.into());
            }
            return Err(anyhow!("OpenAI API error: {}", error));
        }

        let message = openai_response_to_message(response.clone())?;
        let usage = Self::get_usage(&response).unwrap_or_default();

        Ok((message, usage))
    }
}
