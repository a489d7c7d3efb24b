use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::models::message::Message;
use crate::models::tool::Tool;
use crate::providers::base::{Provider, Usage};

/// A mock provider that returns pre-configured responses for testing
pub struct MockProvider {
    responses: Arc<Mutex<Vec<Message>>>,
    repeat: Option<Message>,
    calls: Arc<Mutex<Vec<Vec<Message>>>>,
}

impl MockProvider {
    /// Create a new mock provider with a sequence of responses
    pub fn new(responses: Vec<Message>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
            repeat: None,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A provider that answers every call with the same message
    pub fn repeating(response: Message) -> Self {
        Self {
            repeat: Some(response),
            ..Self::new(Vec::new())
        }
    }

    /// A provider whose calls always fail
    pub fn failing() -> Self {
        Self::new(Vec::new())
    }

    /// Handle on the transcripts the provider has been called with
    pub fn calls(&self) -> Arc<Mutex<Vec<Vec<Message>>>> {
        self.calls.clone()
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn complete(
        &self,
        _system_prompt: &str,
        messages: &[Message],
        _tools: &[Tool],
    ) -> Result<(Message, Usage)> {
        self.calls.lock().unwrap().push(messages.to_vec());
        if let Some(response) = &self.repeat {
            return Ok((response.clone(), Usage::default()));
        }
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Err(anyhow!("no scripted response left"))
        } else {
            Ok((responses.remove(0), Usage::default()))
        }
    }
}
