//! The tools the model may call, and the registry that dispatches them by name
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

use crate::errors::{ToolError, ToolResult};
use crate::models::tool::Tool;
use crate::notifier::Notifier;

mod record_unknown_question;
mod record_user_details;

pub use record_unknown_question::RecordUnknownQuestion;
pub use record_user_details::RecordUserDetails;

/// A tool implementation with a fixed descriptor
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// The descriptor advertised to the model; its name is the dispatch key
    fn tool(&self) -> &Tool;

    /// Run the tool with the raw arguments sent by the model
    async fn call(&self, arguments: Value) -> ToolResult<Value>;
}

/// Deserialize the model's arguments into the typed parameters of a tool
pub fn parse_arguments<T: DeserializeOwned>(tool: &str, arguments: Value) -> ToolResult<T> {
    serde_json::from_value(arguments).map_err(|e| ToolError::InvalidParameters {
        tool: tool.to_string(),
        message: e.to_string(),
    })
}

/// The result every recording tool reports back to the model
pub fn recorded() -> Value {
    json!({"recorded": "ok"})
}

/// Name to handler table, built once at startup and read-only afterwards
#[derive(Default)]
pub struct Toolbox {
    tools: Vec<Tool>,
    handlers: HashMap<String, Box<dyn ToolHandler>>,
}

impl Toolbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard toolbox: contact details and unknown questions, both reported through `notifier`
    pub fn with_defaults(notifier: Arc<dyn Notifier>) -> ToolResult<Self> {
        let mut toolbox = Self::new();
        toolbox.register(Box::new(RecordUserDetails::new(notifier.clone())))?;
        toolbox.register(Box::new(RecordUnknownQuestion::new(notifier)))?;
        Ok(toolbox)
    }

    pub fn register(&mut self, handler: Box<dyn ToolHandler>) -> ToolResult<()> {
        let tool = handler.tool().clone();
        if self.handlers.contains_key(&tool.name) {
            return Err(ToolError::DuplicateTool(tool.name));
        }
        self.handlers.insert(tool.name.clone(), handler);
        self.tools.push(tool);
        Ok(())
    }

    /// Descriptors in registration order
    pub fn tools(&self) -> &[Tool] {
        &self.tools
    }

    /// Execute a tool by name. An unknown name resolves to an empty object so the
    /// conversation can carry on.
    pub async fn execute(&self, name: &str, arguments: Value) -> ToolResult<Value> {
        match self.handlers.get(name) {
            Some(handler) => {
                tracing::info!("Tool called: {}", name);
                handler.call(arguments).await
            }
            None => {
                tracing::warn!(
                    tool = name,
                    "Model requested a tool that is not registered, returning an empty result"
                );
                Ok(json!({}))
            }
        }
    }
}
