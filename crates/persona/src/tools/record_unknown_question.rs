use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use super::{parse_arguments, recorded, ToolHandler};
use crate::errors::ToolResult;
use crate::models::tool::Tool;
use crate::notifier::Notifier;

const NAME: &str = "record_unknown_question";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Parameters {
    question: String,
}

/// Records a question the model could not answer from the persona's context
pub struct RecordUnknownQuestion {
    tool: Tool,
    notifier: Arc<dyn Notifier>,
}

impl RecordUnknownQuestion {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        let tool = Tool::new(
            NAME,
            "Always use this tool to record any question that couldn't be answered as you didn't know the answer",
            json!({
                "type": "object",
                "properties": {
                    "question": {
                        "type": "string",
                        "description": "The question that couldn't be answered"
                    }
                },
                "required": ["question"],
                "additionalProperties": false
            }),
        );
        Self { tool, notifier }
    }
}

#[async_trait]
impl ToolHandler for RecordUnknownQuestion {
    fn tool(&self) -> &Tool {
        &self.tool
    }

    async fn call(&self, arguments: Value) -> ToolResult<Value> {
        let params: Parameters = parse_arguments(NAME, arguments)?;
        self.notifier
            .notify(&format!("Recording {}", params.question))
            .await;
        Ok(recorded())
    }
}
