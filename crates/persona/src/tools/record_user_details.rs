use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use super::{parse_arguments, recorded, ToolHandler};
use crate::errors::ToolResult;
use crate::models::tool::Tool;
use crate::notifier::Notifier;

const NAME: &str = "record_user_details";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Parameters {
    email: String,
    #[serde(default = "default_name")]
    name: String,
    #[serde(default = "default_notes")]
    notes: String,
}

fn default_name() -> String {
    "Name not provided".to_string()
}

fn default_notes() -> String {
    "not provided".to_string()
}

/// Records that a visitor wants to get in touch and left an email address
pub struct RecordUserDetails {
    tool: Tool,
    notifier: Arc<dyn Notifier>,
}

impl RecordUserDetails {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        let tool = Tool::new(
            NAME,
            "Use this tool to record that a user is interested in being in touch and provided an email address",
            json!({
                "type": "object",
                "properties": {
                    "email": {
                        "type": "string",
                        "description": "The email address of this user"
                    },
                    "name": {
                        "type": "string",
                        "description": "The user's name, if they provided it"
                    },
                    "notes": {
                        "type": "string",
                        "description": "Any additional information about the conversation that's worth recording to give context"
                    }
                },
                "required": ["email"],
                "additionalProperties": false
            }),
        );
        Self { tool, notifier }
    }
}

#[async_trait]
impl ToolHandler for RecordUserDetails {
    fn tool(&self) -> &Tool {
        &self.tool
    }

    async fn call(&self, arguments: Value) -> ToolResult<Value> {
        let params: Parameters = parse_arguments(NAME, arguments)?;
        self.notifier
            .notify(&format!(
                "Recording {} with email {} and notes {}",
                params.name, params.email, params.notes
            ))
            .await;
        Ok(recorded())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifier::mock::RecordingNotifier;

    #[tokio::test]
    async fn test_defaults_fill_missing_name_and_notes() {
        let notifier = RecordingNotifier::new();
        let tool = RecordUserDetails::new(Arc::new(notifier.clone()));

        let result = tool
            .call(json!({"email": "jane@example.com"}))
            .await
            .unwrap();

        assert_eq!(result, json!({"recorded": "ok"}));
        assert_eq!(
            notifier.sent(),
            vec!["Recording Name not provided with email jane@example.com and notes not provided"]
        );
    }

    #[tokio::test]
    async fn test_all_fields() {
        let notifier = RecordingNotifier::new();
        let tool = RecordUserDetails::new(Arc::new(notifier.clone()));

        tool.call(json!({
            "email": "jane@example.com",
            "name": "Jane",
            "notes": "Hiring for a platform team"
        }))
        .await
        .unwrap();

        assert_eq!(
            notifier.sent(),
            vec!["Recording Jane with email jane@example.com and notes Hiring for a platform team"]
        );
    }
}
