use serde::{Deserialize, Serialize};
use thiserror::Error;

#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Deserialize, Serialize)]
pub enum AgentError {
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type AgentResult<T> = Result<T, AgentError>;

#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Invalid parameters for {tool}: {message}")]
    InvalidParameters { tool: String, message: String },

    #[error("A tool named {0} is already registered")]
    DuplicateTool(String),
}

pub type ToolResult<T> = Result<T, ToolError>;

impl From<ToolError> for AgentError {
    fn from(err: ToolError) -> Self {
        match err {
            ToolError::InvalidParameters { .. } => AgentError::InvalidParameters(err.to_string()),
            ToolError::DuplicateTool(_) => AgentError::Internal(err.to_string()),
        }
    }
}

/// Failures while loading the documents a [`crate::persona::Persona`] is built from
#[derive(Error, Debug)]
pub enum ContextError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read PDF {path}: {source}")]
    Pdf {
        path: String,
        #[source]
        source: lopdf::Error,
    },

    #[error("Failed to render prompt template: {0}")]
    Template(#[from] tera::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_error_converts_to_agent_error() {
        let err: AgentError = ToolError::InvalidParameters {
            tool: "record_unknown_question".to_string(),
            message: "missing field `question`".to_string(),
        }
        .into();
        assert!(matches!(err, AgentError::InvalidParameters(_)));
        assert!(err.to_string().contains("record_unknown_question"));

        let err: AgentError = ToolError::DuplicateTool("record_user_details".to_string()).into();
        assert!(matches!(err, AgentError::Internal(_)));
        assert!(err.to_string().contains("already registered"));
    }

    #[test]
    fn test_agent_error_serialization() {
        let err = AgentError::ToolNotFound("lookup".to_string());
        let json = serde_json::to_string(&err).unwrap();
        let back: AgentError = serde_json::from_str(&json).unwrap();
        assert_eq!(err, back);
    }
}
