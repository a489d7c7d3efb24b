use crate::state::AppState;
use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use persona::models::{message::Message, role::Role};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// Types matching the incoming JSON structure
#[derive(Debug, Deserialize)]
struct ReplyRequest {
    message: String,
    #[serde(default)]
    history: Vec<HistoryEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct HistoryEntry {
    role: String,
    #[serde(default)]
    content: Value,
}

#[derive(Debug, Serialize)]
struct ReplyResponse {
    reply: String,
    history: Vec<HistoryEntry>,
}

// Content is either a plain string or a list of parts with a text field
fn entry_text(content: &Value) -> Option<String> {
    if let Some(text) = content.as_str() {
        return Some(text.to_string());
    }
    let parts: Vec<&str> = content
        .as_array()?
        .iter()
        .filter_map(|part| part.get("text").and_then(|t| t.as_str()))
        .collect();
    Some(parts.join("\n"))
}

// Keep user and assistant entries, dropping assistant entries that come
// before the first user entry (a chat UI's greeting)
fn convert_history(incoming: Vec<HistoryEntry>) -> Vec<Message> {
    let mut messages = Vec::new();
    let mut seen_user = false;

    for entry in incoming {
        let Some(text) = entry_text(&entry.content) else {
            continue;
        };
        match entry.role.parse::<Role>() {
            Ok(Role::User) => {
                seen_user = true;
                messages.push(Message::user().with_text(text));
            }
            Ok(Role::Assistant) if seen_user => {
                messages.push(Message::assistant().with_text(text));
            }
            _ => {}
        }
    }

    messages
}

fn to_entry(message: &Message) -> HistoryEntry {
    HistoryEntry {
        role: message.role.as_str().to_string(),
        content: Value::String(message.text()),
    }
}

async fn handler(
    State(state): State<AppState>,
    Json(request): Json<ReplyRequest>,
) -> Result<Json<ReplyResponse>, StatusCode> {
    if request.message.trim().is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let history = convert_history(request.history);
    let transcript = state.agent.chat(&request.message, history).await;
    let reply = transcript.last().map(Message::text).unwrap_or_default();

    Ok(Json(ReplyResponse {
        reply,
        history: transcript.iter().map(to_entry).collect(),
    }))
}

// Configure routes for this module
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/reply", post(handler))
        .with_state(state)
}
