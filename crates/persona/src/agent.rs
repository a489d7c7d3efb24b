use std::sync::Arc;

use crate::errors::{AgentError, AgentResult};
use crate::models::message::{Message, ToolRequest};
use crate::persona::Persona;
use crate::providers::base::Provider;
use crate::tools::Toolbox;

/// Model calls allowed in a single turn before the agent gives up
pub const DEFAULT_MAX_ROUNDS: usize = 8;

/// Answer used when the model is still calling tools after the last allowed round
pub const ROUND_LIMIT_ANSWER: &str =
    "I'm sorry, I wasn't able to finish answering that. Please try asking again.";

/// Answer used when the model call fails or the model sends unusable tool arguments
pub const ERROR_ANSWER: &str =
    "I'm sorry, something went wrong while answering. Please try again in a moment.";

/// How a turn ended
#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    /// The model produced a final answer
    Answered(String),
    /// The model was still requesting tools when the round limit was reached
    RoundLimit,
    /// The model call failed or a tool call could not be carried out
    Failed(String),
}

impl TurnOutcome {
    /// The text shown to the user for this outcome
    pub fn answer(&self) -> &str {
        match self {
            TurnOutcome::Answered(text) => text,
            TurnOutcome::RoundLimit => ROUND_LIMIT_ANSWER,
            TurnOutcome::Failed(_) => ERROR_ANSWER,
        }
    }
}

/// The result of one user turn
#[derive(Debug, Clone)]
pub struct Turn {
    pub outcome: TurnOutcome,
    /// Messages appended during the turn, starting with the user message
    pub messages: Vec<Message>,
}

impl Turn {
    pub fn answer(&self) -> &str {
        self.outcome.answer()
    }
}

enum TurnState {
    AwaitingModel,
    ExecutingTools(Message),
    Terminated(TurnOutcome),
}

/// Agent drives the conversation between the user, the model and the toolbox
pub struct Agent {
    provider: Box<dyn Provider>,
    persona: Arc<Persona>,
    toolbox: Arc<Toolbox>,
    max_rounds: usize,
}

impl Agent {
    pub fn new(provider: Box<dyn Provider>, persona: Arc<Persona>, toolbox: Arc<Toolbox>) -> Self {
        Self {
            provider,
            persona,
            toolbox,
            max_rounds: DEFAULT_MAX_ROUNDS,
        }
    }

    /// Limit the number of model calls per turn, at least one
    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = max_rounds.max(1);
        self
    }

    pub fn persona(&self) -> &Persona {
        &self.persona
    }

    pub fn system_prompt(&self) -> AgentResult<String> {
        self.persona
            .system_prompt()
            .map_err(|e| AgentError::Internal(e.to_string()))
    }

    /// Answer a user message given the prior transcript, returning only the answer text
    pub async fn respond(&self, message: &str, history: &[Message]) -> String {
        match self.reply(message, history).await {
            Ok(turn) => turn.answer().to_string(),
            Err(e) => {
                tracing::error!("Failed to run turn: {}", e);
                ERROR_ANSWER.to_string()
            }
        }
    }

    /// Answer a user message and return the transcript extended with the user
    /// message and the answer
    pub async fn chat(&self, message: &str, mut history: Vec<Message>) -> Vec<Message> {
        let answer = self.respond(message, &history).await;
        history.push(Message::user().with_text(message));
        history.push(Message::assistant().with_text(answer));
        history
    }

    /// Run one turn: call the model, execute any tools it asks for and feed the
    /// results back until it answers or the round limit is hit
    pub async fn reply(&self, message: &str, history: &[Message]) -> AgentResult<Turn> {
        let system_prompt = self.system_prompt()?;
        let tools = self.toolbox.tools();

        let mut messages = history.to_vec();
        let start = messages.len();
        messages.push(Message::user().with_text(message));

        let mut rounds = 0;
        let mut state = TurnState::AwaitingModel;

        let outcome = loop {
            state = match state {
                TurnState::AwaitingModel if rounds >= self.max_rounds => {
                    tracing::warn!(
                        rounds,
                        "Model kept requesting tools, ending the turn at the round limit"
                    );
                    TurnState::Terminated(TurnOutcome::RoundLimit)
                }
                TurnState::AwaitingModel => {
                    rounds += 1;
                    tracing::debug!(round = rounds, "Awaiting model response");
                    match self
                        .provider
                        .complete(&system_prompt, &messages, tools)
                        .await
                    {
                        Ok((response, _usage)) if response.has_tool_requests() => {
                            TurnState::ExecutingTools(response)
                        }
                        Ok((response, _usage)) => {
                            let answer = response.text();
                            messages.push(response);
                            TurnState::Terminated(TurnOutcome::Answered(answer))
                        }
                        Err(e) => {
                            tracing::error!("Model call failed: {}", e);
                            TurnState::Terminated(TurnOutcome::Failed(e.to_string()))
                        }
                    }
                }
                TurnState::ExecutingTools(response) => {
                    match self.dispatch_tool_requests(&response.tool_requests()).await {
                        Ok(results) => {
                            messages.push(response);
                            messages.push(results);
                            TurnState::AwaitingModel
                        }
                        Err(e) => {
                            tracing::error!("Tool call could not be carried out: {}", e);
                            TurnState::Terminated(TurnOutcome::Failed(e.to_string()))
                        }
                    }
                }
                TurnState::Terminated(outcome) => break outcome,
            };
        };

        Ok(Turn {
            outcome,
            messages: messages.split_off(start),
        })
    }

    /// Execute every request in order and collect one result per request id
    async fn dispatch_tool_requests(&self, requests: &[&ToolRequest]) -> AgentResult<Message> {
        let mut results = Message::tool();
        for request in requests {
            let result = match &request.tool_call {
                Ok(call) => self
                    .toolbox
                    .execute(&call.name, call.arguments.clone())
                    .await?,
                // A name the provider could not even parse cannot be registered either
                Err(AgentError::ToolNotFound(name)) => {
                    tracing::warn!("Model requested an invalid tool name: {}", name);
                    serde_json::json!({})
                }
                Err(e) => return Err(e.clone()),
            };
            results = results.with_tool_response(request.id.clone(), Ok(result));
        }
        Ok(results)
    }
}
