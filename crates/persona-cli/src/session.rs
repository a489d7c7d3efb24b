use anyhow::Result;
use persona::agent::Agent;
use persona::models::message::Message;

use crate::prompt::{Input, Prompt};

/// One interactive conversation. The transcript lives only as long as the session.
pub struct Session {
    agent: Agent,
    prompt: Box<dyn Prompt>,
    history: Vec<Message>,
}

impl Session {
    pub fn new(agent: Agent, prompt: Box<dyn Prompt>) -> Self {
        Self {
            agent,
            prompt,
            history: Vec::new(),
        }
    }

    pub async fn start(&mut self) -> Result<()> {
        loop {
            match self.prompt.get_input()? {
                Input::Message(text) => {
                    self.prompt.show_busy();
                    let history = std::mem::take(&mut self.history);
                    self.history = self.agent.chat(&text, history).await;
                    self.prompt.hide_busy();

                    if let Some(reply) = self.history.last() {
                        self.prompt.render(&reply.text())?;
                    }
                }
                Input::AskAgain => continue,
                Input::Exit => break,
            }
        }
        self.prompt.close();
        Ok(())
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use persona::models::role::Role;
    use persona::models::tool::Tool;
    use persona::notifier::LogNotifier;
    use persona::persona::Persona;
    use persona::providers::base::{Provider, Usage};
    use persona::tools::Toolbox;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    struct ScriptedPrompt {
        inputs: VecDeque<Input>,
        rendered: Arc<Mutex<Vec<String>>>,
    }

    impl Prompt for ScriptedPrompt {
        fn render(&mut self, text: &str) -> Result<()> {
            self.rendered.lock().unwrap().push(text.to_string());
            Ok(())
        }

        fn get_input(&mut self) -> Result<Input> {
            Ok(self.inputs.pop_front().unwrap_or(Input::Exit))
        }

        fn show_busy(&mut self) {}
        fn hide_busy(&mut self) {}
        fn close(&self) {}
    }

    /// Replies with how many messages it was sent
    struct CountingProvider;

    #[async_trait]
    impl Provider for CountingProvider {
        async fn complete(
            &self,
            _system: &str,
            messages: &[Message],
            _tools: &[Tool],
        ) -> anyhow::Result<(Message, Usage)> {
            Ok((
                Message::assistant().with_text(format!("seen {}", messages.len())),
                Usage::default(),
            ))
        }
    }

    fn agent() -> Agent {
        let persona = Persona::new("Jane Doe", "Backend engineer.", "Acme Corp");
        let toolbox = Toolbox::with_defaults(Arc::new(LogNotifier)).unwrap();
        Agent::new(
            Box::new(CountingProvider),
            Arc::new(persona),
            Arc::new(toolbox),
        )
    }

    #[tokio::test]
    async fn test_session_keeps_transcript_until_exit() {
        let rendered = Arc::new(Mutex::new(Vec::new()));
        let prompt = ScriptedPrompt {
            inputs: VecDeque::from(vec![
                Input::Message("Hi".to_string()),
                Input::AskAgain,
                Input::Message("Where do you work?".to_string()),
                Input::Exit,
                Input::Message("never sent".to_string()),
            ]),
            rendered: rendered.clone(),
        };
        let mut session = Session::new(agent(), Box::new(prompt));

        session.start().await.unwrap();

        assert_eq!(*rendered.lock().unwrap(), vec!["seen 1", "seen 3"]);
        let roles: Vec<Role> = session.history().iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![Role::User, Role::Assistant, Role::User, Role::Assistant]
        );
        assert_eq!(session.history()[2].text(), "Where do you work?");
    }
}
