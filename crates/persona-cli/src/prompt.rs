use anyhow::Result;

pub mod cliclack;

/// Terminal surface the session reads from and renders to
pub trait Prompt {
    fn render(&mut self, text: &str) -> Result<()>;
    fn get_input(&mut self) -> Result<Input>;
    fn show_busy(&mut self);
    fn hide_busy(&mut self);
    fn close(&self);
}

#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    AskAgain,        // Nothing to send, ask the user again
    Message(String), // User sent a message
    Exit,            // User wants to exit the session
}

impl Input {
    /// Classify a line the user typed
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        if text.is_empty() {
            Input::AskAgain
        } else if text.eq_ignore_ascii_case("exit") || text.eq_ignore_ascii_case("/exit") {
            Input::Exit
        } else {
            Input::Message(text.to_string())
        }
    }
}

pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn bat_theme(&self) -> &'static str {
        match self {
            Theme::Light => "GitHub",
            Theme::Dark => "zenburn",
        }
    }
}
