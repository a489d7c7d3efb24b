use std::io::{self, ErrorKind, Write};

use anyhow::{anyhow, Result};
use bat::WrappingMode;
use cliclack::{input, outro, spinner};

use super::{Input, Prompt, Theme};

pub struct CliclackPrompt {
    spinner: cliclack::ProgressBar,
    theme: Theme,
}

impl CliclackPrompt {
    pub fn new() -> Self {
        CliclackPrompt {
            spinner: spinner(),
            theme: Theme::Dark,
        }
    }
}

fn print(content: &str, theme: &str) -> Result<()> {
    bat::PrettyPrinter::new()
        .input(bat::Input::from_bytes(content.as_bytes()))
        .theme(theme)
        .language("Markdown")
        .wrapping_mode(WrappingMode::Character)
        .print()
        .map_err(|e| anyhow!("Failed to render reply: {}", e))?;
    Ok(())
}

impl Prompt for CliclackPrompt {
    fn render(&mut self, text: &str) -> Result<()> {
        print(text, self.theme.bat_theme())?;
        println!();
        io::stdout().flush()?;
        Ok(())
    }

    fn show_busy(&mut self) {
        self.spinner = spinner();
        self.spinner.start("awaiting reply");
    }

    fn hide_busy(&mut self) {
        self.spinner.stop("");
    }

    fn get_input(&mut self) -> Result<Input> {
        let message_text: String = match input("Message:").placeholder("").multiline().interact()
        {
            Ok(text) => text,
            // Ctrl-C ends the session like `exit`
            Err(e) if e.kind() == ErrorKind::Interrupted => return Ok(Input::Exit),
            Err(e) => return Err(e.into()),
        };

        if message_text.trim().eq_ignore_ascii_case("/t") {
            self.theme = match self.theme {
                Theme::Light => {
                    println!("Switching to Dark theme");
                    Theme::Dark
                }
                Theme::Dark => {
                    println!("Switching to Light theme");
                    Theme::Light
                }
            };
            return Ok(Input::AskAgain);
        }

        Ok(Input::parse(&message_text))
    }

    fn close(&self) {
        let _ = outro("Goodbye!");
    }
}
