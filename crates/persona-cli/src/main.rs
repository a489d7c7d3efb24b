mod prompt;
mod session;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use persona::agent::{Agent, DEFAULT_MAX_ROUNDS};
use persona::notifier::{LogNotifier, Notifier, PushoverConfig, PushoverNotifier};
use persona::persona::Persona;
use persona::providers::configs::{OpenAiProviderConfig, OPENAI_MODEL};
use persona::providers::openai::OpenAiProvider;
use persona::tools::Toolbox;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use crate::prompt::cliclack::CliclackPrompt;
use crate::session::Session;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Name of the person the assistant speaks for
    #[arg(long, env = "PERSONA_NAME", default_value = "Michael Salami")]
    name: String,

    /// PDF export of the profile
    #[arg(long, env = "PERSONA_PROFILE", default_value = "me/linkedin.pdf")]
    profile: PathBuf,

    /// Plain-text background summary
    #[arg(long, env = "PERSONA_SUMMARY", default_value = "me/summary.txt")]
    summary: PathBuf,

    /// Model to use
    #[arg(short, long, env = "OPENAI_MODEL", default_value = OPENAI_MODEL)]
    model: String,

    /// Model calls allowed per message before giving up
    #[arg(long, env = "PERSONA_MAX_ROUNDS", default_value_t = DEFAULT_MAX_ROUNDS)]
    max_rounds: usize,

    /// OpenAI API Key (can also be set via OPENAI_API_KEY environment variable)
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
}

fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;
    Ok(())
}

fn build_agent(cli: Cli) -> Result<Agent> {
    let api_key = cli
        .api_key
        .filter(|key| !key.trim().is_empty())
        .context("API key must be provided via --api-key or OPENAI_API_KEY environment variable")?;

    let mut config = OpenAiProviderConfig::new(api_key);
    config.model = cli.model;
    let provider = OpenAiProvider::new(config)?;

    let persona = Persona::load(cli.name, &cli.profile, &cli.summary)
        .context("Failed to load persona context")?;

    let notifier: Arc<dyn Notifier> = match PushoverConfig::from_env() {
        Some(config) => Arc::new(PushoverNotifier::new(config)?),
        None => Arc::new(LogNotifier),
    };

    Ok(Agent::new(
        Box::new(provider),
        Arc::new(persona),
        Arc::new(Toolbox::with_defaults(notifier)?),
    )
    .with_max_rounds(cli.max_rounds))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Variables already set in the environment win over the .env file
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    init_logging()?;

    let agent = build_agent(cli)?;

    println!(
        "Chatting with {} {}",
        style(agent.persona().name()).bold(),
        style("- type \"exit\" to end the session").dim()
    );
    println!();

    let mut session = Session::new(agent, Box::new(CliclackPrompt::new()));
    session.start().await
}
