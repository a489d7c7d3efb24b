mod configuration;
mod error;
mod logging;
mod routes;
mod state;

use anyhow::{Context, Result};
use persona::agent::Agent;
use persona::notifier::{LogNotifier, Notifier, PushoverNotifier};
use persona::persona::Persona;
use persona::providers::openai::OpenAiProvider;
use persona::tools::Toolbox;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Variables already set in the environment win over the .env file
    dotenv::dotenv().ok();

    let settings = configuration::Settings::new()?;
    logging::init(&settings.log_level)?;

    let provider_config = settings.provider.into_config()?;
    let addr = settings
        .server
        .socket_addr()
        .context("Invalid server host or port")?;

    let mut persona = Persona::load(
        settings.persona.name,
        &settings.persona.profile,
        &settings.persona.summary,
    )
    .context("Failed to load persona context")?;
    if let Some(template) = settings.persona.template {
        persona = persona.with_template(template);
    }

    let notifier: Arc<dyn Notifier> = match settings.pushover.into_config() {
        Some(config) => Arc::new(PushoverNotifier::new(config)?),
        None => {
            tracing::warn!("Pushover credentials not set, notifications will only be logged");
            Arc::new(LogNotifier)
        }
    };

    let provider = OpenAiProvider::new(provider_config)?;
    info!(model = provider.model(), persona = persona.name(), "Starting personad");

    let agent = Agent::new(
        Box::new(provider),
        Arc::new(persona),
        Arc::new(Toolbox::with_defaults(notifier)?),
    )
    .with_max_rounds(settings.persona.max_rounds);

    let app = routes::configure(state::AppState::new(agent));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
