//! ursabot - a single-connection IRC bot.

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use ursabot::{Client, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "ursabot.toml".to_string());

    let config = Config::load(&config_path).map_err(|e| {
        error!(path = %config_path, error = %e, "Failed to load config");
        e
    })?;

    info!(
        host = %config.host,
        port = config.port,
        nick = %config.nick,
        "Starting ursabot"
    );

    let mut client = Client::connect(&config).await?;

    // Initial joins, each verified against the server's reply.
    let failures = client.join(&config.channels).await?;
    for failure in &failures {
        warn!(reply = %failure.raw, "Channel join rejected");
    }
    info!(joined = client.session.channels.len(), "Initial joins complete");

    client.run().await?;

    info!("Session closed");
    Ok(())
}
