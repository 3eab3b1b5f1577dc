use anyhow::{Context, Result};
use clap::Parser;
use cloud_samples::cli::Cli;
use cloud_samples::config::{load_dotenv, Config};
use gcp_client::{GcpClient, StaticToken};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Before clap, which reads GOOGLE_CLOUD_PROJECT from the environment
    let dotenv = load_dotenv();

    // Logs go to stderr so sample output stays clean on stdout
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,gcp_client=info,cloud_samples=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Some(path) = dotenv {
        tracing::debug!(path = %path.display(), "Loaded environment file");
    }

    if let Err(err) = run().await {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::from_env().context("Failed to load configuration")?;
    let client_config = config.client_config();

    let client = match cli.access_token {
        Some(token) => GcpClient::new(Arc::new(StaticToken::new(token)), client_config),
        None => GcpClient::from_env(client_config),
    }
    .context("Failed to create Google Cloud client")?;
    tracing::debug!(endpoint = ?config.endpoint, "Client ready");

    let mut stdout = std::io::stdout().lock();
    cloud_samples::run(cli.service, &client, &mut stdout).await
}
