use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
use config::StargazerConfig;

mod notifier;
use notifier::SlackNotifier;

mod webhooks;
use webhooks::build_rocket;

/// Announces GitHub stars in a Slack channel
#[derive(Parser)]
#[command(version = "0.1")]
struct Opts {
    /// YAML configuration file for stargazer. Without it, configuration is read from the
    /// environment (WEBHOOK_SECRET, SLACK_TOKEN, SLACK_CHANNEL, ...), which a `.env` file in the
    /// working directory can fill in
    #[arg(short, long, env = "STARGAZER_CONFIG")]
    config: Option<PathBuf>,
}

#[rocket::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // before parsing, so the .env file can also provide STARGAZER_CONFIG
    StargazerConfig::load_env_file(Path::new(".env"))?;

    let opts = Opts::parse();
    let config = match &opts.config {
        Some(path) => StargazerConfig::from_file(path)?,
        None => StargazerConfig::from_env().context("couldn't read config from environment")?,
    };
    info!(
        "posting stars to Slack channel {} through {}",
        config.slack_channel, config.slack_api_url
    );

    let notifier = SlackNotifier::new(&config).context("failed to create Slack notifier")?;

    let rocket = build_rocket(&config, Box::new(notifier));
    rocket.launch().await.map_err(|err| anyhow::anyhow!(err))?;

    Ok(())
}
