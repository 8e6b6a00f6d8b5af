pub mod cli;
pub mod core;
pub mod entities;
pub mod providers;

use crate::cli::shopping::ShoppingCommand;
use crate::core::DataFetcher;
use crate::core::config::AppConfig;
use crate::providers::FlatasticClient;
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    Status { json: bool },
    Watch,
    Shopping(ShoppingCommand),
}

/// Builds the API client and fetcher described by `config`.
pub fn build_fetcher(config: &AppConfig) -> Result<Arc<DataFetcher>> {
    let client = FlatasticClient::new(
        &config.provider.base_url,
        &config.api_key,
        Duration::from_secs(config.provider.timeout_secs),
    )?;
    Ok(Arc::new(DataFetcher::new(
        Arc::new(client),
        config.currency.clone(),
    )))
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Flatastic starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!(
        base_url = %config.provider.base_url,
        currency = ?config.currency,
        poll_interval_secs = config.poll_interval_secs,
        "Loaded config"
    );

    let fetcher = build_fetcher(&config)?;

    match command {
        AppCommand::Status { json } => cli::status::run(&fetcher, config.recent_count, json).await,
        AppCommand::Watch => {
            cli::watch::run(
                &fetcher,
                config.recent_count,
                Duration::from_secs(config.poll_interval_secs),
            )
            .await
        }
        AppCommand::Shopping(cmd) => cli::shopping::run(fetcher, cmd).await,
    }
}
