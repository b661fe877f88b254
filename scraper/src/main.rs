//! Windowed swap-event scraper.
//!
//! Walks a block range in fixed-size windows, pulls decoded `Swap` logs for
//! one pair contract, and saves the accumulated records as a JSON document.

use std::{env, error::Error};

use alloy::providers::ProviderBuilder;
use swap_logs::{store, AlloyChainClient};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{config::ScrapeConfig, error::ScrapeError};

mod config;
mod decode;
mod error;
mod fetcher;
mod partition;
mod pipeline;
#[cfg(test)]
mod testutil;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scraper=info,swap_logs=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ScrapeConfig::from_env()?;
    let rpc_url =
        env::var("RPC_URL").map_err(|_| ScrapeError::MissingEnvVar("RPC_URL".into()))?;

    let provider = ProviderBuilder::new().on_builtin(&rpc_url).await?;
    let client = AlloyChainClient::new(provider);

    let range = pipeline::resolve_range(&client, &config).await?;
    info!(
        contract = %config.contract_address,
        event = %config.event_signature,
        start = range.start,
        end = range.end,
        window = config.window_size,
        "starting scrape"
    );

    let events = pipeline::run(&client, &config, range).await?;

    let out_file = config::out_file(range.start, range.end);
    store::save(&events, &out_file).map_err(ScrapeError::Store)?;
    info!(
        total = events.len(),
        path = %out_file.display(),
        "saved swap logs"
    );

    Ok(())
}
