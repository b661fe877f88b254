//! Transaction-receipt lookup demo.
//!
//! Takes a list of transaction hashes, fetches their receipts through a
//! fixed-size worker pool, and logs one summary line per receipt in block
//! order. Shares the chain client with the scraper but touches no filter
//! state, so the lookups can run concurrently.

use std::{env, error::Error, str::FromStr, sync::Arc};

use alloy::{primitives::B256, providers::ProviderBuilder};
use swap_logs::AlloyChainClient;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::ReceiptError;

mod error;
mod service;

mod defaults {
    pub const MAX_IN_FLIGHT: &str = "8";
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "receipts=info,swap_logs=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rpc_url =
        env::var("RPC_URL").map_err(|_| ReceiptError::MissingEnvVar("RPC_URL".into()))?;

    let transactions = transaction_hashes()?;
    if transactions.is_empty() {
        return Err(ReceiptError::InvalidArgument(
            "no transaction hashes given; pass them as arguments or via TX_HASHES".into(),
        )
        .into());
    }

    let max_in_flight = env::var("MAX_IN_FLIGHT")
        .unwrap_or_else(|_| defaults::MAX_IN_FLIGHT.into())
        .parse::<usize>()
        .map_err(|_| {
            ReceiptError::InvalidArgument("MAX_IN_FLIGHT must be an unsigned integer".into())
        })?;

    let provider = ProviderBuilder::new().on_builtin(&rpc_url).await?;
    let client = Arc::new(AlloyChainClient::new(provider));

    info!(
        count = transactions.len(),
        max_in_flight, "fetching receipts"
    );
    let receipts = service::fetch_all(client, transactions, max_in_flight).await?;

    for receipt in &receipts {
        info!(
            transaction = %receipt.transaction,
            block = receipt.block,
            index = receipt.transaction_index,
            succeeded = receipt.succeeded,
            gas_used = receipt.gas_used,
            "receipt"
        );
    }

    Ok(())
}

/// Hashes come from CLI arguments, falling back to the comma-separated
/// `TX_HASHES` variable.
fn transaction_hashes() -> Result<Vec<B256>, ReceiptError> {
    let raw: Vec<String> = if env::args().len() > 1 {
        env::args().skip(1).collect()
    } else {
        env::var("TX_HASHES")
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|hash| !hash.is_empty())
            .map(str::to_string)
            .collect()
    };

    raw.iter()
        .map(|hash| {
            B256::from_str(hash).map_err(|err| {
                ReceiptError::InvalidArgument(format!("bad transaction hash `{hash}`: {err}"))
            })
        })
        .collect()
}
