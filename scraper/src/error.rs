use std::time::Duration;

use alloy::primitives::B256;
use swap_logs::{ClientError, StoreError};
use thiserror::Error;

/// Failure kinds of one scrape run.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("missing `{0}` environment variable")]
    MissingEnvVar(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("failed to fetch the latest block number: {0}")]
    LatestBlock(#[source] ClientError),

    #[error("provider call failed for blocks {from_block}..={to_block}: {source}")]
    Provider {
        from_block: u64,
        to_block: u64,
        #[source]
        source: ClientError,
    },

    #[error("log {log_index} of transaction {transaction} is missing the `{field}` argument")]
    Decode {
        transaction: B256,
        log_index: u64,
        field: &'static str,
    },

    #[error("provider call for blocks {from_block}..={to_block} exceeded {timeout:?}")]
    Timeout {
        from_block: u64,
        to_block: u64,
        timeout: Duration,
    },

    #[error("run deadline of {0:?} exceeded")]
    DeadlineExceeded(Duration),

    #[error(transparent)]
    Store(#[from] StoreError),
}
