use alloy::primitives::B256;
use swap_logs::ClientError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReceiptError {
    #[error("missing `{0}` environment variable")]
    MissingEnvVar(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("no receipt found for transaction {0}")]
    NotFound(B256),

    #[error("receipt lookup failed for transaction {transaction}: {source}")]
    Lookup {
        transaction: B256,
        #[source]
        source: ClientError,
    },

    #[error("receipt worker failed: {0}")]
    Worker(String),
}
