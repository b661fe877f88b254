//! Shared types for the swap-log scraper workspace: the canonical decoded
//! swap record, its JSON store, and the chain-client capability interface
//! the binaries talk to an Ethereum node through.

pub mod client;
pub mod entity;
pub mod store;

// Re-exports for convenience
pub use client::{
    AlloyChainClient, ArgValue, ChainClient, ClientError, FilterId, RawLogEntry, ReceiptSummary,
};
pub use entity::SwapEvent;
pub use store::StoreError;
