//! Chain-client capability interface and its alloy-backed implementation.
//!
//! The binaries consume this narrow surface instead of a concrete provider so
//! the scraping logic stays testable against in-memory fakes. ABI decoding
//! happens behind the interface: raw `Swap` logs come back as named
//! arguments, never as topic/data bytes.

use std::collections::BTreeMap;

use alloy::{
    eips::BlockNumberOrTag,
    primitives::{Address, B256, U256},
    providers::Provider,
    rpc::types::{Filter, Log},
    sol,
    sol_types::SolEvent,
};
use async_trait::async_trait;
use thiserror::Error;

sol! {
    /// Uniswap V2 pair `Swap` event.
    event Swap(
        address indexed sender,
        uint256 amount0In,
        uint256 amount1In,
        uint256 amount0Out,
        uint256 amount1Out,
        address indexed to
    );
}

/// Decoded argument names of the pair contract's `Swap` event. The schema is
/// fixed by the target contract and is not self-describing.
pub mod swap_args {
    pub const SENDER: &str = "sender";
    pub const TO: &str = "to";
    pub const AMOUNT0_IN: &str = "amount0In";
    pub const AMOUNT1_IN: &str = "amount1In";
    pub const AMOUNT0_OUT: &str = "amount0Out";
    pub const AMOUNT1_OUT: &str = "amount1Out";
}

/// Identifier of a transient server-side log filter.
pub type FilterId = U256;

/// A provider call failed: transport, node, or log-decode trouble.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct ClientError(String);

impl ClientError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    /// Rate-limit responses are worth retrying; anything else is not.
    pub fn is_rate_limited(&self) -> bool {
        let message = self.0.to_lowercase();
        message.contains("429")
            || message.contains("rate limit")
            || message.contains("too many requests")
            || message.contains("limit exceeded")
            || message.contains("-32005") // BSC "limit exceeded"
    }
}

impl From<alloy::transports::TransportError> for ClientError {
    fn from(err: alloy::transports::TransportError) -> Self {
        Self(err.to_string())
    }
}

/// A decoded event argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgValue {
    Address(Address),
    Uint(U256),
}

impl ArgValue {
    pub fn as_address(&self) -> Option<Address> {
        match self {
            Self::Address(address) => Some(*address),
            Self::Uint(_) => None,
        }
    }

    pub fn as_uint(&self) -> Option<U256> {
        match self {
            Self::Uint(value) => Some(*value),
            Self::Address(_) => None,
        }
    }
}

/// One raw log entry: its position on chain plus the decoded named arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLogEntry {
    pub block_number: u64,
    pub transaction: B256,
    pub log_index: u64,
    pub args: BTreeMap<String, ArgValue>,
}

/// Trimmed transaction receipt, enough for the lookup demo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptSummary {
    pub transaction: B256,
    pub block: u64,
    pub transaction_index: u64,
    pub succeeded: bool,
    pub gas_used: u128,
}

/// The narrow view of an Ethereum node the workspace needs.
///
/// The filter lifecycle is explicit (install, drain, uninstall) so callers
/// can guarantee release of server-side state on every exit path.
#[async_trait]
pub trait ChainClient: Send + Sync {
    async fn latest_block_number(&self) -> Result<u64, ClientError>;

    async fn install_log_filter(
        &self,
        contract: Address,
        event_signature: &str,
        from_block: u64,
        to_block: u64,
    ) -> Result<FilterId, ClientError>;

    async fn filter_entries(&self, filter_id: FilterId) -> Result<Vec<RawLogEntry>, ClientError>;

    /// Returns `false` when the node no longer knows the filter.
    async fn uninstall_log_filter(&self, filter_id: FilterId) -> Result<bool, ClientError>;

    async fn transaction_receipt(
        &self,
        transaction: B256,
    ) -> Result<Option<ReceiptSummary>, ClientError>;
}

/// `ChainClient` backed by an alloy provider.
pub struct AlloyChainClient<P> {
    provider: P,
}

impl<P: Provider> AlloyChainClient<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    fn decode_entry(log: &Log) -> Result<RawLogEntry, ClientError> {
        let block_number = log
            .block_number
            .ok_or_else(|| ClientError::new("log entry without block number"))?;
        let transaction = log
            .transaction_hash
            .ok_or_else(|| ClientError::new("log entry without transaction hash"))?;
        let log_index = log
            .log_index
            .ok_or_else(|| ClientError::new("log entry without log index"))?;

        let mut args = BTreeMap::new();
        if log.topic0() == Some(&Swap::SIGNATURE_HASH) {
            let decoded = Swap::decode_log(&log.inner, true).map_err(|err| {
                ClientError::new(format!("undecodable Swap log in tx {transaction}: {err}"))
            })?;
            let Swap {
                sender,
                amount0In: amount0_in,
                amount1In: amount1_in,
                amount0Out: amount0_out,
                amount1Out: amount1_out,
                to,
            } = decoded.data;

            args.insert(swap_args::SENDER.into(), ArgValue::Address(sender));
            args.insert(swap_args::TO.into(), ArgValue::Address(to));
            args.insert(swap_args::AMOUNT0_IN.into(), ArgValue::Uint(amount0_in));
            args.insert(swap_args::AMOUNT1_IN.into(), ArgValue::Uint(amount1_in));
            args.insert(swap_args::AMOUNT0_OUT.into(), ArgValue::Uint(amount0_out));
            args.insert(swap_args::AMOUNT1_OUT.into(), ArgValue::Uint(amount1_out));
        }

        Ok(RawLogEntry {
            block_number,
            transaction,
            log_index,
            args,
        })
    }
}

#[async_trait]
impl<P: Provider> ChainClient for AlloyChainClient<P> {
    async fn latest_block_number(&self) -> Result<u64, ClientError> {
        Ok(self.provider.get_block_number().await?)
    }

    async fn install_log_filter(
        &self,
        contract: Address,
        event_signature: &str,
        from_block: u64,
        to_block: u64,
    ) -> Result<FilterId, ClientError> {
        let filter = Filter::new()
            .address(contract)
            .event(event_signature)
            .from_block(BlockNumberOrTag::Number(from_block))
            .to_block(BlockNumberOrTag::Number(to_block));

        Ok(self.provider.new_filter(&filter).await?)
    }

    async fn filter_entries(&self, filter_id: FilterId) -> Result<Vec<RawLogEntry>, ClientError> {
        let logs = self.provider.get_filter_logs(filter_id).await?;

        logs.iter().map(Self::decode_entry).collect()
    }

    async fn uninstall_log_filter(&self, filter_id: FilterId) -> Result<bool, ClientError> {
        Ok(self.provider.uninstall_filter(filter_id).await?)
    }

    async fn transaction_receipt(
        &self,
        transaction: B256,
    ) -> Result<Option<ReceiptSummary>, ClientError> {
        let receipt = self.provider.get_transaction_receipt(transaction).await?;

        Ok(receipt.map(|receipt| ReceiptSummary {
            transaction: receipt.transaction_hash,
            block: receipt.block_number.unwrap_or_default(),
            transaction_index: receipt.transaction_index.unwrap_or_default(),
            succeeded: receipt.status(),
            gas_used: receipt.gas_used,
        }))
    }
}
