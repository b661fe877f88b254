//! In-memory chain stub shared by the scraper tests.

use std::{
    collections::HashMap,
    sync::Mutex,
};

use alloy::primitives::{Address, B256, U256};
use async_trait::async_trait;
use swap_logs::client::{
    ArgValue, ChainClient, ClientError, FilterId, RawLogEntry, ReceiptSummary,
};

/// Canned log entries per block range, with scripted failures.
pub struct MockChain {
    latest_block: u64,
    entries: HashMap<(u64, u64), Vec<RawLogEntry>>,
    failing_window: Option<((u64, u64), String)>,
    rate_limited_calls: Mutex<u32>,
    fail_uninstall: bool,
    pub calls: Mutex<MockCalls>,
}

#[derive(Default)]
pub struct MockCalls {
    pub installed: Vec<(u64, u64)>,
    pub uninstalled: Vec<FilterId>,
    live: HashMap<FilterId, (u64, u64)>,
    next_id: u64,
}

impl MockChain {
    pub fn new(latest_block: u64) -> Self {
        Self {
            latest_block,
            entries: HashMap::new(),
            failing_window: None,
            rate_limited_calls: Mutex::new(0),
            fail_uninstall: false,
            calls: Mutex::new(MockCalls::default()),
        }
    }

    pub fn with_entries(mut self, window: (u64, u64), entries: Vec<RawLogEntry>) -> Self {
        self.entries.insert(window, entries);
        self
    }

    pub fn failing_entries_for(mut self, window: (u64, u64), message: &str) -> Self {
        self.failing_window = Some((window, message.to_string()));
        self
    }

    /// The next `calls` entry retrievals answer with a 429.
    pub fn rate_limited_for(self, calls: u32) -> Self {
        *self.rate_limited_calls.lock().unwrap() = calls;
        self
    }

    pub fn with_failing_uninstall(mut self) -> Self {
        self.fail_uninstall = true;
        self
    }
}

#[async_trait]
impl ChainClient for MockChain {
    async fn latest_block_number(&self) -> Result<u64, ClientError> {
        Ok(self.latest_block)
    }

    async fn install_log_filter(
        &self,
        _contract: Address,
        _event_signature: &str,
        from_block: u64,
        to_block: u64,
    ) -> Result<FilterId, ClientError> {
        let mut calls = self.calls.lock().unwrap();
        calls.next_id += 1;
        let id = U256::from(calls.next_id);
        calls.installed.push((from_block, to_block));
        calls.live.insert(id, (from_block, to_block));

        Ok(id)
    }

    async fn filter_entries(&self, filter_id: FilterId) -> Result<Vec<RawLogEntry>, ClientError> {
        let window = {
            let calls = self.calls.lock().unwrap();
            *calls
                .live
                .get(&filter_id)
                .ok_or_else(|| ClientError::new("unknown filter id"))?
        };

        {
            let mut remaining = self.rate_limited_calls.lock().unwrap();
            if *remaining > 0 {
                *remaining -= 1;
                return Err(ClientError::new("HTTP error 429 Too Many Requests"));
            }
        }

        if let Some((failing, message)) = &self.failing_window {
            if *failing == window {
                return Err(ClientError::new(message.clone()));
            }
        }

        Ok(self.entries.get(&window).cloned().unwrap_or_default())
    }

    async fn uninstall_log_filter(&self, filter_id: FilterId) -> Result<bool, ClientError> {
        let mut calls = self.calls.lock().unwrap();
        calls.uninstalled.push(filter_id);
        let known = calls.live.remove(&filter_id).is_some();

        if self.fail_uninstall {
            return Err(ClientError::new("eth_uninstallFilter unsupported"));
        }

        Ok(known)
    }

    async fn transaction_receipt(
        &self,
        _transaction: B256,
    ) -> Result<Option<ReceiptSummary>, ClientError> {
        Err(ClientError::new("receipts are not part of this stub"))
    }
}

/// Build a raw entry with a `repeat_byte` transaction hash.
pub fn entry(block: u64, tx_byte: u8, log_index: u64, args: &[(&str, ArgValue)]) -> RawLogEntry {
    RawLogEntry {
        block_number: block,
        transaction: B256::repeat_byte(tx_byte),
        log_index,
        args: args
            .iter()
            .map(|(name, value)| (name.to_string(), *value))
            .collect(),
    }
}
