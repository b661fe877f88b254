//! Environment-sourced scrape configuration.
//!
//! Everything is validated here, before any provider call, so malformed
//! input fails as `InvalidArgument` instead of surfacing halfway through a
//! run.

use std::{env, path::PathBuf, str::FromStr, time::Duration};

use alloy::primitives::Address;

use crate::error::ScrapeError;

mod defaults {
    /// LuaSwap LP Token V1 pair contract.
    pub const CONTRACT_ADDRESS: &str = "0x7885e359a085372EbCF1ed6829402f149D02c600";
    pub const EVENT_SIGNATURE: &str = "Swap(address,uint256,uint256,uint256,uint256,address)";
    pub const BLOCKS_BACK: &str = "10000";
    pub const BLOCK_WINDOW: &str = "100";
    pub const WINDOW_DELAY_MS: &str = "10";
    pub const CALL_TIMEOUT_SECS: &str = "30";
    pub const MAX_RETRIES: &str = "3";
}

/// Where a scrape starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartBlock {
    Absolute(u64),
    /// `n` blocks before the chain head at run start.
    BehindLatest(u64),
}

/// Where a scrape ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndBlock {
    Absolute(u64),
    Latest,
}

#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    pub contract_address: Address,
    pub event_signature: String,
    pub start_block: StartBlock,
    pub end_block: EndBlock,
    pub window_size: u64,
    /// Pacing between windows; zero disables it.
    pub window_delay: Duration,
    pub call_timeout: Duration,
    pub run_deadline: Option<Duration>,
    /// Retries per window on rate-limited calls; zero restores plain abort.
    pub max_retries: u32,
}

impl ScrapeConfig {
    pub fn from_env() -> Result<Self, ScrapeError> {
        let raw_address =
            env::var("CONTRACT_ADDRESS").unwrap_or_else(|_| defaults::CONTRACT_ADDRESS.into());
        let contract_address = Address::from_str(&raw_address).map_err(|err| {
            ScrapeError::InvalidArgument(format!("bad contract address `{raw_address}`: {err}"))
        })?;

        let event_signature =
            env::var("EVENT_SIGNATURE").unwrap_or_else(|_| defaults::EVENT_SIGNATURE.into());
        validate_event_signature(&event_signature)?;

        let start_block = match optional_var("START_BLOCK") {
            Some(raw) => StartBlock::Absolute(parse_u64("START_BLOCK", &raw)?),
            None => StartBlock::BehindLatest(var_or_default("BLOCKS_BACK", defaults::BLOCKS_BACK)?),
        };

        let end_block = match optional_var("END_BLOCK") {
            Some(raw) => EndBlock::Absolute(parse_u64("END_BLOCK", &raw)?),
            None => EndBlock::Latest,
        };

        let window_size = var_or_default("BLOCK_WINDOW", defaults::BLOCK_WINDOW)?;
        if window_size == 0 {
            return Err(ScrapeError::InvalidArgument(
                "BLOCK_WINDOW must be a positive number of blocks".into(),
            ));
        }

        let window_delay =
            Duration::from_millis(var_or_default("WINDOW_DELAY_MS", defaults::WINDOW_DELAY_MS)?);
        let call_timeout =
            Duration::from_secs(var_or_default("CALL_TIMEOUT_SECS", defaults::CALL_TIMEOUT_SECS)?);
        let run_deadline = match optional_var("RUN_DEADLINE_SECS") {
            Some(raw) => Some(Duration::from_secs(parse_u64("RUN_DEADLINE_SECS", &raw)?)),
            None => None,
        };

        let max_retries = var_or_default("MAX_RETRIES", defaults::MAX_RETRIES)? as u32;

        Ok(Self {
            contract_address,
            event_signature,
            start_block,
            end_block,
            window_size,
            window_delay,
            call_timeout,
            run_deadline,
            max_retries,
        })
    }
}

/// Destination for the saved document; defaults to the range-stamped name.
pub fn out_file(start: u64, end: u64) -> PathBuf {
    match optional_var("OUT_FILE") {
        Some(path) => PathBuf::from(path),
        None => PathBuf::from(format!("swap_logs_{start}_to_{end}.json")),
    }
}

fn optional_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.is_empty())
}

fn var_or_default(name: &str, fallback: &str) -> Result<u64, ScrapeError> {
    let raw = env::var(name).unwrap_or_else(|_| fallback.into());

    parse_u64(name, &raw)
}

fn parse_u64(name: &str, raw: &str) -> Result<u64, ScrapeError> {
    raw.parse::<u64>().map_err(|_| {
        ScrapeError::InvalidArgument(format!("{name} must be an unsigned integer, got `{raw}`"))
    })
}

/// Shape check only (`Name(types)`); the filter is built from the signature
/// hash, so there is no ABI cross-check against the live contract.
fn validate_event_signature(signature: &str) -> Result<(), ScrapeError> {
    let well_formed = signature
        .split_once('(')
        .is_some_and(|(name, params)| !name.is_empty() && params.ends_with(')'));

    if well_formed {
        Ok(())
    } else {
        Err(ScrapeError::InvalidArgument(format!(
            "bad event signature `{signature}`"
        )))
    }
}
