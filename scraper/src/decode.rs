//! Raw log entry → `SwapEvent`.
//!
//! Event schema: `Swap(address indexed sender, uint amount0In, uint
//! amount1In, uint amount0Out, uint amount1Out, address indexed to)`.
//! `sender` and `to` must be present; the four amounts default to zero,
//! since a swap reports either the "in" or the "out" side of each token
//! slot, never both.

use alloy::primitives::{Address, U256};
use swap_logs::{
    client::{swap_args, RawLogEntry},
    SwapEvent,
};

use crate::error::ScrapeError;

/// Decode one entry. Pure; the only failure is a missing required argument.
pub fn decode(entry: &RawLogEntry) -> Result<SwapEvent, ScrapeError> {
    Ok(SwapEvent {
        amnt_0_in: amount(entry, swap_args::AMOUNT0_IN),
        amnt_0_out: amount(entry, swap_args::AMOUNT0_OUT),
        amnt_1_in: amount(entry, swap_args::AMOUNT1_IN),
        amnt_1_out: amount(entry, swap_args::AMOUNT1_OUT),
        block: entry.block_number,
        log_idx: entry.log_index,
        receiver: address(entry, swap_args::TO)?,
        sender: address(entry, swap_args::SENDER)?,
        transaction: entry.transaction,
    })
}

fn address(entry: &RawLogEntry, field: &'static str) -> Result<Address, ScrapeError> {
    entry
        .args
        .get(field)
        .and_then(|value| value.as_address())
        .ok_or(ScrapeError::Decode {
            transaction: entry.transaction,
            log_index: entry.log_index,
            field,
        })
}

fn amount(entry: &RawLogEntry, field: &str) -> U256 {
    entry
        .args
        .get(field)
        .and_then(|value| value.as_uint())
        .unwrap_or(U256::ZERO)
}
