//! Scrape orchestration: partition the range, fetch each window in ascending
//! order, decode every entry, accumulate one ordered sequence.

use std::{collections::HashSet, time::Duration};

use alloy::primitives::B256;
use swap_logs::{
    client::{ChainClient, RawLogEntry},
    SwapEvent,
};
use tokio::time::{sleep, timeout, Instant};
use tracing::{debug, error, info, warn};

use crate::{
    config::{EndBlock, ScrapeConfig, StartBlock},
    decode,
    error::ScrapeError,
    fetcher::EventFetcher,
    partition::{windows, BlockWindow},
};

const RETRY_BASE_DELAY_MS: u64 = 500;

/// Inclusive block range a run will cover, resolved against the chain head.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedRange {
    pub start: u64,
    pub end: u64,
}

/// Resolve the configured range, asking the provider for the head only when
/// a bound actually depends on it.
pub async fn resolve_range<C: ChainClient>(
    client: &C,
    config: &ScrapeConfig,
) -> Result<ResolvedRange, ScrapeError> {
    let needs_latest = matches!(config.start_block, StartBlock::BehindLatest(_))
        || matches!(config.end_block, EndBlock::Latest);

    let latest = if needs_latest {
        let latest = client
            .latest_block_number()
            .await
            .map_err(ScrapeError::LatestBlock)?;
        info!(latest, "fetched latest block number");
        latest
    } else {
        0
    };

    let start = match config.start_block {
        StartBlock::Absolute(block) => block,
        StartBlock::BehindLatest(behind) => latest.saturating_sub(behind),
    };
    let end = match config.end_block {
        EndBlock::Absolute(block) => block,
        EndBlock::Latest => latest,
    };

    Ok(ResolvedRange { start, end })
}

/// Run one scrape over `range`.
///
/// Output order is discovery order: ascending windows, chain order within a
/// window. Duplicate `(transaction, log_idx)` keys are dropped, first
/// occurrence wins. On failure the count gathered so far is logged before
/// the error propagates, so the caller can judge a partial file.
pub async fn run<C: ChainClient>(
    client: &C,
    config: &ScrapeConfig,
    range: ResolvedRange,
) -> Result<Vec<SwapEvent>, ScrapeError> {
    let fetcher = EventFetcher::new(client, config.contract_address, &config.event_signature);
    let deadline = config
        .run_deadline
        .map(|budget| (Instant::now() + budget, budget));

    let mut events = Vec::new();
    let result = scrape_windows(&fetcher, config, range, deadline, &mut events).await;

    if let Err(err) = &result {
        error!(accumulated = events.len(), error = %err, "scrape aborted");
    }

    result.map(|()| events)
}

async fn scrape_windows<C: ChainClient>(
    fetcher: &EventFetcher<'_, C>,
    config: &ScrapeConfig,
    range: ResolvedRange,
    deadline: Option<(Instant, Duration)>,
    events: &mut Vec<SwapEvent>,
) -> Result<(), ScrapeError> {
    let mut seen: HashSet<(B256, u64)> = HashSet::new();
    let mut first = true;

    for window in windows(range.start, range.end, config.window_size)? {
        if let Some((at, budget)) = deadline {
            if Instant::now() >= at {
                return Err(ScrapeError::DeadlineExceeded(budget));
            }
        }

        if !first && !config.window_delay.is_zero() {
            sleep(config.window_delay).await;
        }
        first = false;

        debug!(
            from_block = window.from_block,
            to_block = window.to_block,
            "fetching window"
        );
        let entries = fetch_window(fetcher, config, window).await?;

        for entry in &entries {
            let event = decode::decode(entry)?;
            if seen.insert(event.key()) {
                events.push(event);
            } else {
                debug!(
                    transaction = %event.transaction,
                    log_idx = event.log_idx,
                    "dropping duplicate entry"
                );
            }
        }
    }

    info!(total = events.len(), "scrape complete");
    Ok(())
}

/// One window fetch under the per-call timeout, with bounded exponential
/// backoff on rate-limited calls only; any other provider error aborts on
/// the first failure.
async fn fetch_window<C: ChainClient>(
    fetcher: &EventFetcher<'_, C>,
    config: &ScrapeConfig,
    window: BlockWindow,
) -> Result<Vec<RawLogEntry>, ScrapeError> {
    let mut attempt = 0;

    loop {
        let fetched = timeout(config.call_timeout, fetcher.fetch(window))
            .await
            .map_err(|_| ScrapeError::Timeout {
                from_block: window.from_block,
                to_block: window.to_block,
                timeout: config.call_timeout,
            })?;

        match fetched {
            Ok(entries) => return Ok(entries),
            Err(ScrapeError::Provider {
                from_block,
                to_block,
                source,
            }) if source.is_rate_limited() && attempt < config.max_retries => {
                let backoff_ms = RETRY_BASE_DELAY_MS * 2_u64.pow(attempt);
                attempt += 1;
                warn!(
                    from_block,
                    to_block,
                    attempt,
                    max_retries = config.max_retries,
                    backoff_ms,
                    "rate limited, backing off"
                );
                sleep(Duration::from_millis(backoff_ms)).await;
            }
            Err(err) => return Err(err),
        }
    }
}
