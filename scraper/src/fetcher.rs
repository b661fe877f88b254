//! Per-window event retrieval through a scoped server-side filter.
//!
//! `eth_newFilter` allocates state on the node keyed by the returned id, and
//! that state stays allocated until someone uninstalls it. `InstalledFilter`
//! owns the id: retrieval failures still run the uninstall path, and a
//! teardown failure after a successful fetch is logged rather than aborting
//! the run, since the data is already in hand.

use alloy::primitives::Address;
use swap_logs::client::{ChainClient, FilterId, RawLogEntry};
use tracing::warn;

use crate::{error::ScrapeError, partition::BlockWindow};

/// Fetches all matching log entries for one contract + event signature.
pub struct EventFetcher<'a, C> {
    client: &'a C,
    contract: Address,
    event_signature: &'a str,
}

impl<'a, C: ChainClient> EventFetcher<'a, C> {
    pub fn new(client: &'a C, contract: Address, event_signature: &'a str) -> Self {
        Self {
            client,
            contract,
            event_signature,
        }
    }

    /// Retrieve every entry in `window`, releasing the filter on all paths.
    pub async fn fetch(&self, window: BlockWindow) -> Result<Vec<RawLogEntry>, ScrapeError> {
        let filter =
            InstalledFilter::install(self.client, self.contract, self.event_signature, window)
                .await?;
        let entries = filter.entries().await;
        filter.uninstall().await;

        entries
    }
}

/// Scoped handle over a transient server-side log filter.
struct InstalledFilter<'a, C> {
    client: &'a C,
    id: FilterId,
    window: BlockWindow,
    released: bool,
}

impl<'a, C: ChainClient> InstalledFilter<'a, C> {
    async fn install(
        client: &'a C,
        contract: Address,
        event_signature: &str,
        window: BlockWindow,
    ) -> Result<InstalledFilter<'a, C>, ScrapeError> {
        let id = client
            .install_log_filter(contract, event_signature, window.from_block, window.to_block)
            .await
            .map_err(|source| ScrapeError::Provider {
                from_block: window.from_block,
                to_block: window.to_block,
                source,
            })?;

        Ok(Self {
            client,
            id,
            window,
            released: false,
        })
    }

    async fn entries(&self) -> Result<Vec<RawLogEntry>, ScrapeError> {
        self.client
            .filter_entries(self.id)
            .await
            .map_err(|source| ScrapeError::Provider {
                from_block: self.window.from_block,
                to_block: self.window.to_block,
                source,
            })
    }

    /// Release the server-side filter. Failure is surfaced as a warning so
    /// operators can clean up, never as an abort.
    async fn uninstall(mut self) {
        self.released = true;

        match self.client.uninstall_log_filter(self.id).await {
            Ok(true) => {}
            Ok(false) => warn!(filter_id = %self.id, "node had already forgotten the log filter"),
            Err(err) => warn!(
                filter_id = %self.id,
                error = %err,
                "log filter teardown failed; server-side state may leak"
            ),
        }
    }
}

impl<C> Drop for InstalledFilter<'_, C> {
    fn drop(&mut self) {
        // Reached when the fetch future is cancelled, e.g. by a timeout.
        if !self.released {
            warn!(filter_id = %self.id, "log filter dropped without uninstall");
        }
    }
}
