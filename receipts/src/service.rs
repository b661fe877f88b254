//! Bounded-concurrency receipt lookups.
//!
//! Receipts are independent of each other and, unlike log filters, leave no
//! server-side state to tear down, so lookups fan out over a fixed-size
//! worker pool. Completion order is arbitrary; results are re-sorted by
//! `(block, transaction_index)` before they are returned.

use std::sync::Arc;

use alloy::primitives::B256;
use swap_logs::client::{ChainClient, ReceiptSummary};
use tokio::{sync::Semaphore, task::JoinSet};
use tracing::debug;

use crate::error::ReceiptError;

/// Fetch a receipt for every hash, at most `max_in_flight` lookups at once.
pub async fn fetch_all<C>(
    client: Arc<C>,
    transactions: Vec<B256>,
    max_in_flight: usize,
) -> Result<Vec<ReceiptSummary>, ReceiptError>
where
    C: ChainClient + 'static,
{
    if max_in_flight == 0 {
        return Err(ReceiptError::InvalidArgument(
            "worker pool size must be positive".into(),
        ));
    }

    let pool = Arc::new(Semaphore::new(max_in_flight));
    let mut workers = JoinSet::new();

    for transaction in transactions {
        let client = Arc::clone(&client);
        let pool = Arc::clone(&pool);

        workers.spawn(async move {
            let _permit = pool
                .acquire_owned()
                .await
                .map_err(|_| ReceiptError::Worker("receipt pool closed".into()))?;

            debug!(%transaction, "fetching receipt");
            client
                .transaction_receipt(transaction)
                .await
                .map_err(|source| ReceiptError::Lookup {
                    transaction,
                    source,
                })?
                .ok_or(ReceiptError::NotFound(transaction))
        });
    }

    let mut receipts = Vec::with_capacity(workers.len());
    while let Some(joined) = workers.join_next().await {
        let receipt = joined.map_err(|err| ReceiptError::Worker(err.to_string()))??;
        receipts.push(receipt);
    }

    receipts.sort_by_key(|receipt| (receipt.block, receipt.transaction_index));

    Ok(receipts)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use alloy::primitives::Address;
    use async_trait::async_trait;
    use swap_logs::client::{ClientError, FilterId, RawLogEntry};
    use tokio::time::sleep;

    use super::*;

    /// Answers receipt lookups after a per-hash delay so completion order
    /// differs from submission order.
    struct SlowReceipts;

    #[async_trait]
    impl ChainClient for SlowReceipts {
        async fn latest_block_number(&self) -> Result<u64, ClientError> {
            Ok(0)
        }

        async fn install_log_filter(
            &self,
            _contract: Address,
            _event_signature: &str,
            _from_block: u64,
            _to_block: u64,
        ) -> Result<FilterId, ClientError> {
            Err(ClientError::new("filters are not part of this stub"))
        }

        async fn filter_entries(
            &self,
            _filter_id: FilterId,
        ) -> Result<Vec<RawLogEntry>, ClientError> {
            Err(ClientError::new("filters are not part of this stub"))
        }

        async fn uninstall_log_filter(&self, _filter_id: FilterId) -> Result<bool, ClientError> {
            Err(ClientError::new("filters are not part of this stub"))
        }

        async fn transaction_receipt(
            &self,
            transaction: B256,
        ) -> Result<Option<ReceiptSummary>, ClientError> {
            let marker = transaction[0];
            if marker == 0xff {
                return Ok(None);
            }

            // later blocks answer faster, scrambling completion order
            sleep(Duration::from_millis(u64::from(255 - marker))).await;
            Ok(Some(ReceiptSummary {
                transaction,
                block: u64::from(marker),
                transaction_index: u64::from(marker % 3),
                succeeded: marker % 2 == 0,
                gas_used: 21_000,
            }))
        }
    }

    fn hash(marker: u8) -> B256 {
        B256::repeat_byte(marker)
    }

    #[tokio::test(start_paused = true)]
    async fn results_come_back_in_natural_key_order() {
        let client = Arc::new(SlowReceipts);
        let transactions = vec![hash(9), hash(3), hash(7), hash(1)];

        let receipts = fetch_all(client, transactions, 4).await.unwrap();

        let blocks: Vec<u64> = receipts.iter().map(|receipt| receipt.block).collect();
        assert_eq!(blocks, vec![1, 3, 7, 9]);
    }

    #[tokio::test(start_paused = true)]
    async fn pool_size_caps_concurrency_but_not_completeness() {
        let client = Arc::new(SlowReceipts);
        let transactions: Vec<B256> = (1..=20).map(hash).collect();

        let receipts = fetch_all(client, transactions, 2).await.unwrap();

        assert_eq!(receipts.len(), 20);
    }

    #[tokio::test]
    async fn zero_sized_pool_is_invalid() {
        let err = fetch_all(Arc::new(SlowReceipts), vec![hash(1)], 0)
            .await
            .unwrap_err();

        assert!(matches!(err, ReceiptError::InvalidArgument(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn missing_receipt_is_reported() {
        let err = fetch_all(Arc::new(SlowReceipts), vec![hash(0xff)], 1)
            .await
            .unwrap_err();

        assert!(matches!(err, ReceiptError::NotFound(tx) if tx == hash(0xff)));
    }
}
