use futures::stream::{self, StreamExt};
use tracing::{debug, error, info};
use wallet_core::EnrichedTransaction;

use crate::helius_client::TransactionLookup;

/// Helius accepts at most this many signatures per request
pub const MAX_BATCH_SIZE: usize = 100;

/// Result of enriching a list of signatures
#[derive(Debug, Default)]
pub struct EnrichmentOutcome {
    /// Records of every successful batch, in batch order
    pub transactions: Vec<EnrichedTransaction>,
    pub batches_total: usize,
    /// 1-based indices of the batches that failed
    pub failed_batches: Vec<usize>,
}

impl EnrichmentOutcome {
    pub fn failed_count(&self) -> usize {
        self.failed_batches.len()
    }
}

/// Splits signatures into fixed-size batches and looks each one up.
///
/// A failed batch is logged and skipped; the remaining batches still
/// contribute. Output order always follows batch order, whatever the
/// concurrency.
pub struct TransactionEnricher<L> {
    lookup: L,
    batch_size: usize,
    max_concurrent_batches: usize,
}

impl<L: TransactionLookup> TransactionEnricher<L> {
    pub fn new(lookup: L, batch_size: usize, max_concurrent_batches: usize) -> Self {
        Self {
            lookup,
            batch_size: batch_size.clamp(1, MAX_BATCH_SIZE),
            max_concurrent_batches: max_concurrent_batches.max(1),
        }
    }

    pub fn lookup(&self) -> &L {
        &self.lookup
    }

    pub async fn enrich(&self, signatures: &[String]) -> EnrichmentOutcome {
        let batches: Vec<&[String]> = signatures.chunks(self.batch_size).collect();
        let batches_total = batches.len();

        info!(
            "Enriching {} signatures in {} batches of up to {}",
            signatures.len(),
            batches_total,
            self.batch_size
        );

        let results: Vec<_> = stream::iter(batches.into_iter().enumerate())
            .map(|(index, batch)| async move {
                debug!("Fetching batch {}/{} ({} signatures)", index + 1, batches_total, batch.len());
                (index + 1, self.lookup.lookup_batch(batch).await)
            })
            .buffered(self.max_concurrent_batches)
            .collect()
            .await;

        let mut outcome = EnrichmentOutcome {
            batches_total,
            ..Default::default()
        };

        for (batch_number, result) in results {
            match result {
                Ok(transactions) => outcome.transactions.extend(transactions),
                Err(e) => {
                    error!(
                        "Error fetching transaction details for batch {}/{}: {}",
                        batch_number, batches_total, e
                    );
                    outcome.failed_batches.push(batch_number);
                }
            }
        }

        info!(
            "Enriched {} transactions ({} of {} batches failed)",
            outcome.transactions.len(),
            outcome.failed_count(),
            batches_total
        );

        outcome
    }
}
