// Helius and GMGN clients - transaction enrichment and wallet statistics
// Batches signature lookups and fetches per-wallet PnL records

pub mod gmgn_client;
pub mod helius_client;
pub mod transaction_enricher;

// Re-export configs from config_manager
pub use config_manager::{GmgnConfig, HeliusConfig};

pub use gmgn_client::{GmgnClient, GmgnError, PnlLookup};
pub use helius_client::{HeliusClient, HeliusError, TransactionLookup};
pub use transaction_enricher::{EnrichmentOutcome, TransactionEnricher, MAX_BATCH_SIZE};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DexClientError {
    #[error("Helius API error: {0}")]
    Helius(#[from] HeliusError),
    #[error("GMGN API error: {0}")]
    Gmgn(#[from] GmgnError),
}
