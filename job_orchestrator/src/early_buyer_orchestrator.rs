use chrono::{DateTime, Utc};
use config_manager::SystemConfig;
use dex_client::{
    GmgnClient, HeliusClient, PnlLookup, TransactionEnricher, TransactionLookup,
};
use solana_client::{
    PagerCompletion, SignaturePager, SignatureSource, SolanaClient, SolanaClientConfig,
};
use std::path::PathBuf;
use tracing::{debug, error, info, warn};
use uuid::Uuid;
use wallet_core::{
    sort_by_slot, unique_fee_payers, BuyClassifier, EarlyWindow, VerdictBreakdown,
    WalletAddress, WalletPnl,
};

use crate::Result;

/// Everything learned about a token before PnL lookup
#[derive(Debug, Clone)]
pub struct DiscoveryOutcome {
    pub signatures_fetched: usize,
    pub signature_walk: PagerCompletion,
    pub early_candidates: usize,
    pub enriched: usize,
    /// 1-based indices of enrichment batches that failed
    pub failed_batches: Vec<usize>,
    pub breakdown: VerdictBreakdown,
    /// Distinct fee payers before the wallet cap
    pub unique_wallets: usize,
    /// Early buyers in slot order, capped at `max_wallets`
    pub wallets: Vec<WalletAddress>,
}

/// Summary of one full run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: Uuid,
    pub token_address: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub discovery: DiscoveryOutcome,
    pub pnl_records: usize,
    pub pnl_failures: usize,
    pub pnl_without_data: usize,
    pub output_path: PathBuf,
}

impl RunReport {
    pub fn duration_seconds(&self) -> i64 {
        (self.finished_at - self.started_at).num_seconds()
    }
}

/// PnL records gathered for a wallet list
#[derive(Debug, Default)]
pub struct PnlAggregation {
    pub records: Vec<WalletPnl>,
    pub failures: usize,
    pub without_data: usize,
}

/// Sequences pagination, windowing, enrichment, classification,
/// deduplication, PnL lookup and export for one token
pub struct EarlyBuyerOrchestrator<S, L, P> {
    config: SystemConfig,
    pager: SignaturePager<S>,
    enricher: TransactionEnricher<L>,
    pnl_lookup: P,
    classifier: BuyClassifier,
    window: EarlyWindow,
}

impl EarlyBuyerOrchestrator<SolanaClient, HeliusClient, GmgnClient> {
    /// Build the production clients from a configuration.
    ///
    /// Validation runs here, so missing credentials fail before any request.
    pub fn from_config(config: SystemConfig) -> Result<Self> {
        config.validate()?;

        let solana = SolanaClient::new(SolanaClientConfig {
            rpc_url: config.rpc.endpoint(),
            rpc_timeout_seconds: config.rpc.request_timeout_seconds,
            retry: config.retry.clone(),
        })?;
        let helius = HeliusClient::new(config.helius.clone(), config.retry.clone())?;
        let gmgn = GmgnClient::new(config.gmgn.clone(), config.retry.clone())?;

        Ok(Self::new(config, solana, helius, gmgn))
    }
}

impl<S, L, P> EarlyBuyerOrchestrator<S, L, P>
where
    S: SignatureSource,
    L: TransactionLookup,
    P: PnlLookup,
{
    pub fn new(config: SystemConfig, source: S, lookup: L, pnl_lookup: P) -> Self {
        let pager = SignaturePager::new(source, config.rpc.page_size);
        let enricher = TransactionEnricher::new(
            lookup,
            config.helius.batch_size,
            config.helius.max_concurrent_batches,
        );
        let classifier = BuyClassifier::new(config.discovery.min_buy_sol);
        let window = EarlyWindow::new(
            config.discovery.early_window_start,
            config.discovery.early_window_end,
        );

        Self {
            config,
            pager,
            enricher,
            pnl_lookup,
            classifier,
            window,
        }
    }

    fn token_address(&self) -> &str {
        &self.config.discovery.token_address
    }

    /// Find the early buyers of the configured token
    pub async fn discover_early_buyers(&self) -> DiscoveryOutcome {
        let token = self.token_address();
        info!("🔍 Fetching signature history for token {}", token);

        let history = self.pager.fetch_all(token).await;
        if !history.is_complete() {
            warn!(
                "⚠️ Signature history for {} is partial ({} signatures, cursor {:?})",
                token,
                history.signatures.len(),
                history.cursor
            );
        }
        let signatures_fetched = history.signatures.len();

        let candidates = self.window.select(history.signatures);
        info!(
            "🪟 Selected {} early candidates out of {} signatures (window [{}, {}))",
            candidates.len(),
            signatures_fetched,
            self.window.start,
            self.window.end
        );

        let candidate_signatures: Vec<String> =
            candidates.into_iter().map(|s| s.signature).collect();
        let enrichment = self.enricher.enrich(&candidate_signatures).await;
        let enriched = enrichment.transactions.len();

        let mut filtered = self.classifier.filter(enrichment.transactions);
        info!(
            "🛒 {} qualifying buys of at least {} SOL out of {} enriched transactions (below threshold: {}, sells: {}, no token movement: {}, missing payer data: {})",
            filtered.breakdown.qualifying,
            self.classifier.min_buy_sol(),
            filtered.breakdown.total(),
            filtered.breakdown.below_threshold,
            filtered.breakdown.sells,
            filtered.breakdown.no_token_movement,
            filtered.breakdown.missing_fee_payer
        );

        sort_by_slot(&mut filtered.qualifying);
        let mut wallets = unique_fee_payers(&filtered.qualifying);
        let unique_wallets = wallets.len();
        wallets.truncate(self.config.discovery.max_wallets);

        info!(
            "👛 {} unique early buyers, keeping {}",
            unique_wallets,
            wallets.len()
        );

        DiscoveryOutcome {
            signatures_fetched,
            signature_walk: history.completion,
            early_candidates: candidate_signatures.len(),
            enriched,
            failed_batches: enrichment.failed_batches,
            breakdown: filtered.breakdown,
            unique_wallets,
            wallets,
        }
    }

    /// Look up every wallet in order, one request at a time
    pub async fn aggregate_pnl(&self, wallets: &[WalletAddress]) -> PnlAggregation {
        let mut aggregation = PnlAggregation::default();
        let total = wallets.len();

        for (index, wallet) in wallets.iter().enumerate() {
            info!("Aggregating {} / {}", index + 1, total);

            match self.pnl_lookup.wallet_pnl(wallet).await {
                Ok(Some(stats)) => aggregation.records.push(stats),
                Ok(None) => {
                    debug!("No PnL data for {}", wallet);
                    aggregation.without_data += 1;
                }
                Err(e) => {
                    error!("Error fetching PnL for address {}: {}", wallet, e);
                    aggregation.failures += 1;
                }
            }
        }

        aggregation
    }

    /// Full pipeline; only the final export can fail the run
    pub async fn run(&self) -> Result<RunReport> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        info!("🚀 Starting early buyer run {} for {}", run_id, self.token_address());

        let discovery = self.discover_early_buyers().await;
        let aggregation = self.aggregate_pnl(&discovery.wallets).await;

        let output_path = report_writer::write_pnl_sheet(
            &self.config.export.output_dir,
            self.token_address(),
            self.config.export.format,
            &aggregation.records,
        )?;

        let report = RunReport {
            run_id,
            token_address: self.token_address().to_string(),
            started_at,
            finished_at: Utc::now(),
            discovery,
            pnl_records: aggregation.records.len(),
            pnl_failures: aggregation.failures,
            pnl_without_data: aggregation.without_data,
            output_path,
        };

        info!(
            "✅ Run {} finished in {}s: {} wallets exported to {} ({} failed, {} without data)",
            report.run_id,
            report.duration_seconds(),
            report.pnl_records,
            report.output_path.display(),
            report.pnl_failures,
            report.pnl_without_data
        );

        Ok(report)
    }
}
