//! End-to-end pipeline runs against in-memory signature, transaction and PnL services

use async_trait::async_trait;
use config_manager::{SystemConfig, TableFormat};
use dex_client::{GmgnError, HeliusError, PnlLookup, TransactionLookup};
use job_orchestrator::{EarlyBuyerOrchestrator, OrchestratorError};
use rust_decimal_macros::dec;
use solana_client::{PagerCompletion, SignatureSource, SolanaClientError};
use std::collections::{HashMap, HashSet, VecDeque};
use std::fs;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use wallet_core::{
    AccountBalanceDelta, EnrichedTransaction, Signature, TokenTransfer, WalletAddress, WalletPnl,
};

const TOKEN: &str = "TokenMint1111111111111111111111111111111111";
const POOL: &str = "PoolAuthority11111111111111111111111111111";

// ---------- fakes ----------

struct FakeSignatures {
    pages: Mutex<VecDeque<solana_client::Result<Vec<Signature>>>>,
}

impl FakeSignatures {
    /// Serves `signatures` newest first in pages of `page_size`, then an empty page
    fn paged(mut signatures: Vec<Signature>, page_size: usize) -> Self {
        signatures.sort_by(|a, b| b.slot.cmp(&a.slot));
        let pages = signatures
            .chunks(page_size)
            .map(|chunk| Ok(chunk.to_vec()))
            .collect();
        Self {
            pages: Mutex::new(pages),
        }
    }

    fn scripted(pages: Vec<solana_client::Result<Vec<Signature>>>) -> Self {
        Self {
            pages: Mutex::new(pages.into()),
        }
    }
}

#[async_trait]
impl SignatureSource for FakeSignatures {
    async fn signatures_before(
        &self,
        _address: &str,
        _before: Option<&str>,
        _limit: u32,
    ) -> solana_client::Result<Vec<Signature>> {
        self.pages.lock().unwrap().pop_front().unwrap_or(Ok(Vec::new()))
    }
}

#[derive(Clone, Default)]
struct FakeTransactions {
    by_signature: Arc<HashMap<String, EnrichedTransaction>>,
    failing_signatures: Arc<HashSet<String>>,
    requested: Arc<Mutex<Vec<Vec<String>>>>,
}

impl FakeTransactions {
    fn new(transactions: Vec<EnrichedTransaction>) -> Self {
        Self {
            by_signature: Arc::new(
                transactions
                    .into_iter()
                    .map(|t| (t.signature.clone(), t))
                    .collect(),
            ),
            ..Default::default()
        }
    }

    /// Any batch containing `signature` fails as a whole
    fn failing_on(mut self, signature: &str) -> Self {
        let mut failing = (*self.failing_signatures).clone();
        failing.insert(signature.to_string());
        self.failing_signatures = Arc::new(failing);
        self
    }

    fn requested(&self) -> Vec<Vec<String>> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl TransactionLookup for FakeTransactions {
    async fn lookup_batch(
        &self,
        signatures: &[String],
    ) -> dex_client::helius_client::Result<Vec<EnrichedTransaction>> {
        self.requested.lock().unwrap().push(signatures.to_vec());

        if signatures.iter().any(|s| self.failing_signatures.contains(s)) {
            return Err(HeliusError::ApiError {
                status: 503,
                message: "service unavailable".to_string(),
            });
        }

        Ok(signatures
            .iter()
            .filter_map(|s| self.by_signature.get(s).cloned())
            .collect())
    }
}

#[derive(Clone, Default)]
struct FakePnl {
    failing: Arc<HashSet<String>>,
    without_data: Arc<HashSet<String>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl FakePnl {
    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PnlLookup for FakePnl {
    async fn wallet_pnl(
        &self,
        wallet: &WalletAddress,
    ) -> dex_client::gmgn_client::Result<Option<WalletPnl>> {
        self.calls.lock().unwrap().push(wallet.to_string());

        if self.failing.contains(wallet.as_str()) {
            return Err(GmgnError::ApiError {
                status: 500,
                message: "upstream error".to_string(),
            });
        }
        if self.without_data.contains(wallet.as_str()) {
            return Ok(None);
        }

        Ok(Some(
            WalletPnl {
                realized_profit_7d: Some(100.0),
                pnl_7d: Some(0.5),
                winrate: Some(0.75),
                buy_7d: Some(3),
                tags: Some(vec!["smart_degen".to_string()]),
                ..Default::default()
            }
            .with_wallet(wallet.clone()),
        ))
    }
}

// ---------- fixtures ----------

fn buy(signature: &str, slot: u64, payer: &str, lamports: i64) -> EnrichedTransaction {
    EnrichedTransaction {
        signature: signature.to_string(),
        slot,
        fee_payer: payer.to_string(),
        account_data: vec![AccountBalanceDelta {
            account: payer.to_string(),
            native_balance_change: -lamports,
        }],
        token_transfers: vec![TokenTransfer {
            from_user_account: Some(POOL.to_string()),
            to_user_account: Some(payer.to_string()),
            mint: Some(TOKEN.to_string()),
            token_amount: Some(1_000.0),
        }],
        ..Default::default()
    }
}

fn sell(signature: &str, slot: u64, payer: &str) -> EnrichedTransaction {
    let mut tx = buy(signature, slot, payer, -2_000_000_000);
    tx.token_transfers[0].from_user_account = Some(payer.to_string());
    tx.token_transfers[0].to_user_account = Some(POOL.to_string());
    tx
}

fn signatures_for_slots(slots: impl IntoIterator<Item = u64>) -> Vec<Signature> {
    slots
        .into_iter()
        .map(|slot| Signature::new(format!("sig-{}", slot), slot))
        .collect()
}

fn test_config(output: &TempDir) -> SystemConfig {
    let mut config = SystemConfig::default();
    config.discovery.token_address = TOKEN.to_string();
    config.export.output_dir = output.path().display().to_string();
    config.export.format = TableFormat::Csv;
    config
}

fn exported_rows(output: &TempDir) -> Vec<String> {
    let content = fs::read_to_string(output.path().join(format!("{}.csv", TOKEN))).unwrap();
    content.lines().skip(1).map(str::to_string).collect()
}

// ---------- tests ----------

#[tokio::test]
async fn test_three_signatures_skip_the_earliest_slot() {
    let output = TempDir::new().unwrap();
    let transactions = FakeTransactions::new(vec![
        buy("sig-3", 3, "Minter", 5_000_000_000),
        buy("sig-4", 4, "EarlyBuyer", 500_000_000),
        buy("sig-5", 5, "LaterBuyer", 500_000_000),
    ]);
    let pnl = FakePnl::default();
    let orchestrator = EarlyBuyerOrchestrator::new(
        test_config(&output),
        FakeSignatures::scripted(vec![Ok(signatures_for_slots([5, 3, 4]))]),
        transactions.clone(),
        pnl.clone(),
    );

    let report = orchestrator.run().await.unwrap();

    // Sorted slots are [3, 4, 5]; positions 1 and 2 fall inside [1, 500)
    assert_eq!(report.discovery.signatures_fetched, 3);
    assert_eq!(report.discovery.early_candidates, 2);
    assert_eq!(
        transactions.requested(),
        vec![vec!["sig-4".to_string(), "sig-5".to_string()]]
    );
    assert_eq!(
        report.discovery.wallets,
        vec![WalletAddress::from("EarlyBuyer"), WalletAddress::from("LaterBuyer")]
    );
    assert_eq!(pnl.calls(), vec!["EarlyBuyer", "LaterBuyer"]);

    let rows = exported_rows(&output);
    assert_eq!(rows.len(), 2);
    assert!(rows[0].starts_with("EarlyBuyer,100,50,75,"));
    assert!(rows[1].starts_with("LaterBuyer,"));
    assert_eq!(report.output_path, output.path().join(format!("{}.csv", TOKEN)));
}

#[tokio::test]
async fn test_default_export_is_an_xlsx_workbook() {
    let output = TempDir::new().unwrap();
    let mut config = test_config(&output);
    config.export.format = TableFormat::default();

    let orchestrator = EarlyBuyerOrchestrator::new(
        config,
        FakeSignatures::scripted(vec![Ok(signatures_for_slots([2, 1, 0]))]),
        FakeTransactions::new(vec![
            buy("sig-1", 1, "First", 1_000_000_000),
            buy("sig-2", 2, "Second", 1_000_000_000),
        ]),
        FakePnl::default(),
    );

    let report = orchestrator.run().await.unwrap();

    assert_eq!(report.output_path, output.path().join(format!("{}.xlsx", TOKEN)));
    let wallets = report_writer::read_wallet_list(&report.output_path).unwrap();
    assert_eq!(wallets, vec!["First", "Second"]);
}

#[tokio::test]
async fn test_window_selects_indices_one_through_four_ninety_nine() {
    let output = TempDir::new().unwrap();
    let transactions = FakeTransactions::default();
    let orchestrator = EarlyBuyerOrchestrator::new(
        test_config(&output),
        FakeSignatures::paged(signatures_for_slots(1000..1600), 1000),
        transactions.clone(),
        FakePnl::default(),
    );

    let discovery = orchestrator.discover_early_buyers().await;

    assert_eq!(discovery.signatures_fetched, 600);
    assert_eq!(discovery.signature_walk, PagerCompletion::Exhausted);
    assert_eq!(discovery.early_candidates, 499);

    let requested: Vec<String> = transactions.requested().into_iter().flatten().collect();
    let expected: Vec<String> = (1001..1500).map(|slot| format!("sig-{}", slot)).collect();
    assert_eq!(requested, expected);

    let batch_sizes: Vec<usize> = transactions.requested().iter().map(Vec::len).collect();
    assert_eq!(batch_sizes, vec![100, 100, 100, 100, 99]);
}

#[tokio::test]
async fn test_failed_enrichment_batch_is_skipped() {
    let output = TempDir::new().unwrap();
    let mut config = test_config(&output);
    config.helius.batch_size = 2;

    // Slot 10 is the mint; candidates are slots 11..=16 in batches of two
    let buys: Vec<EnrichedTransaction> = (11..=16)
        .map(|slot| buy(&format!("sig-{}", slot), slot, &format!("W{}", slot), 1_000_000_000))
        .collect();
    let transactions = FakeTransactions::new(buys).failing_on("sig-13");

    let orchestrator = EarlyBuyerOrchestrator::new(
        config,
        FakeSignatures::scripted(vec![Ok(signatures_for_slots(10..=16))]),
        transactions,
        FakePnl::default(),
    );

    let discovery = orchestrator.discover_early_buyers().await;

    assert_eq!(discovery.failed_batches, vec![2]);
    assert_eq!(discovery.enriched, 4);
    let wallets: Vec<&str> = discovery.wallets.iter().map(WalletAddress::as_str).collect();
    assert_eq!(wallets, vec!["W11", "W12", "W15", "W16"]);
}

#[tokio::test]
async fn test_classification_and_dedup_follow_slot_order() {
    let output = TempDir::new().unwrap();
    let transactions = FakeTransactions::new(vec![
        buy("sig-2", 2, "Alice", 1_000_000_000),
        buy("sig-3", 3, "Bob", 100_000_000),
        sell("sig-4", 4, "Carol"),
        buy("sig-5", 5, "Alice", 3_000_000_000),
        buy("sig-6", 6, "Dave", 400_000_000),
    ]);
    let orchestrator = EarlyBuyerOrchestrator::new(
        test_config(&output),
        FakeSignatures::scripted(vec![
            Ok(signatures_for_slots([6, 5, 4])),
            Ok(signatures_for_slots([3, 2, 1])),
        ]),
        transactions,
        FakePnl::default(),
    );

    let discovery = orchestrator.discover_early_buyers().await;

    assert_eq!(discovery.breakdown.qualifying, 3);
    assert_eq!(discovery.breakdown.below_threshold, 1);
    assert_eq!(discovery.breakdown.sells, 1);
    assert_eq!(discovery.unique_wallets, 2);
    let wallets: Vec<&str> = discovery.wallets.iter().map(WalletAddress::as_str).collect();
    assert_eq!(wallets, vec!["Alice", "Dave"]);
}

#[tokio::test]
async fn test_wallets_capped_before_pnl_lookup() {
    let output = TempDir::new().unwrap();
    let buys: Vec<EnrichedTransaction> = (1..=150)
        .map(|slot| buy(&format!("sig-{}", slot), slot, &format!("W{:03}", slot), 600_000_000))
        .collect();
    let pnl = FakePnl::default();
    let orchestrator = EarlyBuyerOrchestrator::new(
        test_config(&output),
        FakeSignatures::paged(signatures_for_slots(0..=150), 1000),
        FakeTransactions::new(buys),
        pnl.clone(),
    );

    let report = orchestrator.run().await.unwrap();

    assert_eq!(report.discovery.unique_wallets, 150);
    assert_eq!(report.discovery.wallets.len(), 100);
    let calls = pnl.calls();
    assert_eq!(calls.len(), 100);
    assert_eq!(calls.first().map(String::as_str), Some("W001"));
    assert_eq!(calls.last().map(String::as_str), Some("W100"));
    assert_eq!(exported_rows(&output).len(), 100);
}

#[tokio::test]
async fn test_max_wallets_and_threshold_are_configurable() {
    let output = TempDir::new().unwrap();
    let mut config = test_config(&output);
    config.discovery.max_wallets = 1;
    config.discovery.min_buy_sol = dec!(2);

    let transactions = FakeTransactions::new(vec![
        buy("sig-1", 1, "Small", 1_000_000_000),
        buy("sig-2", 2, "Big", 2_500_000_000),
        buy("sig-3", 3, "Bigger", 9_000_000_000),
    ]);
    let orchestrator = EarlyBuyerOrchestrator::new(
        config,
        FakeSignatures::scripted(vec![Ok(signatures_for_slots([3, 2, 1, 0]))]),
        transactions,
        FakePnl::default(),
    );

    let discovery = orchestrator.discover_early_buyers().await;
    assert_eq!(discovery.unique_wallets, 2);
    assert_eq!(discovery.wallets, vec![WalletAddress::from("Big")]);
}

#[tokio::test]
async fn test_pnl_failures_are_isolated() {
    let output = TempDir::new().unwrap();
    let transactions = FakeTransactions::new(vec![
        buy("sig-1", 1, "Good1", 1_000_000_000),
        buy("sig-2", 2, "Broken", 1_000_000_000),
        buy("sig-3", 3, "Empty", 1_000_000_000),
        buy("sig-4", 4, "Good2", 1_000_000_000),
    ]);
    let pnl = FakePnl {
        failing: Arc::new(HashSet::from(["Broken".to_string()])),
        without_data: Arc::new(HashSet::from(["Empty".to_string()])),
        ..Default::default()
    };
    let orchestrator = EarlyBuyerOrchestrator::new(
        test_config(&output),
        FakeSignatures::scripted(vec![Ok(signatures_for_slots([4, 3, 2, 1, 0]))]),
        transactions,
        pnl.clone(),
    );

    let report = orchestrator.run().await.unwrap();

    assert_eq!(pnl.calls(), vec!["Good1", "Broken", "Empty", "Good2"]);
    assert_eq!(report.pnl_records, 2);
    assert_eq!(report.pnl_failures, 1);
    assert_eq!(report.pnl_without_data, 1);

    let wallets: Vec<String> = exported_rows(&output)
        .iter()
        .map(|row| row.split(',').next().unwrap().to_string())
        .collect();
    assert_eq!(wallets, vec!["Good1", "Good2"]);
}

#[tokio::test]
async fn test_pagination_failure_keeps_partial_history() {
    let output = TempDir::new().unwrap();
    let transactions = FakeTransactions::new(vec![
        buy("sig-8", 8, "Late", 1_000_000_000),
        buy("sig-9", 9, "Later", 1_000_000_000),
    ]);
    let orchestrator = EarlyBuyerOrchestrator::new(
        test_config(&output),
        FakeSignatures::scripted(vec![
            Ok(signatures_for_slots([9, 8, 7])),
            Err(SolanaClientError::Rpc {
                code: -32005,
                message: "node is behind".to_string(),
            }),
        ]),
        transactions,
        FakePnl::default(),
    );

    let report = orchestrator.run().await.unwrap();

    assert!(matches!(
        report.discovery.signature_walk,
        PagerCompletion::FailStopped { .. }
    ));
    assert_eq!(report.discovery.signatures_fetched, 3);
    // Slot 7 is treated as the first transaction of the partial history
    let wallets: Vec<&str> = report.discovery.wallets.iter().map(WalletAddress::as_str).collect();
    assert_eq!(wallets, vec!["Late", "Later"]);
}

#[tokio::test]
async fn test_empty_history_exports_header_only() {
    let output = TempDir::new().unwrap();
    let pnl = FakePnl::default();
    let transactions = FakeTransactions::default();
    let orchestrator = EarlyBuyerOrchestrator::new(
        test_config(&output),
        FakeSignatures::scripted(vec![]),
        transactions.clone(),
        pnl.clone(),
    );

    let report = orchestrator.run().await.unwrap();

    assert_eq!(report.discovery.signatures_fetched, 0);
    assert!(transactions.requested().is_empty());
    assert!(pnl.calls().is_empty());
    assert!(exported_rows(&output).is_empty());
}

#[test]
fn test_missing_credentials_fail_before_any_request() {
    let output = TempDir::new().unwrap();
    let config = test_config(&output);

    match EarlyBuyerOrchestrator::from_config(config) {
        Err(OrchestratorError::Config(message)) => assert!(message.contains("API key")),
        Err(other) => panic!("expected configuration error, got {}", other),
        Ok(_) => panic!("expected configuration error"),
    }
}
