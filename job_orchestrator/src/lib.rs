// Early-buyer discovery pipeline: signatures -> enriched transactions ->
// qualifying buys -> unique wallets -> PnL records -> exported sheet

pub mod early_buyer_orchestrator;

pub use early_buyer_orchestrator::{
    DiscoveryOutcome, EarlyBuyerOrchestrator, PnlAggregation, RunReport,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Solana client error: {0}")]
    SolanaClient(String),
    #[error("DEX client error: {0}")]
    DexClient(String),
    #[error("Report error: {0}")]
    Report(String),
}

impl From<config_manager::ConfigurationError> for OrchestratorError {
    fn from(err: config_manager::ConfigurationError) -> Self {
        OrchestratorError::Config(err.to_string())
    }
}

impl From<solana_client::SolanaClientError> for OrchestratorError {
    fn from(err: solana_client::SolanaClientError) -> Self {
        OrchestratorError::SolanaClient(err.to_string())
    }
}

impl From<dex_client::DexClientError> for OrchestratorError {
    fn from(err: dex_client::DexClientError) -> Self {
        OrchestratorError::DexClient(err.to_string())
    }
}

impl From<dex_client::HeliusError> for OrchestratorError {
    fn from(err: dex_client::HeliusError) -> Self {
        dex_client::DexClientError::from(err).into()
    }
}

impl From<dex_client::GmgnError> for OrchestratorError {
    fn from(err: dex_client::GmgnError) -> Self {
        dex_client::DexClientError::from(err).into()
    }
}

impl From<report_writer::ReportError> for OrchestratorError {
    fn from(err: report_writer::ReportError) -> Self {
        OrchestratorError::Report(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, OrchestratorError>;
