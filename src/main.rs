use anyhow::Context;
use config_manager::{ConfigManager, SystemConfig};
use job_orchestrator::EarlyBuyerOrchestrator;
use tracing::{error, info};

fn init_tracing(debug_mode: bool) {
    let default_filter = if debug_mode { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();
}

async fn run(manager: ConfigManager) -> anyhow::Result<()> {
    info!(
        "Looking for early buyers of {}",
        manager.config().discovery.token_address
    );
    let orchestrator = EarlyBuyerOrchestrator::from_config(manager.into_config())
        .context("Failed to initialise pipeline clients")?;

    let report = orchestrator.run().await.context("Early buyer run failed")?;

    info!(
        "Found {} early buyers for {}, {} exported to {}",
        report.discovery.wallets.len(),
        report.token_address,
        report.pnl_records,
        report.output_path.display()
    );
    Ok(())
}

#[tokio::main]
async fn main() {
    // A missing .env is fine; the environment may already carry the keys
    dotenvy::dotenv().ok();

    // Unvalidated peek so logging is up before validation errors are reported
    let debug_mode = SystemConfig::build_from_path("config.toml")
        .map(|config| config.system.debug_mode)
        .unwrap_or(false);
    init_tracing(debug_mode);

    let result = match ConfigManager::new() {
        Ok(manager) => run(manager).await,
        Err(e) => Err(anyhow::Error::new(e).context("Failed to load configuration")),
    };

    if let Err(e) = result {
        error!("{:#}", e);
        std::process::exit(1);
    }
}
