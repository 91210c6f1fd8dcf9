use anyhow::Context;
use config_manager::{CompareConfig, SystemConfig};
use tracing::{error, info};

fn run(compare: &CompareConfig) -> anyhow::Result<()> {
    let files = report_writer::list_input_files(&compare.input_dir)
        .with_context(|| format!("Failed to list wallet lists in {}", compare.input_dir))?;
    info!("Comparing {} wallet lists from {}", files.len(), compare.input_dir);

    let occurrences = report_writer::count_wallet_occurrences(&files)?;
    let written = report_writer::write_occurrence_files(
        &compare.output_dir,
        &occurrences,
        files.len(),
        compare.output_format,
    )
    .with_context(|| format!("Failed to write results to {}", compare.output_dir))?;

    info!(
        "{} distinct wallets across {} lists, {} files written",
        occurrences.len(),
        files.len(),
        written.len()
    );
    Ok(())
}

fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // Credentials are irrelevant here, so the unvalidated build is enough
    let result = SystemConfig::build_from_path("config.toml")
        .and_then(|config| {
            config.compare.validate()?;
            Ok(config.compare)
        })
        .context("Failed to load configuration")
        .and_then(|compare| run(&compare));

    if let Err(e) = result {
        error!("{:#}", e);
        std::process::exit(1);
    }
}
