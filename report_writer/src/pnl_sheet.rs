use std::path::{Path, PathBuf};
use tracing::info;
use wallet_core::WalletPnl;

use crate::table_writer::{Cell, TableFormat, TableWriter};
use crate::Result;

pub const PNL_SHEET_NAME: &str = "PnL Data";

pub const PNL_COLUMNS: [&str; 16] = [
    "Wallet Address",
    "Realised PnL USD (7D)",
    "Realised ROI % (7D)",
    "Winrate",
    "Realized PnL USD (30D)",
    "Realise ROI % (30D)",
    "Buys 7 Days",
    "Sells 7 Days",
    "Buys 30 Days",
    "Sells 30 Days",
    "7 Day losses greater than -50%",
    "7 Day losses 0% ~ -50%",
    "7 Day wins 0% ~ 200%",
    "7 Day wins 200% ~ 500%",
    "7 Day wins > 500%",
    "Wallet Tags",
];

fn amount(value: Option<f64>) -> Cell {
    value.map(Cell::Number).unwrap_or(Cell::Empty)
}

fn count(value: Option<u64>) -> Cell {
    amount(value.map(|v| v as f64))
}

fn percent(fraction: Option<f64>) -> Cell {
    amount(fraction.map(|f| f * 100.0))
}

/// One sheet row; fractions become percentages
pub fn pnl_row(stats: &WalletPnl) -> Vec<Cell> {
    vec![
        stats
            .wallet
            .as_ref()
            .map(|w| Cell::text(w.as_str()))
            .unwrap_or(Cell::Empty),
        amount(stats.realized_profit_7d),
        percent(stats.pnl_7d),
        percent(stats.winrate),
        amount(stats.realized_profit_30d),
        percent(stats.pnl_30d),
        count(stats.buy_7d),
        count(stats.sell_7d),
        count(stats.buy_30d),
        count(stats.sell_30d),
        count(stats.pnl_lt_minus_dot5_num),
        count(stats.pnl_minus_dot5_0x_num),
        count(stats.pnl_lt_2x_num),
        count(stats.pnl_2x_5x_num),
        count(stats.pnl_gt_5x_num),
        stats
            .tags
            .as_ref()
            .map(|tags| Cell::text(tags.join(", ")))
            .unwrap_or(Cell::Empty),
    ]
}

/// Write `{output_dir}/{token_address}.{xlsx|csv}`
pub fn write_pnl_sheet<P: AsRef<Path>>(
    output_dir: P,
    token_address: &str,
    format: TableFormat,
    records: &[WalletPnl],
) -> Result<PathBuf> {
    let path = output_dir
        .as_ref()
        .join(format!("{}.{}", token_address, format.extension()));
    let rows: Vec<Vec<Cell>> = records.iter().map(pnl_row).collect();

    let written = TableWriter::new(PNL_COLUMNS, format)
        .with_sheet_name(PNL_SHEET_NAME)
        .write(&path, &rows)?;
    info!("Exported {} wallets to {}", records.len(), written.display());
    Ok(written)
}
