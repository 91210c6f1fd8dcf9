use serde::{Deserialize, Serialize};

use crate::types::WalletAddress;

/// GMGN smart-money statistics for one wallet.
///
/// Ratios (`pnl_*`, `winrate`) are fractions, so 0.25 means 25%.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WalletPnl {
    /// Filled in by the lookup client; GMGN does not echo the address back
    #[serde(default)]
    pub wallet: Option<WalletAddress>,
    #[serde(default)]
    pub realized_profit_7d: Option<f64>,
    #[serde(default)]
    pub pnl_7d: Option<f64>,
    #[serde(default)]
    pub winrate: Option<f64>,
    #[serde(default)]
    pub realized_profit_30d: Option<f64>,
    #[serde(default)]
    pub pnl_30d: Option<f64>,
    #[serde(default)]
    pub buy_7d: Option<u64>,
    #[serde(default)]
    pub sell_7d: Option<u64>,
    #[serde(default)]
    pub buy_30d: Option<u64>,
    #[serde(default)]
    pub sell_30d: Option<u64>,
    #[serde(default)]
    pub pnl_lt_minus_dot5_num: Option<u64>,
    #[serde(default)]
    pub pnl_minus_dot5_0x_num: Option<u64>,
    #[serde(default)]
    pub pnl_lt_2x_num: Option<u64>,
    #[serde(default)]
    pub pnl_2x_5x_num: Option<u64>,
    #[serde(default)]
    pub pnl_gt_5x_num: Option<u64>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

impl WalletPnl {
    pub fn with_wallet(mut self, wallet: WalletAddress) -> Self {
        self.wallet = Some(wallet);
        self
    }
}
