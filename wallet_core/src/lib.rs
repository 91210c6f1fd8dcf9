// Early-buyer domain model, the pure filtering steps of the discovery
// pipeline (windowing, buy classification, wallet deduplication) and the
// wallet statistics record handed to export.

pub mod buy_classifier;
pub mod types;
pub mod wallet_dedup;
pub mod wallet_pnl;
pub mod window;

pub use buy_classifier::{
    abs_lamports_to_sol, BuyClassifier, BuyVerdict, FilterOutcome, VerdictBreakdown,
    DEFAULT_MIN_BUY_SOL,
};
pub use types::{
    AccountBalanceDelta, EnrichedTransaction, QualifyingTransaction, Signature, TokenTransfer,
    WalletAddress,
};
pub use wallet_dedup::{sort_by_slot, unique_fee_payers};
pub use wallet_pnl::WalletPnl;
pub use window::EarlyWindow;
