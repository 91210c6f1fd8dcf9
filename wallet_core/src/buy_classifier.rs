use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::{EnrichedTransaction, QualifyingTransaction};

pub const LAMPORTS_DECIMALS: u32 = 9;

/// Smallest fee-payer SOL movement that counts as a meaningful buy
pub const DEFAULT_MIN_BUY_SOL: Decimal = dec!(0.4);

/// Why a transaction did or did not qualify as an early buy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuyVerdict {
    QualifyingBuy,
    /// Fee payer received tokens but moved less SOL than the threshold
    BuyBelowThreshold,
    Sell,
    /// No token transfer touches the fee payer
    NoPayerTokenMovement,
    /// Provider returned no balance entry for the fee payer
    MissingFeePayerData,
}

impl BuyVerdict {
    pub fn is_qualifying(&self) -> bool {
        matches!(self, BuyVerdict::QualifyingBuy)
    }
}

/// Absolute lamport amount expressed in SOL, without float rounding
pub fn abs_lamports_to_sol(lamports: i64) -> Decimal {
    Decimal::from_i128_with_scale(lamports.unsigned_abs() as i128, LAMPORTS_DECIMALS)
}

/// Early-buy predicate over Helius enhanced transactions
#[derive(Debug, Clone)]
pub struct BuyClassifier {
    min_buy_sol: Decimal,
}

impl Default for BuyClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_BUY_SOL)
    }
}

impl BuyClassifier {
    pub fn new(min_buy_sol: Decimal) -> Self {
        Self { min_buy_sol }
    }

    pub fn min_buy_sol(&self) -> Decimal {
        self.min_buy_sol
    }

    /// Classify a single transaction.
    ///
    /// The buy check runs before the sell check, so a transaction that both
    /// sends and receives tokens for the fee payer is judged as a buy.
    pub fn classify(&self, tx: &EnrichedTransaction) -> BuyVerdict {
        let Some(payer_delta) = tx.fee_payer_delta() else {
            return BuyVerdict::MissingFeePayerData;
        };

        let sol_moved = abs_lamports_to_sol(payer_delta.native_balance_change);

        let fee_payer = tx.fee_payer.as_str();
        let is_buy = tx.token_transfers.iter().any(|t| t.is_to(fee_payer));
        let is_sell = tx.token_transfers.iter().any(|t| t.is_from(fee_payer));

        if is_buy && sol_moved >= self.min_buy_sol {
            return BuyVerdict::QualifyingBuy;
        }

        if is_sell {
            return BuyVerdict::Sell;
        }

        if is_buy {
            BuyVerdict::BuyBelowThreshold
        } else {
            BuyVerdict::NoPayerTokenMovement
        }
    }

    pub fn is_qualifying(&self, tx: &EnrichedTransaction) -> bool {
        self.classify(tx).is_qualifying()
    }

    /// Keep only the qualifying transactions, preserving input order
    pub fn filter(&self, transactions: Vec<EnrichedTransaction>) -> FilterOutcome {
        let mut outcome = FilterOutcome::default();

        for tx in transactions {
            let verdict = self.classify(&tx);
            outcome.breakdown.record(verdict);

            if verdict.is_qualifying() {
                outcome.qualifying.push(QualifyingTransaction::new(tx));
            } else {
                debug!(
                    "Rejected transaction {} (fee payer {}): {:?}",
                    tx.signature, tx.fee_payer, verdict
                );
            }
        }

        outcome
    }
}

#[derive(Debug, Default)]
pub struct FilterOutcome {
    pub qualifying: Vec<QualifyingTransaction>,
    pub breakdown: VerdictBreakdown,
}

/// Per-verdict counters for one filter pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerdictBreakdown {
    pub qualifying: usize,
    pub below_threshold: usize,
    pub sells: usize,
    pub no_token_movement: usize,
    pub missing_fee_payer: usize,
}

impl VerdictBreakdown {
    pub fn record(&mut self, verdict: BuyVerdict) {
        match verdict {
            BuyVerdict::QualifyingBuy => self.qualifying += 1,
            BuyVerdict::BuyBelowThreshold => self.below_threshold += 1,
            BuyVerdict::Sell => self.sells += 1,
            BuyVerdict::NoPayerTokenMovement => self.no_token_movement += 1,
            BuyVerdict::MissingFeePayerData => self.missing_fee_payer += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.qualifying
            + self.below_threshold
            + self.sells
            + self.no_token_movement
            + self.missing_fee_payer
    }
}
