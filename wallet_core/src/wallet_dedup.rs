use std::collections::HashSet;

use crate::types::{QualifyingTransaction, WalletAddress};

/// Stable sort by slot, oldest first
pub fn sort_by_slot(transactions: &mut [QualifyingTransaction]) {
    transactions.sort_by_key(|tx| tx.slot());
}

/// Distinct fee payers in first-seen order
pub fn unique_fee_payers(transactions: &[QualifyingTransaction]) -> Vec<WalletAddress> {
    let mut seen = HashSet::new();
    let mut wallets = Vec::new();

    for tx in transactions {
        if seen.insert(tx.fee_payer()) {
            wallets.push(WalletAddress::new(tx.fee_payer()));
        }
    }

    wallets
}
