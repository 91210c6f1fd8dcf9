use serde::{Deserialize, Serialize};
use std::fmt;

/// One entry of a `getSignaturesForAddress` page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Signature {
    pub signature: String,
    pub slot: u64,
    #[serde(rename = "blockTime", default)]
    pub block_time: Option<i64>,
    #[serde(default)]
    pub err: Option<serde_json::Value>,
}

impl Signature {
    pub fn new(signature: impl Into<String>, slot: u64) -> Self {
        Self {
            signature: signature.into(),
            slot,
            block_time: None,
            err: None,
        }
    }
}

/// Wallet address, compared by exact string equality
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WalletAddress(String);

impl WalletAddress {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for WalletAddress {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for WalletAddress {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl AsRef<str> for WalletAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Native balance movement of one account touched by a transaction
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AccountBalanceDelta {
    pub account: String,
    /// Lamports; negative when the account paid out
    #[serde(rename = "nativeBalanceChange", default)]
    pub native_balance_change: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TokenTransfer {
    #[serde(rename = "fromUserAccount", default)]
    pub from_user_account: Option<String>,
    #[serde(rename = "toUserAccount", default)]
    pub to_user_account: Option<String>,
    #[serde(default)]
    pub mint: Option<String>,
    #[serde(rename = "tokenAmount", default)]
    pub token_amount: Option<f64>,
}

impl TokenTransfer {
    pub fn is_to(&self, account: &str) -> bool {
        self.to_user_account.as_deref() == Some(account)
    }

    pub fn is_from(&self, account: &str) -> bool {
        self.from_user_account.as_deref() == Some(account)
    }
}

// Helius enhanced transaction, reduced to the fields the buy filter reads
// plus a few identifying ones that are handy in logs.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EnrichedTransaction {
    #[serde(default)]
    pub signature: String,
    #[serde(default)]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub slot: u64,
    #[serde(rename = "type", default)]
    pub transaction_type: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(rename = "feePayer", default)]
    pub fee_payer: String,
    #[serde(rename = "accountData", default)]
    pub account_data: Vec<AccountBalanceDelta>,
    #[serde(rename = "tokenTransfers", default)]
    pub token_transfers: Vec<TokenTransfer>,
}

impl EnrichedTransaction {
    /// Balance entry for the fee payer, if the provider reported one
    pub fn fee_payer_delta(&self) -> Option<&AccountBalanceDelta> {
        self.account_data
            .iter()
            .find(|account| account.account == self.fee_payer)
    }
}

/// An enriched transaction that passed the early-buy filter
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct QualifyingTransaction(EnrichedTransaction);

impl QualifyingTransaction {
    pub(crate) fn new(transaction: EnrichedTransaction) -> Self {
        Self(transaction)
    }

    pub fn transaction(&self) -> &EnrichedTransaction {
        &self.0
    }

    pub fn fee_payer(&self) -> &str {
        &self.0.fee_payer
    }

    pub fn slot(&self) -> u64 {
        self.0.slot
    }
}
