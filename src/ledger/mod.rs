//! Stellar Ledger Access
//!
//! Everything MoodPulse needs from the network side:
//!
//! - **strkey / amount / xdr**: encodings of addresses, amounts and envelopes
//! - **transaction**: the single-payment transaction a vote is made of
//! - **horizon**: REST client for Horizon and Friendbot
//! - **error**: rejection codes and localized hints
//!
//! The [`LedgerApi`] trait is the seam between vote logic and Horizon, so
//! aggregation and submission can run against an in-memory ledger in tests.

mod amount;
mod error;
mod horizon;
mod strkey;
mod transaction;
pub mod xdr;

pub use amount::{Amount, AmountError, STROOPS_PER_LUMEN};
pub use error::{HintLocale, LedgerError, LedgerResult, RejectionKind};
pub use horizon::{HorizonClient, HorizonConfig};
pub use strkey::{decode_secret_seed, encode_secret_seed, AccountId, StrKeyError};
pub use transaction::{
    network_id, signature_base_hash, PaymentTransaction, MEMO_TEXT_MAX_BYTES,
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Read and submit operations against a Stellar ledger
#[async_trait]
pub trait LedgerApi: Send + Sync {
    /// Load an account (sequence number and balances)
    async fn load_account(&self, address: &str) -> LedgerResult<AccountInfo>;

    /// Most recent payment-type operations involving `address`, newest first
    async fn payments_for_account(
        &self,
        address: &str,
        limit: usize,
    ) -> LedgerResult<Vec<PaymentRecord>>;

    /// Fetch a transaction by hash
    async fn transaction(&self, hash: &str) -> LedgerResult<TransactionRecord>;

    /// Submit a signed, base64 encoded transaction envelope
    async fn submit_transaction(&self, envelope_xdr: &str) -> LedgerResult<SubmitResponse>;

    /// Check that the ledger answers at all
    async fn health_check(&self) -> LedgerResult<()> {
        Ok(())
    }

    /// Balance of `asset_code` held by `address`, `"0"` when unknown
    async fn account_balance(&self, address: &str, asset_code: &str) -> String {
        match self.load_account(address).await {
            Ok(account) => account
                .balance_of(asset_code)
                .map(|b| b.balance.clone())
                .unwrap_or_else(|| "0".to_string()),
            Err(e) => {
                tracing::warn!(address = %address, error = %e, "Failed to load account balance");
                "0".to_string()
            }
        }
    }
}

/// Account state as returned by `GET /accounts/{id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountInfo {
    #[serde(alias = "account_id")]
    pub id: String,
    /// Horizon reports the sequence number as a string
    pub sequence: String,
    #[serde(default)]
    pub balances: Vec<Balance>,
}

impl AccountInfo {
    pub fn sequence_number(&self) -> LedgerResult<i64> {
        self.sequence
            .parse()
            .map_err(|_| LedgerError::Malformed(format!("sequence {:?}", self.sequence)))
    }

    /// Find a balance by asset code; `XLM` matches the native asset
    pub fn balance_of(&self, asset_code: &str) -> Option<&Balance> {
        self.balances.iter().find(|b| {
            (b.asset_type == "native" && asset_code == "XLM")
                || b.asset_code.as_deref() == Some(asset_code)
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Balance {
    pub balance: String,
    pub asset_type: String,
    #[serde(default)]
    pub asset_code: Option<String>,
}

/// One record of `GET /accounts/{id}/payments`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub transaction_hash: String,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub amount: Option<String>,
    #[serde(default)]
    pub asset_type: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl PaymentRecord {
    /// A plain payment whose destination is `address`
    pub fn is_payment_to(&self, address: &str) -> bool {
        self.kind == "payment" && self.to.as_deref() == Some(address)
    }
}

/// Subset of `GET /transactions/{hash}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub hash: String,
    #[serde(default)]
    pub memo_type: String,
    #[serde(default)]
    pub memo: Option<String>,
    #[serde(default = "default_successful")]
    pub successful: bool,
    #[serde(default)]
    pub source_account: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

fn default_successful() -> bool {
    true
}

impl TransactionRecord {
    /// The memo if it is a text memo
    pub fn text_memo(&self) -> Option<&str> {
        if self.memo_type == "text" {
            self.memo.as_deref()
        } else {
            None
        }
    }
}

/// Successful `POST /transactions` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub hash: String,
    #[serde(default)]
    pub ledger: Option<u32>,
    #[serde(default = "default_successful")]
    pub successful: bool,
}

/// Network details as reported by a wallet or configured locally
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkDetails {
    pub network: String,
    pub network_url: String,
    pub network_passphrase: String,
    #[serde(default)]
    pub soroban_rpc_url: Option<String>,
}
