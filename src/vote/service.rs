//! Vote Service
//!
//! Submits votes as memo-tagged payments and rebuilds the community tally
//! from the collection account's payment history.

use chrono::Utc;
use futures_util::stream::{self, StreamExt};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use super::aggregate::{MoodTally, MoodVote, TallyBuilder};
use super::memo::{MemoCodec, MemoError, MoodMemo, DEFAULT_MEMO_PREFIX};
use crate::ledger::{
    AccountId, Amount, HintLocale, LedgerApi, LedgerError, NetworkDetails, PaymentTransaction,
    StrKeyError,
};
use crate::wallet::{self, WalletError, WalletSigner};

/// Largest page Horizon serves for a history query
pub const MAX_HISTORY_LIMIT: usize = 200;

/// Builds, submits and reads back votes
pub struct VoteService {
    ledger: Arc<dyn LedgerApi>,
    codec: MemoCodec,
    config: VoteConfig,
}

/// Configuration for vote submission and aggregation
#[derive(Debug, Clone)]
pub struct VoteConfig {
    /// Prefix marking a memo as a vote
    pub memo_prefix: String,
    /// Account receiving vote payments
    pub collection_address: String,
    /// Fee per operation in stroops
    pub base_fee: u32,
    /// Upper bound on submission, also the transaction's validity window
    pub submit_timeout_secs: u64,
    /// Amount carried by each vote payment
    pub vote_amount: Amount,
    /// Payment records scanned per aggregation, within `1..=MAX_HISTORY_LIMIT`
    pub history_limit: usize,
    /// Concurrent transaction lookups during aggregation
    pub fetch_concurrency: usize,
    /// Network the transactions are signed for
    pub network: NetworkDetails,
    /// Block explorer base URL
    pub explorer_url: String,
    /// Language of rejection hints
    pub hint_locale: HintLocale,
}

impl Default for VoteConfig {
    fn default() -> Self {
        Self {
            memo_prefix: DEFAULT_MEMO_PREFIX.to_string(),
            collection_address: "GAAZI4TCR3TY5OJHCTJC2A4QSY6CJWJH5IAJTGKIN2ER7LBNVKOCCWN7"
                .to_string(),
            base_fee: 100,
            submit_timeout_secs: 30,
            vote_amount: Amount::from_stroops(1),
            history_limit: 100,
            fetch_concurrency: 8,
            network: NetworkDetails {
                network: "TESTNET".to_string(),
                network_url: "https://horizon-testnet.stellar.org".to_string(),
                network_passphrase: "Test SDF Network ; September 2015".to_string(),
                soroban_rpc_url: Some("https://soroban-testnet.stellar.org".to_string()),
            },
            explorer_url: "https://testnet.stellar.expert".to_string(),
            hint_locale: HintLocale::En,
        }
    }
}

/// Outcome of a submitted vote
#[derive(Debug, Clone, Serialize)]
pub struct VoteReceipt {
    pub hash: String,
    pub ledger: Option<u32>,
    pub memo: String,
    pub explorer_url: String,
}

/// Tallies plus what the scan saw
#[derive(Debug, Clone, Serialize)]
pub struct CommunityMoods {
    pub tallies: Vec<MoodTally>,
    /// Payment records returned by the history query
    pub scanned_payments: usize,
    /// Payments that carried a vote memo
    pub votes_counted: u64,
    /// The page came back full, so older votes were not counted
    pub page_full: bool,
}

/// Errors from vote submission or aggregation
#[derive(Error, Debug)]
pub enum VoteError {
    #[error("Memo error: {0}")]
    Memo(#[from] MemoError),

    #[error("Wallet error: {0}")]
    Wallet(#[from] WalletError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Invalid address: {0}")]
    Address(#[from] StrKeyError),

    #[error("Submission timed out after {0}s")]
    Timeout(u64),

    #[error("Unknown mood: {0}")]
    UnknownMood(String),
}

impl VoteError {
    /// Message suitable for a voter, localized where a hint exists
    pub fn hint(&self, locale: HintLocale) -> String {
        match self {
            VoteError::Ledger(e) => e.hint(locale),
            other => other.to_string(),
        }
    }
}

impl VoteService {
    pub fn new(ledger: Arc<dyn LedgerApi>, mut config: VoteConfig) -> Self {
        let limit = config.history_limit.clamp(1, MAX_HISTORY_LIMIT);
        if limit != config.history_limit {
            tracing::warn!(
                requested = config.history_limit,
                limit,
                "history_limit out of range, clamped"
            );
            config.history_limit = limit;
        }

        let codec = MemoCodec::new(config.memo_prefix.clone());
        Self {
            ledger,
            codec,
            config,
        }
    }

    pub fn config(&self) -> &VoteConfig {
        &self.config
    }

    pub fn codec(&self) -> &MemoCodec {
        &self.codec
    }

    pub fn ledger(&self) -> &Arc<dyn LedgerApi> {
        &self.ledger
    }

    /// Record a vote as a minimal payment to the collection account.
    ///
    /// The memo is encoded first so an over-long pair fails before any
    /// wallet or network call.
    pub async fn submit_vote(
        &self,
        signer: &dyn WalletSigner,
        emoji: &str,
        name: &str,
    ) -> Result<VoteReceipt, VoteError> {
        let memo = self.codec.encode(&MoodMemo::new(emoji, name))?;
        let destination = AccountId::parse(&self.config.collection_address)?;

        let address = wallet::require_address(signer).await?;
        let source = AccountId::parse(&address)?;

        let account = self.ledger.load_account(&address).await?;
        let sequence = account
            .sequence_number()?
            .checked_add(1)
            .ok_or_else(|| LedgerError::Malformed("sequence overflow".to_string()))?;

        let now = Utc::now().timestamp().max(0) as u64;
        let tx = PaymentTransaction {
            source,
            fee: self.config.base_fee,
            sequence,
            min_time: 0,
            max_time: now.saturating_add(self.config.submit_timeout_secs),
            memo: memo.clone(),
            destination,
            amount: self.config.vote_amount,
        };

        let passphrase = &self.config.network.network_passphrase;
        let local_hash = data_encoding::HEXLOWER.encode(&tx.hash(passphrase));
        tracing::debug!(hash = %local_hash, memo = %memo, "Built vote transaction");

        let signed = signer
            .sign_transaction(&tx.to_envelope_base64(), passphrase)
            .await?;

        let timeout = self.config.submit_timeout_secs;
        let response = tokio::time::timeout(
            Duration::from_secs(timeout),
            self.ledger.submit_transaction(&signed),
        )
        .await
        .map_err(|_| VoteError::Timeout(timeout))??;

        tracing::info!(hash = %response.hash, memo = %memo, "Vote submitted");

        Ok(VoteReceipt {
            explorer_url: format!(
                "{}/tx/{}",
                self.config.explorer_url.trim_end_matches('/'),
                response.hash
            ),
            hash: response.hash,
            ledger: response.ledger,
            memo,
        })
    }

    /// Rebuild the community tally from one page of recent payments.
    ///
    /// Records that are not votes, and records whose transaction cannot be
    /// fetched, are skipped. Only a failure of the page query itself is
    /// returned.
    pub async fn fetch_community_moods(&self) -> Result<CommunityMoods, VoteError> {
        let collection = self.config.collection_address.as_str();
        let limit = self.config.history_limit;

        let payments = self.ledger.payments_for_account(collection, limit).await?;
        let scanned_payments = payments.len();

        // One vote per transaction, newest first
        let mut hashes: Vec<String> = Vec::new();
        for payment in payments.iter().filter(|p| p.is_payment_to(collection)) {
            if !hashes.contains(&payment.transaction_hash) {
                hashes.push(payment.transaction_hash.clone());
            }
        }

        let ledger = &self.ledger;
        let codec = &self.codec;
        let votes: Vec<Option<MoodVote>> = stream::iter(hashes)
            .map(|hash| async move {
                match ledger.transaction(&hash).await {
                    Ok(tx) if tx.successful => tx
                        .text_memo()
                        .and_then(|memo| MoodVote::from_memo(codec, memo)),
                    Ok(_) => None,
                    Err(e) => {
                        tracing::debug!(hash = %hash, error = %e, "Skipping payment, transaction lookup failed");
                        None
                    }
                }
            })
            .buffered(self.config.fetch_concurrency.max(1))
            .collect()
            .await;

        let builder: TallyBuilder = votes.into_iter().flatten().collect();
        let votes_counted = builder.total();
        let page_full = scanned_payments >= limit;

        if page_full {
            tracing::info!(limit, "Payment history page is full, older votes are not counted");
        }
        tracing::debug!(scanned_payments, votes_counted, "Aggregated community moods");

        Ok(CommunityMoods {
            tallies: builder.finish(),
            scanned_payments,
            votes_counted,
            page_full,
        })
    }

    /// Native balance of an account, `"0"` when it cannot be loaded
    pub async fn balance(&self, address: &str) -> String {
        self.ledger.account_balance(address, "XLM").await
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::ledger::{AccountInfo, Balance, LedgerResult, PaymentRecord, SubmitResponse, TransactionRecord};
    use crate::wallet::KeypairSigner;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// In-memory ledger for service tests
    #[derive(Default)]
    pub(crate) struct FakeLedger {
        pub accounts: HashMap<String, AccountInfo>,
        pub payments: Vec<PaymentRecord>,
        pub transactions: HashMap<String, TransactionRecord>,
        pub reject_with: Option<(String, Vec<String>)>,
        pub submitted: Mutex<Vec<String>>,
        pub calls: AtomicUsize,
        pub submit_delay: Option<Duration>,
        pub requested_limit: Mutex<Option<usize>>,
    }

    impl FakeLedger {
        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub fn with_account(mut self, address: &str, sequence: i64) -> Self {
            self.accounts.insert(
                address.to_string(),
                AccountInfo {
                    id: address.to_string(),
                    sequence: sequence.to_string(),
                    balances: vec![Balance {
                        balance: "100.0000000".to_string(),
                        asset_type: "native".to_string(),
                        asset_code: None,
                    }],
                },
            );
            self
        }

        pub fn with_vote(mut self, to: &str, hash: &str, memo: &str) -> Self {
            self.payments.push(PaymentRecord {
                id: format!("op-{}", self.payments.len()),
                kind: "payment".to_string(),
                transaction_hash: hash.to_string(),
                from: Some("GVOTER".to_string()),
                to: Some(to.to_string()),
                amount: Some("0.0000001".to_string()),
                asset_type: Some("native".to_string()),
                created_at: None,
            });
            self.transactions.insert(
                hash.to_string(),
                TransactionRecord {
                    hash: hash.to_string(),
                    memo_type: "text".to_string(),
                    memo: Some(memo.to_string()),
                    successful: true,
                    source_account: Some("GVOTER".to_string()),
                    created_at: None,
                },
            );
            self
        }
    }

    #[async_trait]
    impl LedgerApi for FakeLedger {
        async fn load_account(&self, address: &str) -> LedgerResult<AccountInfo> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.accounts
                .get(address)
                .cloned()
                .ok_or_else(|| LedgerError::AccountNotFound(address.to_string()))
        }

        async fn payments_for_account(
            &self,
            _address: &str,
            limit: usize,
        ) -> LedgerResult<Vec<PaymentRecord>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.requested_limit.lock().unwrap() = Some(limit);
            Ok(self.payments.iter().take(limit).cloned().collect())
        }

        async fn transaction(&self, hash: &str) -> LedgerResult<TransactionRecord> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.transactions
                .get(hash)
                .cloned()
                .ok_or_else(|| LedgerError::TransactionNotFound(hash.to_string()))
        }

        async fn submit_transaction(&self, envelope_xdr: &str) -> LedgerResult<SubmitResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.submit_delay {
                tokio::time::sleep(delay).await;
            }
            if let Some((tx, ops)) = &self.reject_with {
                return Err(LedgerError::Rejected {
                    transaction_code: tx.clone(),
                    operation_codes: ops.clone(),
                });
            }
            self.submitted.lock().unwrap().push(envelope_xdr.to_string());
            Ok(SubmitResponse {
                hash: "feedbeef".to_string(),
                ledger: Some(1234),
                successful: true,
            })
        }
    }

    pub(crate) fn collection() -> String {
        AccountId::from_bytes([0xC0; 32]).to_string()
    }

    pub(crate) fn test_config() -> VoteConfig {
        VoteConfig {
            collection_address: collection(),
            ..VoteConfig::default()
        }
    }

    fn signer() -> KeypairSigner {
        KeypairSigner::from_secret(
            &crate::ledger::encode_secret_seed(&[11u8; 32]),
            VoteConfig::default().network,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_submit_vote() {
        let signer = signer();
        let address = signer.account_id().to_string();
        let ledger = Arc::new(FakeLedger::default().with_account(&address, 41));
        let service = VoteService::new(ledger.clone(), test_config());

        let receipt = service.submit_vote(&signer, "😀", "Happy").await.unwrap();

        assert_eq!(receipt.hash, "feedbeef");
        assert_eq!(receipt.memo, "MoodPulse: 😀 - Happy");
        assert_eq!(receipt.explorer_url, "https://testnet.stellar.expert/tx/feedbeef");

        let submitted = ledger.submitted.lock().unwrap();
        assert_eq!(submitted.len(), 1);
        let envelope = data_encoding::BASE64.decode(submitted[0].as_bytes()).unwrap();
        // seq num follows the source account and fee
        assert_eq!(&envelope[4 + 40..4 + 48], &42i64.to_be_bytes());
    }

    #[tokio::test]
    async fn test_overlong_memo_never_reaches_network() {
        let signer = signer();
        let ledger = Arc::new(FakeLedger::default());
        let service = VoteService::new(ledger.clone(), test_config());

        let err = service
            .submit_vote(&signer, "😀", "Extraordinarily happy")
            .await
            .unwrap_err();

        assert!(matches!(err, VoteError::Memo(MemoError::TooLong { .. })));
        assert_eq!(ledger.calls(), 0);
    }

    #[tokio::test]
    async fn test_underfunded_rejection_hint() {
        let signer = signer();
        let address = signer.account_id().to_string();
        let mut ledger = FakeLedger::default().with_account(&address, 1);
        ledger.reject_with = Some(("tx_failed".into(), vec!["op_underfunded".into()]));
        let service = VoteService::new(Arc::new(ledger), test_config());

        let err = service.submit_vote(&signer, "😢", "Sad").await.unwrap_err();

        assert_eq!(
            err.hint(HintLocale::En),
            "Insufficient balance: fund your testnet account and try again."
        );
    }

    struct DisconnectedWallet;

    #[async_trait]
    impl WalletSigner for DisconnectedWallet {
        async fn is_connected(&self) -> Result<bool, WalletError> {
            Ok(false)
        }
        async fn is_allowed(&self) -> Result<bool, WalletError> {
            Ok(false)
        }
        async fn request_access(&self) -> Result<bool, WalletError> {
            Ok(false)
        }
        async fn address(&self) -> Result<String, WalletError> {
            Err(WalletError::NotConnected)
        }
        async fn sign_transaction(&self, _: &str, _: &str) -> Result<String, WalletError> {
            Err(WalletError::NotConnected)
        }
        async fn network_details(&self) -> Result<NetworkDetails, WalletError> {
            Err(WalletError::NotConnected)
        }
    }

    #[tokio::test]
    async fn test_missing_identity_fails_before_ledger() {
        let ledger = Arc::new(FakeLedger::default());
        let service = VoteService::new(ledger.clone(), test_config());

        let err = service
            .submit_vote(&DisconnectedWallet, "😀", "Happy")
            .await
            .unwrap_err();

        assert!(matches!(err, VoteError::Wallet(WalletError::NotConnected)));
        assert_eq!(ledger.calls(), 0);
    }

    /// Has an identity but refuses every signature request
    struct RefusingWallet {
        address: String,
    }

    #[async_trait]
    impl WalletSigner for RefusingWallet {
        async fn is_connected(&self) -> Result<bool, WalletError> {
            Ok(true)
        }
        async fn is_allowed(&self) -> Result<bool, WalletError> {
            Ok(true)
        }
        async fn request_access(&self) -> Result<bool, WalletError> {
            Ok(true)
        }
        async fn address(&self) -> Result<String, WalletError> {
            Ok(self.address.clone())
        }
        async fn sign_transaction(&self, _: &str, _: &str) -> Result<String, WalletError> {
            Err(WalletError::SigningRejected("user declined".to_string()))
        }
        async fn network_details(&self) -> Result<NetworkDetails, WalletError> {
            Ok(VoteConfig::default().network)
        }
    }

    #[tokio::test]
    async fn test_refused_signature_is_not_submitted() {
        let address = signer().account_id().to_string();
        let ledger = Arc::new(FakeLedger::default().with_account(&address, 7));
        let service = VoteService::new(ledger.clone(), test_config());

        let err = service
            .submit_vote(&RefusingWallet { address }, "😎", "Cool")
            .await
            .unwrap_err();

        assert!(matches!(err, VoteError::Wallet(WalletError::SigningRejected(_))));
        assert!(ledger.submitted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_slow_submission_times_out() {
        let signer = signer();
        let address = signer.account_id().to_string();
        let mut ledger = FakeLedger::default().with_account(&address, 1);
        ledger.submit_delay = Some(Duration::from_secs(5));
        let config = VoteConfig {
            submit_timeout_secs: 1,
            ..test_config()
        };
        let service = VoteService::new(Arc::new(ledger), config);

        let err = service.submit_vote(&signer, "😀", "Happy").await.unwrap_err();
        assert!(matches!(err, VoteError::Timeout(1)));
    }

    #[tokio::test]
    async fn test_huge_timeout_saturates_validity_window() {
        let signer = signer();
        let address = signer.account_id().to_string();
        let ledger = Arc::new(FakeLedger::default().with_account(&address, 1));
        let config = VoteConfig {
            submit_timeout_secs: u64::MAX,
            ..test_config()
        };
        let service = VoteService::new(ledger.clone(), config);

        service.submit_vote(&signer, "😀", "Happy").await.unwrap();

        let submitted = ledger.submitted.lock().unwrap();
        let envelope = data_encoding::BASE64.decode(submitted[0].as_bytes()).unwrap();
        // max_time follows the precondition tag and min_time
        assert_eq!(&envelope[64..72], &u64::MAX.to_be_bytes());
    }

    #[tokio::test]
    async fn test_unknown_account_propagates() {
        let signer = signer();
        let service = VoteService::new(Arc::new(FakeLedger::default()), test_config());

        let err = service.submit_vote(&signer, "😢", "Sad").await.unwrap_err();
        assert!(matches!(err, VoteError::Ledger(LedgerError::AccountNotFound(_))));
    }

    #[tokio::test]
    async fn test_fetch_community_moods() {
        let to = collection();
        let ledger = FakeLedger::default()
            .with_vote(&to, "h1", "MoodPulse: 😀 - Happy")
            .with_vote(&to, "h2", "MoodPulse: 😀 - Happy")
            .with_vote(&to, "h3", "MoodPulse: 😢 - Sad")
            .with_vote(&to, "h4", "MoodPulse: 😀 - Happy")
            .with_vote(&to, "h5", "thanks for the coffee");
        let service = VoteService::new(Arc::new(ledger), test_config());

        let moods = service.fetch_community_moods().await.unwrap();

        assert_eq!(moods.scanned_payments, 5);
        assert_eq!(moods.votes_counted, 4);
        assert!(!moods.page_full);
        assert_eq!(moods.tallies.len(), 2);
        assert_eq!(moods.tallies[0].emoji, "😀");
        assert_eq!(moods.tallies[0].count, 3);
        assert_eq!(moods.tallies[0].percentage, 75.0);
        assert_eq!(moods.tallies[1].emoji, "😢");
        assert_eq!(moods.tallies[1].percentage, 25.0);
    }

    #[tokio::test]
    async fn test_outgoing_and_missing_transactions_skipped() {
        let to = collection();
        let mut ledger = FakeLedger::default()
            .with_vote(&to, "h1", "MoodPulse: 😎 - Cool")
            .with_vote("GSOMEONEELSE", "h2", "MoodPulse: 😀 - Happy")
            .with_vote(&to, "h3", "MoodPulse: 😀 - Happy");
        ledger.transactions.remove("h3");
        let service = VoteService::new(Arc::new(ledger), test_config());

        let moods = service.fetch_community_moods().await.unwrap();

        assert_eq!(moods.votes_counted, 1);
        assert_eq!(moods.tallies[0].emoji, "😎");
        assert_eq!(moods.tallies[0].percentage, 100.0);
    }

    #[tokio::test]
    async fn test_page_limit_truncates() {
        let to = collection();
        let mut ledger = FakeLedger::default();
        for i in 0..5 {
            ledger = ledger.with_vote(&to, &format!("h{i}"), "MoodPulse: 😴 - Tired");
        }
        let config = VoteConfig {
            history_limit: 3,
            ..test_config()
        };
        let service = VoteService::new(Arc::new(ledger), config);

        let moods = service.fetch_community_moods().await.unwrap();
        assert_eq!(moods.votes_counted, 3);
        assert!(moods.page_full);
    }

    #[tokio::test]
    async fn test_history_limit_clamped_to_page_size() {
        let ledger = Arc::new(FakeLedger::default());
        let config = VoteConfig {
            history_limit: 500,
            ..test_config()
        };
        let service = VoteService::new(ledger.clone(), config);
        assert_eq!(service.config().history_limit, MAX_HISTORY_LIMIT);

        service.fetch_community_moods().await.unwrap();
        assert_eq!(*ledger.requested_limit.lock().unwrap(), Some(MAX_HISTORY_LIMIT));
    }

    #[tokio::test]
    async fn test_zero_history_limit_becomes_one() {
        let to = collection();
        let ledger = FakeLedger::default()
            .with_vote(&to, "h1", "MoodPulse: 😀 - Happy")
            .with_vote(&to, "h2", "MoodPulse: 😢 - Sad");
        let config = VoteConfig {
            history_limit: 0,
            ..test_config()
        };
        let service = VoteService::new(Arc::new(ledger), config);

        let moods = service.fetch_community_moods().await.unwrap();
        assert_eq!(moods.votes_counted, 1);
        assert!(moods.page_full);
    }

    #[tokio::test]
    async fn test_empty_history() {
        let service = VoteService::new(Arc::new(FakeLedger::default()), test_config());
        let moods = service.fetch_community_moods().await.unwrap();

        assert!(moods.tallies.is_empty());
        assert_eq!(moods.votes_counted, 0);
    }

    #[tokio::test]
    async fn test_balance_defaults_to_zero() {
        let service = VoteService::new(Arc::new(FakeLedger::default()), test_config());
        assert_eq!(service.balance("GNOBODY").await, "0");
    }
}
