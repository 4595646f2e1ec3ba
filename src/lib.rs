//! # MoodPulse
//!
//! Emoji mood votes recorded as memo-tagged, minimal-value payments on the
//! Stellar test network, and a live tally rebuilt from the ledger.
//!
//! ## Features
//!
//! - **Votes on the ledger**: one payment per vote, the mood travels in a 28-byte text memo
//! - **Live tally**: recent payments of the collection account folded into counts and percentages
//! - **Pluggable signing**: any [`wallet::WalletSigner`]; a local ed25519 keypair is built in
//! - **Latest fetch wins**: overlapping refreshes never overwrite newer data
//!
//! ## Modules
//!
//! - [`ledger`]: Horizon client, strkeys, XDR envelopes, rejection hints
//! - [`wallet`]: Signing capability and connection session
//! - [`vote`]: Memo codec, aggregation, vote service, board and poller
//! - [`api`]: REST API server with Axum
//! - [`config`]: TOML and environment configuration
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use moodpulse::ledger::{HorizonClient, HorizonConfig};
//! use moodpulse::vote::{VoteConfig, VoteService};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let ledger = Arc::new(HorizonClient::new(HorizonConfig::default())?);
//!     let service = VoteService::new(ledger, VoteConfig::default());
//!
//!     let moods = service.fetch_community_moods().await?;
//!     for tally in &moods.tallies {
//!         println!("{} {} {:.1}%", tally.emoji, tally.name, tally.percentage);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod ledger;
pub mod vote;
pub mod wallet;

// Re-export top-level types for convenience
pub use ledger::{
    AccountId, Amount, HintLocale, HorizonClient, HorizonConfig, LedgerApi, LedgerError,
    LedgerResult, NetworkDetails,
};

pub use wallet::{KeypairSigner, WalletError, WalletSession, WalletSigner};

pub use vote::{
    CommunityMoods, MemoCodec, MemoError, MoodBoard, MoodPoller, MoodTally, MoodVote,
    PollerHandle, TallySummary, VoteConfig, VoteError, VoteReceipt, VoteService,
};

pub use api::{build_router, serve, ApiConfig, ApiError, AppState};

pub use config::{
    generate_default_config, ApiConfig as ConfigApiConfig, Config, ConfigError, LoggingConfig,
    NetworkConfig, NetworkPreset,
};
