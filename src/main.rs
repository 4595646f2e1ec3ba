//! MoodPulse API Server
//!
//! Serves the live mood board and, when a secret key is configured, casts
//! votes on behalf of its callers.
//!
//! # Configuration
//!
//! - `MOODPULSE_CONFIG`: Path to a config file (default: searched in the usual locations)
//! - `MOODPULSE_SECRET_KEY`: Secret seed used to sign votes (optional)
//! - `RUST_LOG`: Log filter (default: from `[logging]`)
//!
//! Every other `MOODPULSE_*` override is listed by `moodpulse-cli config`.

use moodpulse::api::{serve, ApiConfig, AppState};
use moodpulse::config::Config;
use moodpulse::ledger::{HorizonClient, LedgerApi};
use moodpulse::vote::{MoodBoard, MoodPoller, VoteService};
use moodpulse::wallet::KeypairSigner;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = match std::env::var("MOODPULSE_CONFIG") {
        Ok(path) => Config::load_with_env(Path::new(&path))?,
        Err(_) => Config::load_default(),
    };

    config.logging.init_tracing();

    tracing::info!("Starting MoodPulse server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        network = ?config.network.preset,
        horizon = %config.network.horizon_url(),
        collection = %config.vote.collection_address,
        "Ledger configuration"
    );

    let ledger = Arc::new(HorizonClient::new(config.network.horizon_config())?);
    match ledger.health_check().await {
        Ok(()) => tracing::info!("Horizon connection verified"),
        Err(e) => tracing::warn!("Horizon not available: {} (the board will retry)", e),
    }

    let service = Arc::new(VoteService::new(ledger, config.vote_config()));
    let board = Arc::new(RwLock::new(MoodBoard::with_placeholder_votes(
        &mut rand::thread_rng(),
    )));

    let api_config = ApiConfig::from(&config.api);
    let mut state = AppState::new(Arc::clone(&service), Arc::clone(&board), api_config.clone());

    match &config.wallet.secret_key {
        Some(secret) => {
            let signer = KeypairSigner::from_secret(secret, config.network.details())?;
            tracing::info!("Votes will be signed by {}", signer.account_id());
            state = state.with_signer(Arc::new(signer));
        }
        None => {
            tracing::info!("No secret key configured, POST /api/v1/votes is disabled");
        }
    }

    let poller = MoodPoller::spawn(
        service,
        board,
        Duration::from_secs(config.poll.interval_secs.max(1)),
    );

    serve(state, &api_config).await?;

    poller.stop().await;
    tracing::info!("MoodPulse server stopped");

    Ok(())
}
