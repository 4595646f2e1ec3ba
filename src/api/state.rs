//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;

use crate::vote::{MoodBoard, VoteService};
use crate::wallet::WalletSigner;

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Vote submission and tally
    pub service: Arc<VoteService>,
    /// Live chart state, also refreshed by the poller
    pub board: Arc<RwLock<MoodBoard>>,
    /// Signer for `POST /votes`; read-only server when absent
    pub signer: Option<Arc<dyn WalletSigner>>,
    /// API configuration
    pub config: Arc<ApiConfig>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    /// Create a read-only AppState
    pub fn new(service: Arc<VoteService>, board: Arc<RwLock<MoodBoard>>, config: ApiConfig) -> Self {
        Self {
            service,
            board,
            signer: None,
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }

    /// Allow the server to cast votes with `signer`
    pub fn with_signer(mut self, signer: Arc<dyn WalletSigner>) -> Self {
        self.signer = Some(signer);
        self
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    pub fn can_sign(&self) -> bool {
        self.signer.is_some()
    }
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8090,
        }
    }
}

impl ApiConfig {
    /// Create config with custom host and port
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl From<&crate::config::ApiConfig> for ApiConfig {
    fn from(config: &crate::config::ApiConfig) -> Self {
        Self::new(config.host.clone(), config.port)
    }
}
