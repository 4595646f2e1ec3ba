//! MoodPulse REST API
//!
//! HTTP API layer for MoodPulse, built with Axum.
//!
//! # Endpoints
//!
//! ## Moods
//! - `GET /api/v1/moods` - Chart data, summary and board status
//! - `POST /api/v1/moods/refresh` - Re-scan the collection account now
//! - `GET /api/v1/moods/catalog` - Selectable moods and the memo prefix
//!
//! ## Votes
//! - `POST /api/v1/votes` - Cast a vote (needs a configured signer)
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe
//! - `GET /health` - Full health status
//!
//! # Example
//!
//! ```rust,ignore
//! use moodpulse::api::{serve, ApiConfig, AppState};
//! use moodpulse::ledger::{HorizonClient, HorizonConfig};
//! use moodpulse::vote::{MoodBoard, VoteConfig, VoteService};
//! use std::sync::Arc;
//! use tokio::sync::RwLock;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let ledger = Arc::new(HorizonClient::new(HorizonConfig::default())?);
//!     let service = Arc::new(VoteService::new(ledger, VoteConfig::default()));
//!     let board = Arc::new(RwLock::new(MoodBoard::new()));
//!     let config = ApiConfig::default();
//!
//!     serve(AppState::new(service, board, config.clone()), &config).await?;
//!     Ok(())
//! }
//! ```

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::{ApiConfig, AppState};

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Mood routes
        .route("/moods", get(routes::moods::get_moods))
        .route("/moods/refresh", post(routes::moods::refresh_moods))
        .route("/moods/catalog", get(routes::moods::get_catalog))
        // Vote routes
        .route("/votes", post(routes::votes::cast_vote));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    let shared_state = Arc::new(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .nest("/health", health_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(shared_state)
}

/// Start the API server
pub async fn serve(state: AppState, config: &ApiConfig) -> Result<(), ApiError> {
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("MoodPulse API listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("MoodPulse API shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
