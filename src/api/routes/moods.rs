//! Mood Routes
//!
//! - GET /api/v1/moods - Current chart data and summary
//! - POST /api/v1/moods/refresh - Re-scan the ledger now
//! - GET /api/v1/moods/catalog - Selectable moods

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::dto::{CatalogResponse, RefreshResponse};
use crate::api::state::AppState;
use crate::vote::{refresh_board, BoardSnapshot, MOODS};

/// GET /api/v1/moods
pub async fn get_moods(State(state): State<Arc<AppState>>) -> Json<BoardSnapshot> {
    Json(state.board.read().await.snapshot())
}

/// POST /api/v1/moods/refresh
///
/// Fetch errors end up in `board.last_error`; the request itself succeeds.
pub async fn refresh_moods(State(state): State<Arc<AppState>>) -> Json<RefreshResponse> {
    let applied = refresh_board(state.service.as_ref(), &state.board).await;
    let board = state.board.read().await.snapshot();

    Json(RefreshResponse { applied, board })
}

/// GET /api/v1/moods/catalog
pub async fn get_catalog(State(state): State<Arc<AppState>>) -> Json<CatalogResponse> {
    Json(CatalogResponse {
        moods: MOODS,
        memo_prefix: state.service.codec().prefix().to_string(),
    })
}
