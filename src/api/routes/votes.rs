//! Vote Routes
//!
//! - POST /api/v1/votes - Cast a vote with the server's signer

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::api::dto::VoteRequest;
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::vote::{catalog, VoteError, VoteReceipt};

/// POST /api/v1/votes
///
/// Submits a memo-tagged payment and counts the vote on the local board.
/// Returns 503 when the server has no signer configured.
pub async fn cast_vote(
    State(state): State<Arc<AppState>>,
    Json(request): Json<VoteRequest>,
) -> ApiResult<(StatusCode, Json<VoteReceipt>)> {
    let locale = state.service.config().hint_locale;
    let mood = catalog::resolve(&request.emoji)
        .ok_or_else(|| ApiError::vote(VoteError::UnknownMood(request.emoji.clone()), locale))?;

    let signer = state
        .signer
        .as_ref()
        .ok_or_else(|| ApiError::ServiceUnavailable("no signer configured".to_string()))?;

    let receipt = state
        .service
        .submit_vote(signer.as_ref(), mood.emoji, mood.name)
        .await
        .map_err(|e| ApiError::vote(e, locale))?;

    {
        let mut board = state.board.write().await;
        board.select(mood.emoji);
        board.record_submission(&receipt);
    }

    Ok((StatusCode::CREATED, Json(receipt)))
}
