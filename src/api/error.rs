//! API Error Types
//!
//! Defines error types for the API layer and implements conversion
//! to HTTP responses with appropriate status codes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::ledger::{HintLocale, LedgerError};
use crate::vote::VoteError;
use crate::wallet::WalletError;

/// API error types
#[derive(Error, Debug)]
pub enum ApiError {
    /// Vote submission or tally failed; `message` is the voter-facing hint
    #[error("{message}")]
    Vote { source: VoteError, message: String },

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Service unavailable (dependency down)
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    /// Wrap a vote error with its localized hint
    pub fn vote(error: VoteError, locale: HintLocale) -> Self {
        let message = error.hint(locale);
        ApiError::Vote {
            source: error,
            message,
        }
    }
}

/// Error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
    pub request_id: String,
}

/// Error details
#[derive(Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

fn vote_status(error: &VoteError) -> (StatusCode, &'static str) {
    match error {
        VoteError::Memo(_) | VoteError::UnknownMood(_) | VoteError::Address(_) => {
            (StatusCode::BAD_REQUEST, "INVALID_VOTE")
        }
        VoteError::Wallet(WalletError::PermissionDenied)
        | VoteError::Wallet(WalletError::SigningRejected(_)) => {
            (StatusCode::FORBIDDEN, "SIGNING_REFUSED")
        }
        VoteError::Wallet(_) => (StatusCode::SERVICE_UNAVAILABLE, "WALLET_UNAVAILABLE"),
        VoteError::Timeout(_) | VoteError::Ledger(LedgerError::Timeout) => {
            (StatusCode::GATEWAY_TIMEOUT, "LEDGER_TIMEOUT")
        }
        VoteError::Ledger(LedgerError::Rejected { .. }) => {
            (StatusCode::UNPROCESSABLE_ENTITY, "TRANSACTION_REJECTED")
        }
        VoteError::Ledger(LedgerError::AccountNotFound(_)) => {
            (StatusCode::NOT_FOUND, "ACCOUNT_NOT_FOUND")
        }
        VoteError::Ledger(_) => (StatusCode::BAD_GATEWAY, "LEDGER_ERROR"),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::Vote { source, .. } => vote_status(source),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            ApiError::ServiceUnavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE")
            }
            ApiError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR"),
        };

        let request_id = uuid::Uuid::new_v4().to_string();

        tracing::error!(
            request_id = %request_id,
            error_code = %code,
            error_message = %self,
            "API error occurred"
        );

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message: self.to_string(),
            },
            request_id,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;
