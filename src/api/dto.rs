//! Data Transfer Objects
//!
//! Request and response types for the API endpoints.

use serde::{Deserialize, Serialize};

use crate::vote::{BoardSnapshot, Mood};

// ============================================
// MOOD DTOs
// ============================================

/// Result of a manual refresh
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    /// False when a newer fetch superseded this one
    pub applied: bool,
    pub board: BoardSnapshot,
}

/// Selectable moods
#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    pub moods: &'static [Mood],
    pub memo_prefix: String,
}

// ============================================
// VOTE DTOs
// ============================================

/// Vote request
#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    /// Emoji glyph or mood name from the catalog
    pub emoji: String,
}

// ============================================
// HEALTH DTOs
// ============================================

/// Full health status
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// "healthy" or "degraded"
    pub status: String,
    /// "ok" or "error"
    pub ledger: String,
    /// Whether the server can sign votes
    pub signer: bool,
    pub network: String,
    pub uptime_seconds: u64,
    pub version: String,
}
