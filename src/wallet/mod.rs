//! Wallet Capability
//!
//! The signing identity is owned by an external wallet; MoodPulse only sees
//! the capability surface described by [`WalletSigner`]. A local ed25519
//! keypair implementation backs the CLI and the API server.

mod keypair;
mod session;

pub use keypair::KeypairSigner;
pub use session::WalletSession;

use async_trait::async_trait;
use thiserror::Error;

use crate::ledger::NetworkDetails;

/// Capability object of a signing wallet
#[async_trait]
pub trait WalletSigner: Send + Sync {
    /// Whether the wallet is installed and reachable
    async fn is_connected(&self) -> Result<bool, WalletError>;

    /// Whether this application may use the wallet
    async fn is_allowed(&self) -> Result<bool, WalletError>;

    /// Ask the user to grant access; returns the resulting permission
    async fn request_access(&self) -> Result<bool, WalletError>;

    /// Public address (`G...`) of the signing identity
    async fn address(&self) -> Result<String, WalletError>;

    /// Sign a base64 transaction envelope for the given network
    async fn sign_transaction(
        &self,
        envelope_xdr: &str,
        network_passphrase: &str,
    ) -> Result<String, WalletError>;

    /// Network the wallet is configured for
    async fn network_details(&self) -> Result<NetworkDetails, WalletError>;
}

/// Connectivity, permission and signing failures of a wallet
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    #[error("Wallet is not connected")]
    NotConnected,

    #[error("Wallet access was not granted")]
    PermissionDenied,

    #[error("Wallet refused to sign: {0}")]
    SigningRejected(String),

    #[error("Wallet unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid key: {0}")]
    InvalidKey(String),
}

/// Resolve the signing address, checking connection and permission first
pub async fn require_address(signer: &dyn WalletSigner) -> Result<String, WalletError> {
    if !signer.is_connected().await? {
        return Err(WalletError::NotConnected);
    }
    if !signer.is_allowed().await? {
        return Err(WalletError::PermissionDenied);
    }

    let address = signer.address().await?;
    if address.is_empty() {
        return Err(WalletError::NotConnected);
    }
    Ok(address)
}
