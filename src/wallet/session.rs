//! Wallet session state
//!
//! Owned replacement for a global "is the wallet connected" store.

use serde::Serialize;

use super::{WalletError, WalletSigner};

#[derive(Debug, Clone, Default, Serialize)]
pub struct WalletSession {
    connected: bool,
    address: Option<String>,
    last_error: Option<String>,
}

impl WalletSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    /// Message of the last failed `connect`, cleared on success
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Connect through the wallet: check reachability, ask for access when
    /// not yet granted, then read the address.
    ///
    /// Failures leave the session disconnected and are returned so the
    /// caller can show them and let the user retry.
    pub async fn connect(&mut self, signer: &dyn WalletSigner) -> Result<&str, WalletError> {
        match Self::handshake(signer).await {
            Ok(address) => {
                tracing::info!(address = %address, "Wallet connected");
                self.connected = true;
                self.last_error = None;
                Ok(self.address.insert(address).as_str())
            }
            Err(e) => {
                tracing::warn!(error = %e, "Wallet connection failed");
                self.connected = false;
                self.address = None;
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    async fn handshake(signer: &dyn WalletSigner) -> Result<String, WalletError> {
        if !signer.is_connected().await? {
            return Err(WalletError::NotConnected);
        }

        if !signer.is_allowed().await? {
            tracing::info!("Wallet access not granted yet, requesting");
            if !signer.request_access().await? {
                return Err(WalletError::PermissionDenied);
            }
        }

        let address = signer.address().await?;
        if address.is_empty() {
            return Err(WalletError::NotConnected);
        }
        Ok(address)
    }

    pub fn disconnect(&mut self) {
        self.connected = false;
        self.address = None;
        self.last_error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::NetworkDetails;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct FakeWallet {
        connected: bool,
        allowed: AtomicBool,
        grant_on_request: bool,
    }

    impl FakeWallet {
        fn new(connected: bool, allowed: bool, grant_on_request: bool) -> Self {
            Self {
                connected,
                allowed: AtomicBool::new(allowed),
                grant_on_request,
            }
        }
    }

    #[async_trait]
    impl WalletSigner for FakeWallet {
        async fn is_connected(&self) -> Result<bool, WalletError> {
            Ok(self.connected)
        }

        async fn is_allowed(&self) -> Result<bool, WalletError> {
            Ok(self.allowed.load(Ordering::SeqCst))
        }

        async fn request_access(&self) -> Result<bool, WalletError> {
            self.allowed.store(self.grant_on_request, Ordering::SeqCst);
            Ok(self.grant_on_request)
        }

        async fn address(&self) -> Result<String, WalletError> {
            Ok("GFAKEADDRESS".to_string())
        }

        async fn sign_transaction(&self, _: &str, _: &str) -> Result<String, WalletError> {
            Err(WalletError::SigningRejected("fake".into()))
        }

        async fn network_details(&self) -> Result<NetworkDetails, WalletError> {
            Err(WalletError::Unavailable("fake".into()))
        }
    }

    #[tokio::test]
    async fn test_connect_when_allowed() {
        let mut session = WalletSession::new();
        let wallet = FakeWallet::new(true, true, false);

        assert_eq!(session.connect(&wallet).await.unwrap(), "GFAKEADDRESS");
        assert!(session.is_connected());
        assert_eq!(session.address(), Some("GFAKEADDRESS"));
    }

    #[tokio::test]
    async fn test_connect_requests_access() {
        let mut session = WalletSession::new();
        let wallet = FakeWallet::new(true, false, true);

        session.connect(&wallet).await.unwrap();
        assert!(session.is_connected());
        assert!(wallet.allowed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_denied_access_keeps_session_disconnected() {
        let mut session = WalletSession::new();
        let wallet = FakeWallet::new(true, false, false);

        assert_eq!(
            session.connect(&wallet).await.unwrap_err(),
            WalletError::PermissionDenied
        );
        assert!(!session.is_connected());
        assert_eq!(session.last_error(), Some("Wallet access was not granted"));
    }

    #[tokio::test]
    async fn test_missing_wallet() {
        let mut session = WalletSession::new();
        let wallet = FakeWallet::new(false, true, true);

        assert_eq!(
            session.connect(&wallet).await.unwrap_err(),
            WalletError::NotConnected
        );
        assert!(session.address().is_none());
    }

    #[tokio::test]
    async fn test_disconnect() {
        let mut session = WalletSession::new();
        session
            .connect(&FakeWallet::new(true, true, false))
            .await
            .unwrap();

        session.disconnect();
        assert!(!session.is_connected());
        assert!(session.address().is_none());
    }
}
