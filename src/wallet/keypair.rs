//! Local ed25519 keypair signer

use async_trait::async_trait;
use ed25519_dalek::{Signer, SigningKey};
use rand::RngCore;

use super::{WalletError, WalletSigner};
use crate::ledger::xdr::{unsigned_transaction_body, XdrWriter, ENVELOPE_TYPE_TX};
use crate::ledger::{
    decode_secret_seed, encode_secret_seed, signature_base_hash, AccountId, NetworkDetails,
};

/// Signs with a secret seed held in memory; always connected and allowed
pub struct KeypairSigner {
    signing_key: SigningKey,
    account: AccountId,
    network: NetworkDetails,
}

impl KeypairSigner {
    /// Build from an `S...` secret seed
    pub fn from_secret(secret: &str, network: NetworkDetails) -> Result<Self, WalletError> {
        let seed =
            decode_secret_seed(secret).map_err(|e| WalletError::InvalidKey(e.to_string()))?;
        Ok(Self::from_seed(seed, network))
    }

    /// Generate a fresh random keypair
    pub fn generate(network: NetworkDetails) -> Self {
        let mut seed = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut seed);
        Self::from_seed(seed, network)
    }

    fn from_seed(seed: [u8; 32], network: NetworkDetails) -> Self {
        let signing_key = SigningKey::from_bytes(&seed);
        let account = AccountId::from_bytes(signing_key.verifying_key().to_bytes());
        Self {
            signing_key,
            account,
            network,
        }
    }

    pub fn account_id(&self) -> AccountId {
        self.account
    }

    /// The `S...` secret; handle with care
    pub fn secret_seed(&self) -> String {
        encode_secret_seed(&self.signing_key.to_bytes())
    }
}

impl std::fmt::Debug for KeypairSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeypairSigner")
            .field("account", &self.account.to_string())
            .field("network", &self.network.network)
            .finish()
    }
}

#[async_trait]
impl WalletSigner for KeypairSigner {
    async fn is_connected(&self) -> Result<bool, WalletError> {
        Ok(true)
    }

    async fn is_allowed(&self) -> Result<bool, WalletError> {
        Ok(true)
    }

    async fn request_access(&self) -> Result<bool, WalletError> {
        Ok(true)
    }

    async fn address(&self) -> Result<String, WalletError> {
        Ok(self.account.to_string())
    }

    async fn sign_transaction(
        &self,
        envelope_xdr: &str,
        network_passphrase: &str,
    ) -> Result<String, WalletError> {
        let envelope = data_encoding::BASE64
            .decode(envelope_xdr.as_bytes())
            .map_err(|e| WalletError::SigningRejected(format!("invalid envelope: {}", e)))?;

        let body = unsigned_transaction_body(&envelope).ok_or_else(|| {
            WalletError::SigningRejected("expected an unsigned transaction envelope".to_string())
        })?;

        let hash = signature_base_hash(network_passphrase, body);
        let signature = self.signing_key.sign(&hash);

        let mut w = XdrWriter::new();
        w.u32(ENVELOPE_TYPE_TX)
            .raw(body)
            .u32(1)
            .fixed(&self.account.hint())
            .var(&signature.to_bytes());

        tracing::debug!(account = %self.account, "Signed transaction envelope");
        Ok(data_encoding::BASE64.encode(&w.into_bytes()))
    }

    async fn network_details(&self) -> Result<NetworkDetails, WalletError> {
        Ok(self.network.clone())
    }
}
