//! Single-payment transactions
//!
//! Builds the `TransactionV1Envelope` for one native payment with a text memo,
//! which is all a vote needs.

use sha2::{Digest, Sha256};

use super::amount::Amount;
use super::strkey::AccountId;
use super::xdr::{XdrWriter, ENVELOPE_TYPE_TX};

/// `MEMO_TEXT` holds at most 28 bytes
pub const MEMO_TEXT_MAX_BYTES: usize = 28;

const KEY_TYPE_ED25519: u32 = 0;
const PRECOND_TIME: u32 = 1;
const MEMO_TEXT: u32 = 1;
const OPERATION_PAYMENT: u32 = 1;
const ASSET_TYPE_NATIVE: u32 = 0;

/// Network id: SHA-256 of the network passphrase
pub fn network_id(passphrase: &str) -> [u8; 32] {
    Sha256::digest(passphrase.as_bytes()).into()
}

/// A payment transaction ready to be encoded and signed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentTransaction {
    pub source: AccountId,
    pub fee: u32,
    pub sequence: i64,
    pub min_time: u64,
    pub max_time: u64,
    pub memo: String,
    pub destination: AccountId,
    pub amount: Amount,
}

impl PaymentTransaction {
    /// XDR of the `Transaction` body
    pub fn to_xdr(&self) -> Vec<u8> {
        let mut w = XdrWriter::new();

        // sourceAccount: MuxedAccount
        w.u32(KEY_TYPE_ED25519).fixed(self.source.as_bytes());
        w.u32(self.fee);
        w.i64(self.sequence);

        // cond: Preconditions::Time
        w.u32(PRECOND_TIME).u64(self.min_time).u64(self.max_time);

        // memo
        w.u32(MEMO_TEXT).var(self.memo.as_bytes());

        // operations<100>: one payment without its own source account
        w.u32(1);
        w.u32(0);
        w.u32(OPERATION_PAYMENT);
        w.u32(KEY_TYPE_ED25519).fixed(self.destination.as_bytes());
        w.u32(ASSET_TYPE_NATIVE);
        w.i64(self.amount.stroops());

        // ext
        w.u32(0);

        w.into_bytes()
    }

    /// Hash that signers sign: sha256(network_id || ENVELOPE_TYPE_TX || tx)
    pub fn hash(&self, passphrase: &str) -> [u8; 32] {
        signature_base_hash(passphrase, &self.to_xdr())
    }

    /// Unsigned envelope, base64 encoded the way wallets expect it
    pub fn to_envelope_base64(&self) -> String {
        let mut w = XdrWriter::new();
        w.u32(ENVELOPE_TYPE_TX).raw(&self.to_xdr()).u32(0);
        data_encoding::BASE64.encode(&w.into_bytes())
    }
}

/// Signature base hash for an already encoded transaction body
pub fn signature_base_hash(passphrase: &str, transaction_xdr: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(network_id(passphrase));
    hasher.update(ENVELOPE_TYPE_TX.to_be_bytes());
    hasher.update(transaction_xdr);
    hasher.finalize().into()
}
