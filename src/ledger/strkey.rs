//! Stellar StrKey encoding
//!
//! Account ids (`G...`) and secret seeds (`S...`) are a version byte, a
//! 32-byte payload and a CRC16-XModem checksum, base32 encoded without padding.

use thiserror::Error;

const VERSION_ACCOUNT_ID: u8 = 6 << 3;
const VERSION_SECRET_SEED: u8 = 18 << 3;

/// Raw length of a decoded ed25519 strkey: version + key + checksum
const DECODED_LEN: usize = 1 + 32 + 2;

/// Errors decoding a strkey
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StrKeyError {
    #[error("Invalid base32 in strkey: {0}")]
    Encoding(String),

    #[error("Invalid strkey length {0}")]
    Length(usize),

    #[error("Unexpected strkey version byte {0:#04x}")]
    Version(u8),

    #[error("Strkey checksum mismatch")]
    Checksum,
}

/// An ed25519 public key identifying a Stellar account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccountId([u8; 32]);

impl AccountId {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Parse a `G...` address
    pub fn parse(address: &str) -> Result<Self, StrKeyError> {
        decode(VERSION_ACCOUNT_ID, address).map(Self)
    }

    /// Last four key bytes, used as the signature hint
    pub fn hint(&self) -> [u8; 4] {
        let mut hint = [0u8; 4];
        hint.copy_from_slice(&self.0[28..32]);
        hint
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&encode(VERSION_ACCOUNT_ID, &self.0))
    }
}

impl std::str::FromStr for AccountId {
    type Err = StrKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Encode a 32-byte ed25519 seed as an `S...` secret
pub fn encode_secret_seed(seed: &[u8; 32]) -> String {
    encode(VERSION_SECRET_SEED, seed)
}

/// Decode an `S...` secret into its 32-byte ed25519 seed
pub fn decode_secret_seed(secret: &str) -> Result<[u8; 32], StrKeyError> {
    decode(VERSION_SECRET_SEED, secret)
}

fn encode(version: u8, payload: &[u8; 32]) -> String {
    let mut raw = Vec::with_capacity(DECODED_LEN);
    raw.push(version);
    raw.extend_from_slice(payload);
    let checksum = crc16_xmodem(&raw);
    raw.extend_from_slice(&checksum.to_le_bytes());
    data_encoding::BASE32_NOPAD.encode(&raw)
}

fn decode(version: u8, key: &str) -> Result<[u8; 32], StrKeyError> {
    let raw = data_encoding::BASE32_NOPAD
        .decode(key.trim().as_bytes())
        .map_err(|e| StrKeyError::Encoding(e.to_string()))?;

    if raw.len() != DECODED_LEN {
        return Err(StrKeyError::Length(raw.len()));
    }
    if raw[0] != version {
        return Err(StrKeyError::Version(raw[0]));
    }

    let (body, checksum) = raw.split_at(DECODED_LEN - 2);
    if crc16_xmodem(body).to_le_bytes() != checksum {
        return Err(StrKeyError::Checksum);
    }

    let mut payload = [0u8; 32];
    payload.copy_from_slice(&body[1..]);
    Ok(payload)
}

/// CRC16-XModem (poly 0x1021, init 0)
fn crc16_xmodem(data: &[u8]) -> u16 {
    let mut crc: u16 = 0;
    for &byte in data {
        crc ^= (byte as u16) << 8;
        for _ in 0..8 {
            crc = if crc & 0x8000 != 0 {
                (crc << 1) ^ 0x1021
            } else {
                crc << 1
            };
        }
    }
    crc
}
