//! Minimal XDR writer
//!
//! Only the pieces needed for a single-payment transaction envelope.
//! All integers are big-endian; variable-length data is padded to 4 bytes.

/// Discriminant of `ENVELOPE_TYPE_TX`
pub const ENVELOPE_TYPE_TX: u32 = 2;

#[derive(Debug, Default)]
pub struct XdrWriter {
    buf: Vec<u8>,
}

impl XdrWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn u32(&mut self, value: u32) -> &mut Self {
        self.buf.extend_from_slice(&value.to_be_bytes());
        self
    }

    pub fn i64(&mut self, value: i64) -> &mut Self {
        self.buf.extend_from_slice(&value.to_be_bytes());
        self
    }

    pub fn u64(&mut self, value: u64) -> &mut Self {
        self.buf.extend_from_slice(&value.to_be_bytes());
        self
    }

    /// Fixed-length opaque; callers only pass multiples of four
    pub fn fixed(&mut self, bytes: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(bytes);
        self.pad(bytes.len())
    }

    /// Variable-length opaque or string: length prefix, data, padding
    pub fn var(&mut self, bytes: &[u8]) -> &mut Self {
        self.u32(bytes.len() as u32);
        self.buf.extend_from_slice(bytes);
        self.pad(bytes.len())
    }

    pub fn raw(&mut self, bytes: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    fn pad(&mut self, len: usize) -> &mut Self {
        let padding = (4 - len % 4) % 4;
        self.buf.extend(std::iter::repeat(0u8).take(padding));
        self
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// Split an unsigned `TransactionV1Envelope` into its transaction body.
///
/// Returns `None` unless the envelope is of type `ENVELOPE_TYPE_TX` and
/// carries no signatures yet.
pub fn unsigned_transaction_body(envelope: &[u8]) -> Option<&[u8]> {
    if envelope.len() < 8 {
        return None;
    }
    let (head, rest) = envelope.split_at(4);
    if head != ENVELOPE_TYPE_TX.to_be_bytes() {
        return None;
    }
    let (body, signature_count) = rest.split_at(rest.len() - 4);
    if signature_count != 0u32.to_be_bytes() {
        return None;
    }
    Some(body)
}
