//! Vote memo encoding
//!
//! A vote travels as the text memo `<prefix><emoji> - <mood name>`. The
//! ledger caps text memos at 28 bytes, so the check is on encoded UTF-8
//! length, not characters.

use thiserror::Error;

use crate::ledger::MEMO_TEXT_MAX_BYTES;

pub const DEFAULT_MEMO_PREFIX: &str = "MoodPulse: ";

const SEPARATOR: &str = " - ";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoError {
    #[error("Memo {memo:?} is {len} bytes, the ledger allows {max}")]
    TooLong { memo: String, len: usize, max: usize },

    #[error("Emoji must not be empty")]
    EmptyEmoji,

    #[error("Mood name must not be empty")]
    EmptyName,

    #[error("Emoji {0:?} may not contain whitespace")]
    InvalidEmoji(String),
}

/// An `(emoji, mood name)` pair as carried in a memo
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoodMemo {
    pub emoji: String,
    pub name: String,
}

impl MoodMemo {
    pub fn new(emoji: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            emoji: emoji.into(),
            name: name.into(),
        }
    }
}

/// Encodes and parses vote memos for one prefix
#[derive(Debug, Clone)]
pub struct MemoCodec {
    prefix: String,
    max_bytes: usize,
}

impl Default for MemoCodec {
    fn default() -> Self {
        Self::new(DEFAULT_MEMO_PREFIX)
    }
}

impl MemoCodec {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            max_bytes: MEMO_TEXT_MAX_BYTES,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Encode a pair; surrounding whitespace of both parts is dropped
    pub fn encode(&self, memo: &MoodMemo) -> Result<String, MemoError> {
        let emoji = memo.emoji.trim();
        let name = memo.name.trim();

        if emoji.is_empty() {
            return Err(MemoError::EmptyEmoji);
        }
        if name.is_empty() {
            return Err(MemoError::EmptyName);
        }
        // Whitespace in the glyph would make the separator ambiguous
        if emoji.contains(char::is_whitespace) {
            return Err(MemoError::InvalidEmoji(emoji.to_string()));
        }

        let encoded = format!("{}{}{}{}", self.prefix, emoji, SEPARATOR, name);
        if encoded.len() > self.max_bytes {
            return Err(MemoError::TooLong {
                len: encoded.len(),
                memo: encoded,
                max: self.max_bytes,
            });
        }

        Ok(encoded)
    }

    /// Parse a memo back into its pair; `None` for anything that is not a vote
    pub fn parse(&self, memo: &str) -> Option<MoodMemo> {
        let rest = memo.strip_prefix(self.prefix.as_str())?;
        let (emoji, name) = rest.split_once(SEPARATOR)?;
        let (emoji, name) = (emoji.trim(), name.trim());

        if emoji.is_empty() || name.is_empty() {
            return None;
        }
        Some(MoodMemo::new(emoji, name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode() {
        let codec = MemoCodec::default();
        assert_eq!(
            codec.encode(&MoodMemo::new("😀", "Happy")).unwrap(),
            "MoodPulse: 😀 - Happy"
        );
    }

    #[test]
    fn test_round_trip_catalog_pairs() {
        let codec = MemoCodec::default();
        for (emoji, name) in [("😀", "Happy"), ("😢", "Sad"), ("😡", "Angry"), ("😴", "Tired"), ("😎", "Cool")] {
            let memo = MoodMemo::new(emoji, name);
            let encoded = codec.encode(&memo).unwrap();
            assert!(encoded.len() <= MEMO_TEXT_MAX_BYTES);
            assert_eq!(codec.parse(&encoded), Some(memo));
        }
    }

    #[test]
    fn test_limit_counts_bytes() {
        let codec = MemoCodec::default();

        // 11 + 4 + 3 + 10 = 28 bytes: fits exactly
        assert!(codec.encode(&MoodMemo::new("😀", "Delightful")).is_ok());

        // One more byte is rejected
        let err = codec.encode(&MoodMemo::new("😀", "Delightful!")).unwrap_err();
        assert_eq!(
            err,
            MemoError::TooLong {
                memo: "MoodPulse: 😀 - Delightful!".to_string(),
                len: 29,
                max: 28
            }
        );
    }

    #[test]
    fn test_multi_codepoint_emoji_counts_bytes() {
        let codec = MemoCodec::default();
        // Face in clouds: 4 + 3 + 4 + 3 = 14 bytes on its own
        let err = codec
            .encode(&MoodMemo::new("😶\u{200d}🌫\u{fe0f}", "Foggy"))
            .unwrap_err();
        assert!(matches!(err, MemoError::TooLong { .. }));
    }

    #[test]
    fn test_empty_parts_rejected() {
        let codec = MemoCodec::default();
        assert_eq!(codec.encode(&MoodMemo::new(" ", "Happy")), Err(MemoError::EmptyEmoji));
        assert_eq!(codec.encode(&MoodMemo::new("😀", "")), Err(MemoError::EmptyName));
    }

    #[test]
    fn test_whitespace_in_emoji_rejected() {
        let codec = MemoCodec::default();
        assert_eq!(
            codec.encode(&MoodMemo::new("a -", "Odd")),
            Err(MemoError::InvalidEmoji("a -".to_string()))
        );
    }

    #[test]
    fn test_parse_rejects_non_votes() {
        let codec = MemoCodec::default();
        assert_eq!(codec.parse("Payment#0"), None);
        assert_eq!(codec.parse("MoodPulse: no separator"), None);
        assert_eq!(codec.parse("moodpulse: 😀 - Happy"), None);
        assert_eq!(codec.parse("MoodPulse:  - Happy"), None);
        assert_eq!(codec.parse(""), None);
    }

    #[test]
    fn test_custom_prefix() {
        let codec = MemoCodec::new("MP:");
        let encoded = codec.encode(&MoodMemo::new("😢", "Sad")).unwrap();
        assert_eq!(encoded, "MP:😢 - Sad");
        assert_eq!(codec.parse(&encoded), Some(MoodMemo::new("😢", "Sad")));
        assert_eq!(MemoCodec::default().parse(&encoded), None);
    }
}
