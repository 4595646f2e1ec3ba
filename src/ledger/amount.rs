//! Lumen amounts
//!
//! Horizon reports amounts as decimal strings with seven fractional digits;
//! on the wire they are `i64` stroops.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const STROOPS_PER_LUMEN: i64 = 10_000_000;
const DECIMALS: usize = 7;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid amount {0:?}")]
pub struct AmountError(pub String);

/// An amount in stroops (1e-7 XLM)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Amount(i64);

impl Amount {
    pub const fn from_stroops(stroops: i64) -> Self {
        Self(stroops)
    }

    pub fn stroops(&self) -> i64 {
        self.0
    }

    /// Parse a decimal string such as `"12.5"` or `"0.0000001"`
    pub fn parse(value: &str) -> Result<Self, AmountError> {
        let invalid = || AmountError(value.to_string());
        let trimmed = value.trim();

        let (whole, fraction) = trimmed.split_once('.').unwrap_or((trimmed, ""));
        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid());
        }
        if fraction.len() > DECIMALS
            || !whole.chars().all(|c| c.is_ascii_digit())
            || !fraction.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid());
        }

        let whole: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };
        let fraction: i64 = format!("{:0<width$}", fraction, width = DECIMALS)
            .parse()
            .map_err(|_| invalid())?;

        whole
            .checked_mul(STROOPS_PER_LUMEN)
            .and_then(|w| w.checked_add(fraction))
            .map(Self)
            .ok_or_else(invalid)
    }
}

impl std::fmt::Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}.{:07}",
            self.0 / STROOPS_PER_LUMEN,
            self.0 % STROOPS_PER_LUMEN
        )
    }
}

impl TryFrom<String> for Amount {
    type Error = AmountError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Amount> for String {
    fn from(amount: Amount) -> Self {
        amount.to_string()
    }
}
