//! Ledger error types
//!
//! Horizon rejections carry result codes; `hint` turns the well-known ones
//! into a message a voter can act on.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::strkey::StrKeyError;

/// Errors talking to Horizon or Friendbot
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Ledger unavailable")]
    Unavailable,

    #[error("Request timeout")]
    Timeout,

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Account not found: {0}")]
    AccountNotFound(String),

    #[error("Transaction not found: {0}")]
    TransactionNotFound(String),

    #[error("Transaction rejected: {transaction_code} {operation_codes:?}")]
    Rejected {
        transaction_code: String,
        operation_codes: Vec<String>,
    },

    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Friendbot refused funding: {0}")]
    Friendbot(String),

    #[error("Invalid address: {0}")]
    Address(#[from] StrKeyError),

    #[error("Malformed response: {0}")]
    Malformed(String),
}

/// Languages rejection hints are available in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HintLocale {
    #[default]
    En,
    Tr,
}

impl std::str::FromStr for HintLocale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "en" => Ok(HintLocale::En),
            "tr" => Ok(HintLocale::Tr),
            other => Err(format!("unsupported locale {other}")),
        }
    }
}

/// Known reasons a vote submission gets rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionKind {
    InsufficientBalance,
    BadSequence,
    BadAuth,
    TooLate,
    InsufficientFee,
    NoDestination,
}

impl RejectionKind {
    /// Classify by result code, operation codes first
    pub fn classify(transaction_code: &str, operation_codes: &[String]) -> Option<Self> {
        operation_codes
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(transaction_code))
            .find_map(Self::from_code)
    }

    fn from_code(code: &str) -> Option<Self> {
        if code.contains("underfunded") || code.contains("insufficient_balance") {
            Some(RejectionKind::InsufficientBalance)
        } else if code.contains("bad_seq") {
            Some(RejectionKind::BadSequence)
        } else if code.contains("bad_auth") {
            Some(RejectionKind::BadAuth)
        } else if code.contains("too_late") {
            Some(RejectionKind::TooLate)
        } else if code.contains("insufficient_fee") {
            Some(RejectionKind::InsufficientFee)
        } else if code.contains("no_destination") {
            Some(RejectionKind::NoDestination)
        } else {
            None
        }
    }

    pub fn message(&self, locale: HintLocale) -> &'static str {
        match (self, locale) {
            (RejectionKind::InsufficientBalance, HintLocale::En) => {
                "Insufficient balance: fund your testnet account and try again."
            }
            (RejectionKind::InsufficientBalance, HintLocale::Tr) => {
                "Yetersiz bakiye: test ağı hesabınıza XLM yükleyip tekrar deneyin."
            }
            (RejectionKind::BadSequence, HintLocale::En) => {
                "Sequence number out of date: reload your account and vote again."
            }
            (RejectionKind::BadSequence, HintLocale::Tr) => {
                "Sıra numarası güncel değil: hesabınızı yenileyip tekrar oy verin."
            }
            (RejectionKind::BadAuth, HintLocale::En) => {
                "Signature rejected: make sure the wallet signed for this network."
            }
            (RejectionKind::BadAuth, HintLocale::Tr) => {
                "İmza reddedildi: cüzdanın bu ağ için imzaladığından emin olun."
            }
            (RejectionKind::TooLate, HintLocale::En) => {
                "The transaction expired before it reached the network."
            }
            (RejectionKind::TooLate, HintLocale::Tr) => {
                "İşlem ağa ulaşmadan zaman aşımına uğradı."
            }
            (RejectionKind::InsufficientFee, HintLocale::En) => {
                "The network asked for a higher fee than offered."
            }
            (RejectionKind::InsufficientFee, HintLocale::Tr) => {
                "Ağ, sunulandan daha yüksek bir işlem ücreti istedi."
            }
            (RejectionKind::NoDestination, HintLocale::En) => {
                "The collection account does not exist on this network."
            }
            (RejectionKind::NoDestination, HintLocale::Tr) => {
                "Toplama hesabı bu ağda mevcut değil."
            }
        }
    }
}

impl LedgerError {
    /// Localized, human-readable explanation; unknown errors verbatim
    pub fn hint(&self, locale: HintLocale) -> String {
        match self {
            LedgerError::Rejected {
                transaction_code,
                operation_codes,
            } => RejectionKind::classify(transaction_code, operation_codes)
                .map(|kind| kind.message(locale).to_string())
                .unwrap_or_else(|| self.to_string()),
            _ => self.to_string(),
        }
    }

    pub fn rejection_kind(&self) -> Option<RejectionKind> {
        match self {
            LedgerError::Rejected {
                transaction_code,
                operation_codes,
            } => RejectionKind::classify(transaction_code, operation_codes),
            _ => None,
        }
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn rejected(tx: &str, ops: &[&str]) -> LedgerError {
        LedgerError::Rejected {
            transaction_code: tx.to_string(),
            operation_codes: ops.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_underfunded_hint() {
        let err = rejected("tx_failed", &["op_underfunded"]);

        assert_eq!(err.rejection_kind(), Some(RejectionKind::InsufficientBalance));
        assert_eq!(
            err.hint(HintLocale::En),
            "Insufficient balance: fund your testnet account and try again."
        );
        assert!(err.hint(HintLocale::Tr).starts_with("Yetersiz bakiye"));
    }

    #[test]
    fn test_transaction_level_codes() {
        assert_eq!(
            rejected("tx_bad_seq", &[]).rejection_kind(),
            Some(RejectionKind::BadSequence)
        );
        assert_eq!(
            rejected("tx_insufficient_balance", &[]).rejection_kind(),
            Some(RejectionKind::InsufficientBalance)
        );
        assert_eq!(
            rejected("tx_bad_auth", &[]).rejection_kind(),
            Some(RejectionKind::BadAuth)
        );
    }

    #[test]
    fn test_unknown_code_is_verbatim() {
        let err = rejected("tx_internal_error", &[]);
        assert_eq!(err.rejection_kind(), None);
        assert_eq!(err.hint(HintLocale::En), err.to_string());
        assert!(err.hint(HintLocale::En).contains("tx_internal_error"));
    }

    #[test]
    fn test_non_rejection_is_verbatim() {
        let err = LedgerError::Timeout;
        assert_eq!(err.hint(HintLocale::Tr), "Request timeout");
    }

    #[test]
    fn test_locale_parse() {
        assert_eq!("TR".parse::<HintLocale>(), Ok(HintLocale::Tr));
        assert!("de".parse::<HintLocale>().is_err());
    }
}
