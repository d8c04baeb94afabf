use thiserror::Error;

use crate::ledger::Amount;

/// Error type that captures every recoverable ledger and persistence failure.
///
/// None of these are fatal: the ledger is left exactly as it was before the
/// failed call, and the caller decides how to present the failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance { requested: Amount, available: Amount },
    #[error("Transaction not found: {0}")]
    NotFound(String),
    #[error("Invalid category: {0}")]
    InvalidCategory(String),
    #[error("Persistence unavailable: {0}")]
    PersistenceUnavailable(String),
}

impl LedgerError {
    /// Short machine-friendly label for the error kind, used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            LedgerError::InvalidAmount(_) => "invalid_amount",
            LedgerError::InsufficientBalance { .. } => "insufficient_balance",
            LedgerError::NotFound(_) => "not_found",
            LedgerError::InvalidCategory(_) => "invalid_category",
            LedgerError::PersistenceUnavailable(_) => "persistence_unavailable",
        }
    }
}

impl From<std::io::Error> for LedgerError {
    fn from(err: std::io::Error) -> Self {
        LedgerError::PersistenceUnavailable(err.to_string())
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        LedgerError::PersistenceUnavailable(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
