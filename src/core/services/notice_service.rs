//! User-facing messages for operation outcomes.

use std::{fmt, time::Duration};

use serde::Serialize;

use crate::core::ledger_manager::Applied;
use crate::errors::LedgerError;

/// The user actions that mutate the wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Operation {
    AddExpense,
    EditExpense,
    DeleteExpense,
    AddIncome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NoticeLevel {
    Success,
    Warning,
    Error,
}

impl NoticeLevel {
    /// How long a transient notification stays on screen.
    pub fn auto_hide(self) -> Duration {
        match self {
            NoticeLevel::Success => Duration::from_millis(2000),
            NoticeLevel::Warning | NoticeLevel::Error => Duration::from_millis(3000),
        }
    }
}

/// A short message the presentation layer shows after an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

pub struct NoticeService;

impl NoticeService {
    /// Maps any operation result to the notice the user should see.
    pub fn for_result<T>(operation: Operation, result: &Result<Applied<T>, LedgerError>) -> Notice {
        match result {
            Ok(applied) => Self::for_applied(operation, applied),
            Err(err) => Self::for_error(operation, err),
        }
    }

    pub fn for_applied<T>(operation: Operation, applied: &Applied<T>) -> Notice {
        if !applied.persisted {
            return Notice {
                level: NoticeLevel::Warning,
                message: "Saved for this session only; storage is unavailable.".into(),
            };
        }
        let message = match operation {
            Operation::AddExpense => "Expense added successfully!",
            Operation::EditExpense => "Expense updated successfully!",
            Operation::DeleteExpense => "Transaction deleted successfully!",
            Operation::AddIncome => "Balance added successfully!",
        };
        Notice {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn for_error(operation: Operation, err: &LedgerError) -> Notice {
        let message = match (operation, err) {
            (Operation::EditExpense, LedgerError::InsufficientBalance { .. }) => {
                "Not enough balance for this update!"
            }
            (_, LedgerError::InsufficientBalance { .. }) => {
                "Expense amount cannot be greater than balance!"
            }
            (_, LedgerError::InvalidAmount(_)) => "Please enter a valid amount!",
            (_, LedgerError::NotFound(_)) => "Transaction not found!",
            (_, LedgerError::InvalidCategory(_)) => "Please select a valid category!",
            (_, LedgerError::PersistenceUnavailable(_)) => "Storage is unavailable!",
        };
        Notice {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}
