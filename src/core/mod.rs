//! Session orchestration and presentation-facing services.

pub mod ledger_manager;
pub mod services;

pub use ledger_manager::{Applied, LedgerManager, OpenReport};
