#![doc(test(attr(deny(warnings))))]

//! Wallet Core keeps a wallet balance and the categorized expenses drawn from
//! it, persists them between sessions, and derives the totals a wallet screen
//! displays.

pub mod config;
pub mod core;
pub mod currency;
pub mod errors;
pub mod ledger;
pub mod storage;
pub mod utils;

use std::sync::Once;

pub use crate::core::{Applied, LedgerManager, OpenReport};
pub use errors::LedgerError;
pub use ledger::{Amount, Category, Ledger, LedgerSnapshot, Transaction, TransactionRef};

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        let build = utils::build_info::current();
        tracing::info!(
            version = build.version,
            git = build.git_hash,
            profile = build.profile,
            target = build.target,
            built_at = build.timestamp,
            "Wallet Core tracing initialized."
        );
    });
}
