//! Ledger domain models and the balance rules that govern them.

pub mod amount;
pub mod category;
#[allow(clippy::module_inception)]
pub mod ledger;
pub mod transaction;

pub use amount::Amount;
pub use category::Category;
pub use ledger::{Ledger, LedgerSnapshot, DEFAULT_BALANCE};
pub use transaction::{parse_timestamp, Transaction, TransactionRef};
