use std::path::Path;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::errors::{LedgerError, Result};
use crate::ledger::{Amount, Ledger, LedgerSnapshot, Transaction, TransactionRef};
use crate::storage::{JsonSnapshotStore, SnapshotStore};

/// Result of a successful mutation: the operation's value plus the snapshot
/// that was published and handed to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied<T> {
    pub value: T,
    pub snapshot: LedgerSnapshot,
    /// `false` when the store rejected the write. The in-memory ledger stays
    /// authoritative either way.
    pub persisted: bool,
}

/// What happened while restoring state at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpenReport {
    /// `true` when a stored snapshot was used, `false` when defaults were.
    pub restored: bool,
    pub migrations: Vec<String>,
    /// Recoverable problems; each one meant defaults were used instead.
    pub warnings: Vec<LedgerError>,
}

/// Owns the session's single [`Ledger`] and its persistence collaborator.
///
/// Every mutating call applies the ledger operation and then saves the new
/// snapshot explicitly. Taking `&mut self` serializes operations, so each one
/// sees the snapshot published by the previous one.
pub struct LedgerManager {
    ledger: Ledger,
    store: Box<dyn SnapshotStore>,
    last_persistence_warning: Option<LedgerError>,
}

impl LedgerManager {
    /// Restores the ledger from `store`, falling back to an empty ledger
    /// holding `initial_balance` when nothing usable is stored.
    pub fn open(store: Box<dyn SnapshotStore>, initial_balance: Amount) -> (Self, OpenReport) {
        let mut report = OpenReport::default();
        let location = store.describe();

        let restored = match store.load() {
            Ok(Some(loaded)) => match Ledger::from_snapshot(loaded.snapshot) {
                Ok(ledger) => {
                    for note in &loaded.migrations {
                        info!(store = %location, "{note}");
                    }
                    report.migrations = loaded.migrations;
                    Some(ledger)
                }
                Err(err) => {
                    warn!(store = %location, %err, "stored wallet is invalid; using defaults");
                    report.warnings.push(err);
                    None
                }
            },
            Ok(None) => {
                debug!(store = %location, "no stored wallet; using defaults");
                None
            }
            Err(err) => {
                warn!(store = %location, %err, "could not read stored wallet; using defaults");
                report.warnings.push(err);
                None
            }
        };

        report.restored = restored.is_some();
        let ledger = restored.unwrap_or_else(|| {
            Ledger::with_balance(initial_balance).unwrap_or_else(|err| {
                warn!(%err, "configured starting balance rejected; using default");
                report.warnings.push(err);
                Ledger::default()
            })
        });

        let mut manager = Self {
            ledger,
            store,
            last_persistence_warning: None,
        };
        if !report.migrations.is_empty() {
            manager.persist();
        }
        (manager, report)
    }

    /// Opens the JSON snapshot configured for `base_dir`, with rotating backups.
    pub fn from_config(config: &Config, base_dir: &Path) -> (Self, OpenReport) {
        let store = JsonSnapshotStore::new(config.resolve_ledger_file(base_dir))
            .with_backups(config.resolve_backup_dir(base_dir), config.backup_retention);
        Self::open(Box::new(store), config.initial_balance)
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn balance(&self) -> Amount {
        self.ledger.balance()
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        self.ledger.snapshot()
    }

    /// Most recent save failure, cleared by the next successful save.
    pub fn last_persistence_warning(&self) -> Option<&LedgerError> {
        self.last_persistence_warning.as_ref()
    }

    pub fn add_transaction(&mut self, candidate: Transaction) -> Result<Applied<Uuid>> {
        let title = candidate.title.clone();
        let id = self
            .ledger
            .add_transaction(candidate)
            .inspect_err(|err| reject("add_transaction", err))?;
        debug!(%id, %title, balance = %self.ledger.balance(), "transaction added");
        Ok(self.publish(id))
    }

    pub fn delete_transaction(
        &mut self,
        target: impl Into<TransactionRef>,
    ) -> Result<Applied<Transaction>> {
        let removed = self
            .ledger
            .delete_transaction(target)
            .inspect_err(|err| reject("delete_transaction", err))?;
        debug!(id = %removed.id, balance = %self.ledger.balance(), "transaction deleted");
        Ok(self.publish(removed))
    }

    pub fn edit_transaction(
        &mut self,
        target: impl Into<TransactionRef>,
        updated: Transaction,
    ) -> Result<Applied<Transaction>> {
        let edited = self
            .ledger
            .edit_transaction(target, updated)
            .inspect_err(|err| reject("edit_transaction", err))?
            .clone();
        debug!(id = %edited.id, balance = %self.ledger.balance(), "transaction edited");
        Ok(self.publish(edited))
    }

    /// Adds income; returns the new balance.
    pub fn add_balance(&mut self, amount: Amount) -> Result<Applied<Amount>> {
        let balance = self
            .ledger
            .add_balance(amount)
            .inspect_err(|err| reject("add_balance", err))?;
        debug!(%amount, %balance, "balance added");
        Ok(self.publish(balance))
    }

    /// Adds income typed by the user, e.g. `"1,500"`.
    pub fn add_balance_input(&mut self, raw: &str) -> Result<Applied<Amount>> {
        let amount = raw
            .parse::<Amount>()
            .inspect_err(|err| reject("add_balance", err))?;
        self.add_balance(amount)
    }

    /// Adds income given as a float; NaN and infinities are `InvalidAmount`.
    pub fn add_balance_f64(&mut self, amount: f64) -> Result<Applied<Amount>> {
        let amount = Amount::from_f64(amount).inspect_err(|err| reject("add_balance", err))?;
        self.add_balance(amount)
    }

    fn publish<T>(&mut self, value: T) -> Applied<T> {
        let persisted = self.persist();
        Applied {
            value,
            snapshot: self.ledger.snapshot(),
            persisted,
        }
    }

    fn persist(&mut self) -> bool {
        match self.store.save(&self.ledger.snapshot()) {
            Ok(()) => {
                self.last_persistence_warning = None;
                true
            }
            Err(err) => {
                warn!(store = %self.store.describe(), %err, "failed to save wallet snapshot");
                self.last_persistence_warning = Some(err);
                false
            }
        }
    }
}

fn reject(operation: &str, err: &LedgerError) {
    debug!(operation, kind = err.kind(), %err, "operation rejected");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::Category;
    use crate::storage::MemoryStore;
    use std::sync::Arc;

    /// Lets a test keep a handle on the store after handing it to the manager.
    struct Shared(Arc<MemoryStore>);

    impl SnapshotStore for Shared {
        fn load(&self) -> Result<Option<crate::storage::LoadReport>> {
            self.0.load()
        }

        fn save(&self, snapshot: &LedgerSnapshot) -> Result<()> {
            self.0.save(snapshot)
        }

        fn describe(&self) -> String {
            self.0.describe()
        }
    }

    fn open_shared(store: &Arc<MemoryStore>) -> (LedgerManager, OpenReport) {
        LedgerManager::open(Box::new(Shared(Arc::clone(store))), Amount::from_units(5000))
    }

    fn lunch(amount: i64) -> Transaction {
        Transaction::new("Lunch", Amount::from_units(amount), "2024-01-01", Category::Food)
    }

    #[test]
    fn empty_store_opens_with_defaults() {
        let store = Arc::new(MemoryStore::new());
        let (manager, report) = open_shared(&store);
        assert!(!report.restored);
        assert!(report.warnings.is_empty());
        assert_eq!(manager.balance(), Amount::from_units(5000));
    }

    #[test]
    fn every_mutation_is_saved() {
        let store = Arc::new(MemoryStore::new());
        let (mut manager, _) = open_shared(&store);
        let applied = manager.add_transaction(lunch(200)).unwrap();
        assert!(applied.persisted);
        assert_eq!(applied.snapshot.balance, Amount::from_units(4800));
        manager.add_balance(Amount::from_units(100)).unwrap();
        manager.delete_transaction(applied.value).unwrap();
        assert_eq!(store.write_count(), 3);

        let (reopened, report) = open_shared(&store);
        assert!(report.restored);
        assert_eq!(reopened.balance(), Amount::from_units(5100));
        assert_eq!(reopened.ledger().transaction_count(), 0);
    }

    #[test]
    fn rejected_operations_do_not_write() {
        let store = Arc::new(MemoryStore::new());
        let (mut manager, _) = open_shared(&store);
        assert!(manager.add_transaction(lunch(6000)).is_err());
        assert!(manager.add_balance_input("zero").is_err());
        assert!(manager.add_balance_f64(f64::NAN).is_err());
        assert!(manager.delete_transaction(0).is_err());
        assert_eq!(store.write_count(), 0);
    }

    #[test]
    fn failed_save_is_a_warning_not_an_error() {
        let store = Arc::new(MemoryStore::new());
        let (mut manager, _) = open_shared(&store);
        store.set_fail_writes(true);

        let applied = manager.add_transaction(lunch(250)).unwrap();
        assert!(!applied.persisted);
        assert_eq!(manager.balance(), Amount::from_units(4750));
        assert!(matches!(
            manager.last_persistence_warning(),
            Some(LedgerError::PersistenceUnavailable(_))
        ));

        store.set_fail_writes(false);
        manager.add_balance_input("50").unwrap();
        assert!(manager.last_persistence_warning().is_none());
        assert_eq!(manager.balance(), Amount::from_units(4800));
    }

    #[test]
    fn malformed_store_falls_back_with_warning() {
        let store = Arc::new(MemoryStore::with_contents("{not json"));
        let (manager, report) = open_shared(&store);
        assert!(!report.restored);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(manager.balance(), Amount::from_units(5000));
    }

    #[test]
    fn legacy_layout_is_migrated_and_rewritten() {
        let store = Arc::new(MemoryStore::with_contents(
            r#"{"balance": "4900", "expense": {"Food": [{"title": "Tea", "amount": 100, "date": "2024-01-01"}]}}"#,
        ));
        let (manager, report) = open_shared(&store);
        assert!(report.restored);
        assert_eq!(report.migrations.len(), 1);
        assert_eq!(manager.ledger().category_total(Category::Food), Amount::from_units(100));
        assert_eq!(store.write_count(), 1);
        assert!(store.contents().unwrap().contains("\"transactions\""));
    }

    #[test]
    fn negative_starting_balance_falls_back_to_default() {
        let (manager, report) =
            LedgerManager::open(Box::new(MemoryStore::new()), Amount::from_units(-1));
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(manager.balance(), Amount::from_units(5000));
    }
}
