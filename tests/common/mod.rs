#![allow(dead_code)]

use std::{
    path::{Path, PathBuf},
    sync::Mutex,
};

use once_cell::sync::Lazy;
use tempfile::TempDir;
use wallet_core::{
    config::Config,
    storage::JsonSnapshotStore,
    Amount, Category, LedgerManager, OpenReport, Transaction,
};

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// A fresh directory that outlives the calling test.
pub fn temp_base() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

pub fn json_store(base: &Path, retention: usize) -> JsonSnapshotStore {
    JsonSnapshotStore::new(base.join("wallet.json")).with_backups(base.join("backups"), retention)
}

/// Opens a manager over `<base>/wallet.json` with the default configuration.
pub fn open_manager(base: &Path) -> (LedgerManager, OpenReport) {
    LedgerManager::from_config(&Config::default(), base)
}

pub fn expense(title: &str, amount: i64, date: &str, category: Category) -> Transaction {
    Transaction::new(title, Amount::from_units(amount), date, category)
}
