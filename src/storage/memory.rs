use std::sync::{
    atomic::{AtomicBool, Ordering},
    Mutex, MutexGuard,
};

use super::{decode_snapshot, encode_snapshot, LoadReport, SnapshotStore};
use crate::{
    errors::{LedgerError, Result},
    ledger::LedgerSnapshot,
};

/// In-process store that keeps the serialized snapshot text.
///
/// Behaves like a browser's local storage slot: it holds exactly one document
/// and goes through the same encode/decode path as the file backend.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slot: Mutex<Option<String>>,
    fail_writes: AtomicBool,
    writes: Mutex<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store with raw text, as if a previous session had written it.
    pub fn with_contents(text: impl Into<String>) -> Self {
        let store = Self::default();
        *store.slot.lock().unwrap_or_else(|poison| poison.into_inner()) = Some(text.into());
        store
    }

    /// Makes subsequent saves fail until switched back.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Raw stored text, if any.
    pub fn contents(&self) -> Option<String> {
        self.lock_slot().ok().and_then(|slot| slot.clone())
    }

    /// Number of successful saves.
    pub fn write_count(&self) -> usize {
        self.writes.lock().map(|count| *count).unwrap_or(0)
    }

    fn lock_slot(&self) -> Result<MutexGuard<'_, Option<String>>> {
        self.slot
            .lock()
            .map_err(|_| LedgerError::PersistenceUnavailable("memory store lock poisoned".into()))
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self) -> Result<Option<LoadReport>> {
        match self.lock_slot()?.as_deref() {
            Some(text) => decode_snapshot(text).map(Some),
            None => Ok(None),
        }
    }

    fn save(&self, snapshot: &LedgerSnapshot) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(LedgerError::PersistenceUnavailable(
                "memory store is rejecting writes".into(),
            ));
        }
        let text = encode_snapshot(snapshot)?;
        *self.lock_slot()? = Some(text);
        if let Ok(mut count) = self.writes.lock() {
            *count += 1;
        }
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".into()
    }
}
