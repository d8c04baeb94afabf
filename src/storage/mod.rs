//! Persistence collaborators for ledger snapshots.

pub mod json_backend;
pub mod legacy;
pub mod memory;

use crate::{errors::Result, ledger::LedgerSnapshot};

/// Outcome of reading a stored snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub snapshot: LedgerSnapshot,
    /// Notes about layout conversions applied while reading.
    pub migrations: Vec<String>,
}

impl LoadReport {
    pub fn current(snapshot: LedgerSnapshot) -> Self {
        Self {
            snapshot,
            migrations: Vec::new(),
        }
    }
}

/// Abstraction over places a ledger snapshot can be kept between sessions.
///
/// `load` returns `Ok(None)` when nothing has been stored yet. Saves are
/// best-effort: callers treat a failed save as a warning, not a ledger error.
pub trait SnapshotStore: Send + Sync {
    fn load(&self) -> Result<Option<LoadReport>>;
    fn save(&self, snapshot: &LedgerSnapshot) -> Result<()>;

    /// Human-readable location used in log messages.
    fn describe(&self) -> String;
}

/// Parses stored text in either the current or the legacy layout.
pub fn decode_snapshot(text: &str) -> Result<LoadReport> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    if legacy::is_legacy_layout(&value) {
        return legacy::convert(value);
    }
    let snapshot: LedgerSnapshot = serde_json::from_value(value)?;
    Ok(LoadReport::current(snapshot))
}

pub fn encode_snapshot(snapshot: &LedgerSnapshot) -> Result<String> {
    Ok(serde_json::to_string_pretty(snapshot)?)
}

pub use json_backend::{BackupInfo, JsonSnapshotStore, DEFAULT_RETENTION};
pub use memory::MemoryStore;
