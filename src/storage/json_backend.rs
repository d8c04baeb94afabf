use std::{
    cmp::Reverse,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use chrono::{DateTime, NaiveDateTime, Utc};

use super::{decode_snapshot, encode_snapshot, LoadReport, SnapshotStore};
use crate::{errors::Result, ledger::LedgerSnapshot};

const BACKUP_EXTENSION: &str = "json";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S_%6f";
const TMP_SUFFIX: &str = "tmp";
pub const DEFAULT_RETENTION: usize = 5;

/// Filesystem-backed JSON persistence for a single wallet snapshot.
///
/// Writes go to a `.tmp` sibling first and are renamed into place, so a failed
/// write never truncates the previous snapshot. When a backup directory is
/// configured the previous file is copied there before each overwrite and
/// only the newest `retention` copies are kept.
#[derive(Debug, Clone)]
pub struct JsonSnapshotStore {
    path: PathBuf,
    backups_dir: Option<PathBuf>,
    retention: usize,
}

/// A rotated copy of an earlier snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupInfo {
    pub name: String,
    pub path: PathBuf,
    pub created_at: DateTime<Utc>,
    /// Disambiguates backups written within the same microsecond.
    pub sequence: u32,
}

impl JsonSnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            backups_dir: None,
            retention: DEFAULT_RETENTION,
        }
    }

    /// Keeps up to `retention` copies of overwritten snapshots in `backups_dir`.
    /// A retention of zero disables backups.
    pub fn with_backups(mut self, backups_dir: impl Into<PathBuf>, retention: usize) -> Self {
        if retention == 0 {
            self.backups_dir = None;
        } else {
            self.backups_dir = Some(backups_dir.into());
        }
        self.retention = retention;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Backups newest first. Empty when backups are disabled.
    pub fn list_backups(&self) -> Result<Vec<BackupInfo>> {
        let Some(dir) = self.backups_dir.as_ref() else {
            return Ok(Vec::new());
        };
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let stem = self.stem();
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
                continue;
            };
            if let Some((created_at, sequence)) = parse_backup_name(&stem, name) {
                entries.push(BackupInfo {
                    name: name.to_string(),
                    created_at,
                    sequence,
                    path: path.clone(),
                });
            }
        }
        entries.sort_by_key(|info| Reverse((info.created_at, info.sequence)));
        Ok(entries)
    }

    fn backup_existing_file(&self) -> Result<()> {
        let Some(dir) = self.backups_dir.as_ref() else {
            return Ok(());
        };
        if !self.path.exists() {
            return Ok(());
        }
        fs::create_dir_all(dir)?;
        let timestamp = Utc::now().format(BACKUP_TIMESTAMP_FORMAT).to_string();
        let stem = self.stem();
        let mut sequence = 0u32;
        let mut target = dir.join(backup_name(&stem, &timestamp, sequence));
        while target.exists() {
            sequence += 1;
            target = dir.join(backup_name(&stem, &timestamp, sequence));
        }
        fs::copy(&self.path, target)?;
        self.prune_backups()
    }

    fn prune_backups(&self) -> Result<()> {
        for stale in self.list_backups()?.into_iter().skip(self.retention) {
            if let Err(err) = fs::remove_file(&stale.path) {
                tracing::warn!(path = %stale.path.display(), %err, "failed to prune backup");
            }
        }
        Ok(())
    }

    fn stem(&self) -> String {
        self.path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("wallet")
            .to_string()
    }
}

impl SnapshotStore for JsonSnapshotStore {
    fn load(&self) -> Result<Option<LoadReport>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let data = fs::read_to_string(&self.path)?;
        decode_snapshot(&data).map(Some)
    }

    fn save(&self, snapshot: &LedgerSnapshot) -> Result<()> {
        let json = encode_snapshot(snapshot)?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        if let Err(err) = self.backup_existing_file() {
            tracing::warn!(%err, "could not back up previous snapshot");
        }
        let tmp = tmp_path(&self.path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

fn backup_name(stem: &str, timestamp: &str, sequence: u32) -> String {
    if sequence == 0 {
        format!("{stem}_{timestamp}.{BACKUP_EXTENSION}")
    } else {
        format!("{stem}_{timestamp}-{sequence}.{BACKUP_EXTENSION}")
    }
}

/// Parses `<stem>_<timestamp>[-<sequence>].json`; names for other stems or in
/// any other shape are not backups of this store.
fn parse_backup_name(stem: &str, name: &str) -> Option<(DateTime<Utc>, u32)> {
    let rest = name
        .strip_prefix(stem)?
        .strip_prefix('_')?
        .strip_suffix(&format!(".{BACKUP_EXTENSION}"))?;
    let (timestamp, sequence) = match rest.split_once('-') {
        Some((timestamp, sequence)) => (timestamp, sequence.parse().ok()?),
        None => (rest, 0),
    };
    let naive = NaiveDateTime::parse_from_str(timestamp, BACKUP_TIMESTAMP_FORMAT).ok()?;
    Some((DateTime::from_naive_utc_and_offset(naive, Utc), sequence))
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}
