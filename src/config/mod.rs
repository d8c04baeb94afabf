//! User preferences: starting balance, display format and storage location.

use std::{
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    currency::CurrencyFormat,
    ledger::{Amount, DEFAULT_BALANCE},
    storage::json_backend::DEFAULT_RETENTION,
    utils::app_data_dir,
};

const CONFIG_FILE: &str = "config.json";
const LEDGER_FILE: &str = "wallet.json";
const BACKUP_DIR: &str = "backups";
const TMP_SUFFIX: &str = "tmp";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serde(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// Balance a brand-new wallet starts with.
    #[serde(default = "Config::default_initial_balance")]
    pub initial_balance: Amount,
    #[serde(default)]
    pub currency: CurrencyFormat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Optional custom snapshot file. Defaults to `<data dir>/wallet.json`.
    pub ledger_file: Option<PathBuf>,
    #[serde(default = "Config::default_backup_retention")]
    pub backup_retention: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            initial_balance: Self::default_initial_balance(),
            currency: CurrencyFormat::default(),
            ledger_file: None,
            backup_retention: Self::default_backup_retention(),
        }
    }
}

impl Config {
    pub fn default_initial_balance() -> Amount {
        Amount::from_units(DEFAULT_BALANCE)
    }

    pub fn default_backup_retention() -> usize {
        DEFAULT_RETENTION
    }

    pub fn resolve_ledger_file(&self, base: &Path) -> PathBuf {
        self.ledger_file
            .clone()
            .unwrap_or_else(|| base.join(LEDGER_FILE))
    }

    pub fn resolve_backup_dir(&self, base: &Path) -> PathBuf {
        base.join(BACKUP_DIR)
    }
}

/// Handles persistence of [`Config`] inside a base directory.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    base_dir: PathBuf,
    config_path: PathBuf,
}

impl ConfigManager {
    /// Uses the application data directory (`WALLET_CORE_HOME` or `~/.wallet_core`).
    pub fn new() -> Self {
        Self::with_base_dir(app_data_dir())
    }

    pub fn with_base_dir(base: impl Into<PathBuf>) -> Self {
        let base_dir = base.into();
        let config_path = base_dir.join(CONFIG_FILE);
        Self {
            base_dir,
            config_path,
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn load(&self) -> Result<Config, ConfigError> {
        if self.config_path.exists() {
            let data = fs::read_to_string(&self.config_path)?;
            serde_json::from_str(&data).map_err(|err| ConfigError::Serde(err.to_string()))
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        fs::create_dir_all(&self.base_dir)?;
        let json = serde_json::to_string_pretty(config)
            .map_err(|err| ConfigError::Serde(err.to_string()))?;
        let tmp = self.config_path.with_extension(format!("json.{TMP_SUFFIX}"));
        let mut file = File::create(&tmp)?;
        file.write_all(json.as_bytes())?;
        file.flush()?;
        fs::rename(&tmp, &self.config_path)?;
        Ok(())
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
