//! Flat-file persistence for the ledger.
//!
//! This module provides the `LedgerStore` struct for loading and saving the
//! trade history and the symbol legend as CSV files. Methods are organized
//! across submodules by table:
//! - `history.rs` - trade history rows
//! - `legend.rs` - symbol legend rows
//!
//! Every save copies the previous file into `backups/` first and then
//! replaces the file through a rename, so a prior version always survives.

mod history;
mod legend;

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::config::Config;
use crate::engine::{LedgerConfig, LedgerEngine};
use crate::error::LedgerError;

pub const HISTORY_FILE: &str = "history.csv";
pub const LEGEND_FILE: &str = "legend.csv";
pub const BACKUP_DIR: &str = "backups";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("csv error in {path}: {message}")]
    Csv { path: PathBuf, message: String },
    #[error("invalid row {row} in {path}: {source}")]
    Row {
        path: PathBuf,
        row: usize,
        #[source]
        source: LedgerError,
    },
    #[error("replaying stored history failed: {0}")]
    Replay(#[from] LedgerError),
}

impl StoreError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn csv(path: &Path, err: impl std::fmt::Display) -> Self {
        StoreError::Csv {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }
}

/// Files backing one ledger.
#[derive(Debug, Clone)]
pub struct LedgerStore {
    data_dir: PathBuf,
}

impl LedgerStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        LedgerStore {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn history_path(&self) -> PathBuf {
        self.data_dir.join(HISTORY_FILE)
    }

    pub fn legend_path(&self) -> PathBuf {
        self.data_dir.join(LEGEND_FILE)
    }

    pub fn backup_dir(&self) -> PathBuf {
        self.data_dir.join(BACKUP_DIR)
    }

    // =========================================================================
    // Whole-ledger operations
    // =========================================================================

    /// Open the ledger described by `config`, starting empty when no history
    /// has been saved yet.
    pub fn open(config: &Config) -> Result<LedgerEngine, StoreError> {
        LedgerStore::new(&config.data_dir).load_engine(config.ledger_config())
    }

    /// Rebuild an engine from the stored history and legend.
    pub fn load_engine(&self, config: LedgerConfig) -> Result<LedgerEngine, StoreError> {
        let path = self.history_path();
        let mut engine = match self.load_history()? {
            Some(orders) => {
                info!(orders = orders.len(), path = %path.display(), "Loaded trade history");
                LedgerEngine::from_orders(config, &orders)?
            }
            None => {
                info!(path = %path.display(), "No trade history found, starting empty");
                LedgerEngine::new(config)
            }
        };

        if let Some(legend) = self.load_legend()? {
            for (symbol, label) in legend {
                engine.add_legend(symbol.as_str(), label)?;
            }
        }
        Ok(engine)
    }

    /// Persist the history and legend of `engine`.
    pub fn save(&self, engine: &LedgerEngine) -> Result<(), StoreError> {
        self.save_history(engine.history())?;
        self.save_legend(engine.legend())?;
        Ok(())
    }

    // =========================================================================
    // File helpers
    // =========================================================================

    /// Copy `path` into the backup directory, if it exists.
    ///
    /// Returns the backup path when a copy was made.
    pub fn backup(&self, path: &Path) -> Result<Option<PathBuf>, StoreError> {
        if !path.exists() {
            return Ok(None);
        }
        let backup_dir = self.backup_dir();
        fs::create_dir_all(&backup_dir).map_err(|e| StoreError::io(&backup_dir, e))?;

        let file_name = path.file_name().unwrap_or(path.as_os_str());
        let target = backup_dir.join(file_name);
        fs::copy(path, &target).map_err(|e| StoreError::io(path, e))?;
        info!(from = %path.display(), to = %target.display(), "Backed up file");
        Ok(Some(target))
    }

    /// Write `bytes` to `path` through a temporary sibling and a rename,
    /// backing up the previous contents first.
    fn replace_file(&self, path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
        fs::create_dir_all(&self.data_dir).map_err(|e| StoreError::io(&self.data_dir, e))?;
        self.backup(path)?;

        let tmp = path.with_extension("csv.tmp");
        fs::write(&tmp, bytes).map_err(|e| StoreError::io(&tmp, e))?;
        fs::rename(&tmp, path).map_err(|e| StoreError::io(path, e))?;
        Ok(())
    }

    fn read_existing(&self, path: &Path) -> Result<Option<Vec<u8>>, StoreError> {
        match fs::read(path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::io(path, e)),
        }
    }
}
