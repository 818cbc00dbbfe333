//! Runtime configuration for a tracker session.
//!
//! # Invariants
//! - All derived paths live under `data_dir`, except exports.
//! - Defaults never fail; a missing platform data dir falls back to
//!   `./.spendbook`.

use crate::logging::default_log_level;
use crate::service::expense_service::DEFAULT_CURRENCY_LABEL;
use std::path::{Path, PathBuf};

const APP_DIR_NAME: &str = "spendbook";
const FALLBACK_DATA_DIR: &str = ".spendbook";
const DB_FILE_NAME: &str = "spendbook.sqlite3";
const LOG_DIR_NAME: &str = "logs";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerConfig {
    /// Directory holding the database and logs.
    pub data_dir: PathBuf,
    /// One of `trace|debug|info|warn|error`.
    pub log_level: String,
    /// Prefix printed before rendered amounts.
    pub currency_label: String,
    /// Directory receiving `expenses.<ext>`.
    pub export_dir: PathBuf,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .map(|dir| dir.join(APP_DIR_NAME))
            .unwrap_or_else(|| PathBuf::from(FALLBACK_DATA_DIR));
        Self {
            data_dir,
            log_level: default_log_level().to_string(),
            currency_label: DEFAULT_CURRENCY_LABEL.to_string(),
            export_dir: PathBuf::from("."),
        }
    }
}

impl TrackerConfig {
    /// Default config rooted at `data_dir`.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(DB_FILE_NAME)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join(LOG_DIR_NAME)
    }

    /// Resolves relative directories against `base`.
    ///
    /// Logging requires an absolute directory, so front-ends call this with
    /// the working directory before initializing logs.
    pub fn absolutize(mut self, base: &Path) -> Self {
        if self.data_dir.is_relative() {
            self.data_dir = base.join(&self.data_dir);
        }
        if self.export_dir.is_relative() {
            self.export_dir = base.join(&self.export_dir);
        }
        self
    }
}
