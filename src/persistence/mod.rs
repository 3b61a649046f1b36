//! Lockout persistence
//!
//! The lockout timestamp and the cross-session failure count outlive any
//! single gate session. They are kept in a `LockoutStore`:
//! - `MemoryLockoutStore` for tests and ephemeral embedding
//! - `JsonFileLockoutStore` for durable storage (tmp file, then rename)
//!
//! A missing file loads as the default record. A corrupt file is logged
//! and also loads as the default record.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Process-wide attempt state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LockoutRecord {
    /// User may not start a session before this instant
    #[serde(default)]
    pub lockout_until: Option<DateTime<Utc>>,
    /// Failed answers since the last lockout or success
    #[serde(default)]
    pub total_attempts: u32,
}

/// Storage for the lockout record
pub trait LockoutStore: Send {
    fn load(&self) -> Result<LockoutRecord, StoreError>;
    fn save(&mut self, record: &LockoutRecord) -> Result<(), StoreError>;
}

/// In-memory store
#[derive(Debug, Clone, Default)]
pub struct MemoryLockoutStore {
    record: LockoutRecord,
}

impl MemoryLockoutStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing record
    pub fn with_record(record: LockoutRecord) -> Self {
        Self { record }
    }

    pub fn record(&self) -> LockoutRecord {
        self.record
    }
}

impl LockoutStore for MemoryLockoutStore {
    fn load(&self) -> Result<LockoutRecord, StoreError> {
        Ok(self.record)
    }

    fn save(&mut self, record: &LockoutRecord) -> Result<(), StoreError> {
        self.record = *record;
        Ok(())
    }
}

/// JSON file store
#[derive(Debug, Clone)]
pub struct JsonFileLockoutStore {
    path: PathBuf,
}

impl JsonFileLockoutStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        PathBuf::from(tmp)
    }
}

impl LockoutStore for JsonFileLockoutStore {
    fn load(&self) -> Result<LockoutRecord, StoreError> {
        let json = match std::fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No lockout record at {}, starting fresh", self.path.display());
                return Ok(LockoutRecord::default());
            }
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str(&json) {
            Ok(record) => Ok(record),
            Err(e) => {
                log::warn!(
                    "Corrupt lockout record at {} ({e}), starting fresh",
                    self.path.display()
                );
                Ok(LockoutRecord::default())
            }
        }
    }

    fn save(&mut self, record: &LockoutRecord) -> Result<(), StoreError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(record)?;
        let tmp = self.tmp_path();
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        log::debug!("Lockout record saved to {}", self.path.display());
        Ok(())
    }
}
