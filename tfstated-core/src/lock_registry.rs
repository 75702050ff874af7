//! Advisory lock records keyed by caller-chosen ID.

use std::fs;
use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::atomic;
use crate::error::StoreError;
use crate::key;

/// A lock record as supplied by the client.
///
/// Terraform sends a JSON object with an `ID` plus whatever else it chooses
/// to include (`Who`, `Operation`, `Created`, ...). Only the ID is
/// interpreted; every other field is carried through verbatim and persisted
/// alongside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LockRecord {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// Single-owner mutual-exclusion tokens, one file per lock ID.
///
/// The registry is advisory: nothing forces a state writer to hold a lock.
/// What it does guarantee is that at most one record exists per ID at any
/// time — creation is a single atomic filesystem operation, so two callers
/// racing on the same ID cannot both win. A lock persists until explicitly
/// removed; there is no lease or expiry.
pub struct LockRegistry {
    dir: PathBuf,
}

impl LockRegistry {
    /// Create a registry rooted at `dir`. The directory must already exist.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        LockRegistry { dir: dir.into() }
    }

    fn lock_path(&self, lock_id: &str) -> Result<PathBuf, StoreError> {
        key::validate_segment(lock_id)?;
        Ok(self.dir.join(format!("{lock_id}.lock")))
    }

    /// Attempt to create a lock record for `record.id`.
    ///
    /// Returns `Ok(false)` without mutating anything if a record with that
    /// ID already exists. Of two concurrent creates for the same ID, exactly
    /// one returns `true`.
    pub fn create(&self, record: &LockRecord) -> Result<bool, StoreError> {
        let path = self.lock_path(&record.id)?;
        let value = serde_json::to_value(record).map_err(|err| StoreError::Io(err.into()))?;
        atomic::create_json_exclusive(&path, &value).map_err(StoreError::Io)
    }

    /// Remove the lock record for `lock_id`.
    ///
    /// Returns `Ok(false)` if no record exists. Absence is taken from the
    /// unlink result itself, not from a prior existence probe.
    pub fn remove(&self, lock_id: &str) -> Result<bool, StoreError> {
        let path = self.lock_path(lock_id)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(StoreError::Io(err)),
        }
    }

    /// Check whether a lock record exists for `lock_id`. No side effects.
    pub fn exists(&self, lock_id: &str) -> Result<bool, StoreError> {
        let path = self.lock_path(lock_id)?;
        path.try_exists().map_err(StoreError::Io)
    }
}
