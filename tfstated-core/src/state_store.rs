//! Persistent storage for Terraform state documents.

use std::fs;
use std::io;
use std::path::PathBuf;

use serde_json::Value;

use crate::atomic;
use crate::error::StoreError;
use crate::key;

/// Durable, atomic persistence of one JSON state document per
/// `(owner, project)` pair.
///
/// Documents are opaque: apart from the `check_results` normalization in
/// [`StateStore::put`], contents pass through untouched. Each write fully
/// replaces the prior document; no history is kept.
///
/// # Concurrency
///
/// The store holds no state between calls and derives every path from the
/// key, so one instance may be shared freely across threads. Each individual
/// write is atomic (stage then rename), but the store does not order
/// concurrent writers to the same key — last rename wins. Serializing
/// writers is the caller's job, via the advisory [`crate::LockRegistry`].
pub struct StateStore {
    dir: PathBuf,
}

impl StateStore {
    /// Create a store rooted at `dir`. The directory must already exist.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        StateStore { dir: dir.into() }
    }

    fn document_path(&self, owner: &str, project: &str) -> Result<PathBuf, StoreError> {
        key::validate_segment(owner)?;
        key::validate_segment(project)?;
        Ok(self.dir.join(format!("{owner}-{project}.tfstate")))
    }

    /// Retrieve the current state document.
    ///
    /// Fails with [`StoreError::NotFound`] if no document exists for the
    /// key, and [`StoreError::Io`] on any other read error, including a
    /// document that exists but no longer parses as JSON.
    pub fn get(&self, owner: &str, project: &str) -> Result<Value, StoreError> {
        let path = self.document_path(owner, project)?;
        match atomic::read_json(&path) {
            Ok(document) => Ok(document),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Err(StoreError::NotFound),
            Err(err) => Err(StoreError::Io(err)),
        }
    }

    /// Persist a state document, replacing any previous one.
    ///
    /// A top-level `check_results` field whose value is JSON null is
    /// stripped before persistence; any other value for that field is kept
    /// verbatim. This is the only interpretation of document contents the
    /// store performs.
    ///
    /// The write is staged to a sibling temp file and renamed into place; a
    /// failure at any point before the rename leaves the previous document
    /// (or its absence) intact.
    pub fn put(&self, owner: &str, project: &str, mut document: Value) -> Result<(), StoreError> {
        let path = self.document_path(owner, project)?;
        if let Value::Object(fields) = &mut document {
            if matches!(fields.get("check_results"), Some(Value::Null)) {
                fields.remove("check_results");
            }
        }
        atomic::write_json(&path, &document).map_err(StoreError::Io)
    }

    /// Delete the state document for the key.
    ///
    /// Fails with [`StoreError::NotFound`] if no document exists.
    pub fn delete(&self, owner: &str, project: &str) -> Result<(), StoreError> {
        let path = self.document_path(owner, project)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Err(StoreError::NotFound),
            Err(err) => Err(StoreError::Io(err)),
        }
    }
}
