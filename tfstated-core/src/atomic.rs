//! Atomic JSON file operations shared by the state store and lock registry.
//!
//! Writes are staged to a temporary file in the *destination* directory and
//! moved into place with a single rename. Staging in the destination
//! directory matters: a rename is only atomic within one filesystem, so the
//! temp file must never live on a different volume (e.g. the system temp
//! dir) from the final path.

use std::fs;
use std::io;
use std::path::Path;

use serde_json::Value;
use tempfile::NamedTempFile;

fn parent_dir(path: &Path) -> io::Result<&Path> {
    path.parent()
        .ok_or_else(|| io::Error::other(format!("path has no parent directory: {}", path.display())))
}

fn stage(path: &Path, value: &Value) -> io::Result<NamedTempFile> {
    let mut tmp = NamedTempFile::new_in(parent_dir(path)?)?;
    serde_json::to_writer(tmp.as_file_mut(), value).map_err(io::Error::from)?;
    tmp.as_file().sync_all()?;
    Ok(tmp)
}

/// Read and parse a JSON file.
///
/// Absence surfaces as an `io::ErrorKind::NotFound` error; a file that
/// exists but does not parse surfaces as `InvalidData`. Callers map the
/// former to [`crate::StoreError::NotFound`] and everything else to an I/O
/// failure.
pub(crate) fn read_json(path: &Path) -> io::Result<Value> {
    let bytes = fs::read(path)?;
    serde_json::from_slice(&bytes).map_err(io::Error::from)
}

/// Write `value` to `path` atomically, replacing any existing file.
///
/// The rename is the only mutation of the final path, so a failure at any
/// earlier point (serialization, disk full during staging) leaves the
/// previously committed file untouched.
pub(crate) fn write_json(path: &Path, value: &Value) -> io::Result<()> {
    let tmp = stage(path, value)?;
    tmp.persist(path).map(|_| ()).map_err(|err| err.error)
}

/// Create `path` with `value` as content, failing if it already exists.
///
/// Returns `Ok(false)` without mutating anything if the path exists.
///
/// The record is staged to a sibling temp file and hard-linked into place.
/// `hard_link` refuses to replace an existing path, so the existence check
/// and the creation are one filesystem operation: two concurrent callers
/// racing on the same path cannot both succeed, and the path only ever
/// appears with its full contents.
pub(crate) fn create_json_exclusive(path: &Path, value: &Value) -> io::Result<bool> {
    let tmp = stage(path, value)?;
    match fs::hard_link(tmp.path(), path) {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists => Ok(false),
        Err(err) => Err(err),
    }
    // Dropping `tmp` unlinks the staging path; the linked path keeps the inode.
}
