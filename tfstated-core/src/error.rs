use std::io;

use thiserror::Error;

/// Errors surfaced by [`crate::StateStore`] and [`crate::LockRegistry`].
///
/// Every failure propagates to the immediate caller with its kind intact;
/// the stores never retry or recover internally. Whether a rename or a lock
/// race is worth retrying is the caller's decision.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No state document or lock record exists for the requested key.
    ///
    /// Absence is a valid, distinguishable state — distinct from an empty
    /// document and from a read that failed for any other reason.
    #[error("not found")]
    NotFound,

    /// The request names a lock that does not exist, or uses a key the
    /// store cannot accept.
    #[error("{0}")]
    Conflict(String),

    /// A lock record with this ID already exists.
    #[error("a lock already exists")]
    AlreadyLocked,

    /// Any filesystem failure other than absence: permission, disk full,
    /// corrupt JSON on read, serialization failure on write.
    #[error("storage i/o failed: {0}")]
    Io(#[from] io::Error),
}

impl StoreError {
    pub(crate) fn invalid_key(segment: &str) -> Self {
        StoreError::Conflict(format!("invalid key segment: {segment:?}"))
    }
}
