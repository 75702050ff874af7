//! Validation for caller-supplied key segments.
//!
//! Owner IDs, project names, and lock IDs all become components of a file
//! name. An HTTP router's path splitting usually keeps separators out of a
//! single segment, but the stores cannot assume a particular caller, so they
//! reject anything that could escape the storage directory themselves.

use crate::error::StoreError;

pub(crate) fn validate_segment(segment: &str) -> Result<(), StoreError> {
    let escapes = segment.is_empty()
        || segment == "."
        || segment == ".."
        || segment.bytes().any(|b| b == b'/' || b == b'\\' || b == 0);
    if escapes {
        return Err(StoreError::invalid_key(segment));
    }
    Ok(())
}
