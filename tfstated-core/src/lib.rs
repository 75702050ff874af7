//! State and lock storage for the tfstated Terraform HTTP backend.
//!
//! Two filesystem-backed stores make up the core: [`StateStore`] persists one
//! opaque JSON state document per `(owner, project)` pair, and
//! [`LockRegistry`] persists advisory lock records keyed by caller-chosen ID.
//! Both write through the same stage-then-rename discipline so a reader never
//! observes a partially written file, and neither keeps any in-memory state
//! between calls — all coordination between concurrent callers happens
//! through the filesystem.

mod atomic;
mod key;

pub mod error;
pub mod lock_registry;
pub mod state_store;

pub use error::StoreError;
pub use lock_registry::{LockRecord, LockRegistry};
pub use state_store::StateStore;
