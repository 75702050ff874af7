pub mod auth;
pub mod config;
pub mod handlers;

use tfstated_core::{LockRegistry, StateStore};

pub use config::{BasicCredentials, Config};

/// Shared application state handed to every handler.
///
/// Both stores are stateless between calls, so no interior mutability is
/// needed here — concurrent requests coordinate through the filesystem, not
/// through this struct.
pub struct AppState {
    pub state_store: StateStore,
    pub lock_registry: LockRegistry,
    /// Basic-auth credentials; `None` disables authentication.
    pub credentials: Option<BasicCredentials>,
}
