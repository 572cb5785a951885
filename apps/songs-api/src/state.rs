//! Shared application state.

use mongodb::{Client, Database};

/// Handed to the route builders once at startup.
#[derive(Clone)]
pub struct AppState {
    pub config: crate::config::Config,
    /// Cloneable handle over the shared connection pool
    pub mongo_client: Client,
    /// Database holding the `songs` and `ratings` collections
    pub db: Database,
}
