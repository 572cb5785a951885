//! HTTP routes of the songs service

pub mod health;
pub mod songs;

use axum::Router;

use crate::state::AppState;

/// Catalog routes plus the readiness probe.
/// `/health` and the docs UIs are added by `axum_helpers`.
pub fn routes(state: &AppState) -> Router {
    Router::new()
        .nest("/songs", songs::router(state))
        .merge(health::router(state.clone()))
}
