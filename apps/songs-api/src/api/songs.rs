//! Songs API routes

use axum::Router;
use domain_songs::{MongoSongRepository, SongService, handlers};

use crate::state::AppState;

pub fn router(state: &AppState) -> Router {
    let repository = MongoSongRepository::new(&state.db);
    let service = SongService::new(repository);

    handlers::router(service)
}
