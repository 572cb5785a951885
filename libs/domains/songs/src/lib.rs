//! Songs Domain
//!
//! The song catalog and its ratings, stored in MongoDB.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints under /songs
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Input checks, pagination policy
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Data access (trait + MongoDB implementation)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Songs, ratings, aggregates, query parameters
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_songs::{handlers, MongoSongRepository, SongService};
//! use mongodb::Client;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::with_uri_str("mongodb://localhost:27017").await?;
//! let db = client.database("song_list");
//!
//! let service = SongService::new(MongoSongRepository::new(&db));
//! let router = axum::Router::new().nest("/songs", handlers::router(service));
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod handlers;
pub mod models;
pub mod mongodb;
pub mod repository;
pub mod service;

pub use crate::mongodb::MongoSongRepository;
pub use error::{SongError, SongResult};
pub use handlers::ApiDoc;
pub use models::{
    AverageDifficulty, DifficultyParams, ListParams, MAX_PAGE_SIZE, NewRating, Pagination, Rating,
    RatingParams, RatingStats, SearchParams, Song,
};
pub use repository::SongRepository;
pub use service::SongService;
