use async_trait::async_trait;

use crate::error::SongResult;
use crate::models::{Pagination, Rating, RatingStats, Song};

/// Repository trait for the song catalog and its ratings
///
/// Every method is a single store operation; nothing is retried.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SongRepository: Send + Sync {
    /// Insert songs in the given order as one batch, returning how many
    /// the store acknowledged
    async fn insert_songs(&self, songs: Vec<Song>) -> SongResult<usize>;

    /// Songs in natural (insertion) order, without the store identifier
    async fn list_songs(&self, page: Pagination) -> SongResult<Vec<Song>>;

    /// Songs whose artist or title contains `message`, ignoring case
    async fn search_songs(&self, message: &str) -> SongResult<Vec<Song>>;

    /// Mean difficulty, optionally restricted to one level; `None` when no
    /// song matched
    async fn average_difficulty(&self, level: Option<i64>) -> SongResult<Option<f64>>;

    /// Remove every song, returning how many were deleted
    async fn clear_songs(&self) -> SongResult<u64>;

    /// Append one rating
    async fn insert_rating(&self, rating: Rating) -> SongResult<()>;

    /// Min, max and mean rating of one song
    async fn rating_stats(&self, song_id: &str) -> SongResult<RatingStats>;
}
