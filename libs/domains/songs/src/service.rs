//! Song Service - input checks and orchestration

use std::sync::Arc;
use tracing::instrument;
use validator::Validate;

use crate::error::{SongError, SongResult};
use crate::models::{
    AverageDifficulty, DifficultyParams, ListParams, NewRating, Pagination, Rating, RatingParams,
    RatingStats, SearchParams, Song,
};
use crate::repository::SongRepository;

/// Song service providing the catalog operations
///
/// Every input is checked here before the repository is touched, so a
/// rejected request never reaches the store.
pub struct SongService<R: SongRepository> {
    repository: Arc<R>,
}

impl<R: SongRepository> SongService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Store a batch of songs in order
    #[instrument(skip(self, songs), fields(count = songs.len()))]
    pub async fn add_songs(&self, songs: Vec<Song>) -> SongResult<usize> {
        if songs.is_empty() {
            return Err(SongError::Validation(
                "expected a non-empty array of songs".to_string(),
            ));
        }

        self.repository.insert_songs(songs).await
    }

    /// One page of the catalog
    #[instrument(skip(self))]
    pub async fn list_songs(&self, params: &ListParams) -> SongResult<Vec<Song>> {
        let page = Pagination::from_params(params)?;
        self.repository.list_songs(page).await
    }

    /// Songs whose artist or title contains the message
    #[instrument(skip(self))]
    pub async fn search_songs(&self, params: &SearchParams) -> SongResult<Vec<Song>> {
        params
            .validate()
            .map_err(|e| SongError::Validation(e.to_string()))?;

        // A missing message is an empty pattern and matches every song
        let message = params.message.as_deref().unwrap_or_default();
        self.repository.search_songs(message).await
    }

    #[instrument(skip(self))]
    pub async fn average_difficulty(
        &self,
        params: &DifficultyParams,
    ) -> SongResult<AverageDifficulty> {
        let level = params.level()?;
        let average_difficulty = self.repository.average_difficulty(level).await?;
        Ok(AverageDifficulty { average_difficulty })
    }

    /// Record a 1-5 rating for a song
    #[instrument(skip(self))]
    pub async fn rate_song(&self, params: RatingParams) -> SongResult<Rating> {
        let rating = Rating::new(NewRating::try_from(params)?);
        self.repository.insert_rating(rating.clone()).await?;
        Ok(rating)
    }

    #[instrument(skip(self))]
    pub async fn rating_stats(&self, song_id: &str) -> SongResult<RatingStats> {
        self.repository.rating_stats(song_id).await
    }

    /// Delete the whole catalog. Ratings are kept.
    #[instrument(skip(self))]
    pub async fn clear_songs(&self) -> SongResult<u64> {
        self.repository.clear_songs().await
    }
}

impl<R: SongRepository> Clone for SongService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}
