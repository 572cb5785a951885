//! MongoDB implementation of SongRepository

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{Bson, Document, doc};
use mongodb::options::FindOptions;
use mongodb::{Collection, Database};
use serde_json::{Map, Value};
use tracing::instrument;

use crate::error::{SongError, SongResult};
use crate::models::{AverageDifficulty, Pagination, Rating, RatingStats, Song};
use crate::repository::SongRepository;

pub const SONGS_COLLECTION: &str = "songs";
pub const RATINGS_COLLECTION: &str = "ratings";

/// MongoDB-based song repository
///
/// Songs are stored as free-form documents; ratings use the typed [`Rating`]
/// layout.
#[derive(Clone)]
pub struct MongoSongRepository {
    songs: Collection<Document>,
    ratings: Collection<Rating>,
}

impl MongoSongRepository {
    /// Repository over the `songs` and `ratings` collections of `database`
    pub fn new(database: &Database) -> Self {
        Self {
            songs: database.collection(SONGS_COLLECTION),
            ratings: database.collection(RATINGS_COLLECTION),
        }
    }

    /// Case-insensitive match on artist OR title.
    ///
    /// `message` must already be restricted to word characters.
    fn search_filter(message: &str) -> Document {
        doc! {
            "$or": [
                { "artist": { "$regex": message, "$options": "i" } },
                { "title": { "$regex": message, "$options": "i" } },
            ]
        }
    }

    fn difficulty_pipeline(level: Option<i64>) -> Vec<Document> {
        let filter = match level {
            Some(level) => doc! { "level": level },
            None => doc! {},
        };

        vec![
            doc! { "$match": filter },
            doc! {
                "$group": {
                    "_id": Bson::Null,
                    "average_difficulty": { "$avg": "$difficulty" },
                }
            },
        ]
    }

    fn rating_pipeline(song_id: &str) -> Vec<Document> {
        vec![
            doc! { "$match": { "song_id": song_id } },
            doc! {
                "$group": {
                    "_id": Bson::Null,
                    "min": { "$min": "$rating" },
                    "max": { "$max": "$rating" },
                    "avg": { "$avg": "$rating" },
                }
            },
        ]
    }

    /// Render a stored document as plain JSON (relaxed extended JSON for
    /// BSON-only types such as dates)
    fn song_from_document(document: Document) -> Song {
        document
            .into_iter()
            .map(|(key, value)| (key, value.into_relaxed_extjson()))
            .collect::<Map<String, Value>>()
            .into()
    }

    /// Encode client-supplied songs. A value BSON cannot hold, such as an
    /// integer above `i64::MAX`, is a bad request rather than a store fault.
    fn songs_to_documents(songs: &[Song]) -> SongResult<Vec<Document>> {
        songs
            .iter()
            .enumerate()
            .map(|(index, song)| {
                bson::to_document(song).map_err(|e| {
                    SongError::Validation(format!("song {index} cannot be stored: {e}"))
                })
            })
            .collect()
    }

    /// Run a single-group aggregation and decode its only row, if any
    async fn aggregate_one<T>(
        collection: &Collection<impl Send + Sync>,
        pipeline: Vec<Document>,
    ) -> SongResult<Option<T>>
    where
        T: serde::de::DeserializeOwned,
    {
        let mut cursor = collection.aggregate(pipeline).await?;
        match cursor.try_next().await? {
            Some(row) => Ok(Some(bson::from_document(row)?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl SongRepository for MongoSongRepository {
    #[instrument(skip(self, songs), fields(count = songs.len()))]
    async fn insert_songs(&self, songs: Vec<Song>) -> SongResult<usize> {
        if songs.is_empty() {
            return Ok(0);
        }

        let expected = songs.len();
        let documents = Self::songs_to_documents(&songs)?;

        let result = self.songs.insert_many(documents).await?;
        let acknowledged = result.inserted_ids.len();
        if acknowledged != expected {
            return Err(SongError::Unacknowledged {
                expected,
                acknowledged,
            });
        }

        tracing::info!(count = acknowledged, "Songs inserted successfully");
        Ok(acknowledged)
    }

    #[instrument(skip(self))]
    async fn list_songs(&self, page: Pagination) -> SongResult<Vec<Song>> {
        let options = FindOptions::builder()
            .projection(doc! { "_id": 0 })
            .skip(page.offset)
            .limit(page.limit)
            .build();

        let cursor = self.songs.find(doc! {}).with_options(options).await?;
        let documents: Vec<Document> = cursor.try_collect().await?;
        Ok(documents.into_iter().map(Self::song_from_document).collect())
    }

    #[instrument(skip(self))]
    async fn search_songs(&self, message: &str) -> SongResult<Vec<Song>> {
        let options = FindOptions::builder()
            .projection(doc! { "_id": 0 })
            .build();

        let cursor = self
            .songs
            .find(Self::search_filter(message))
            .with_options(options)
            .await?;
        let documents: Vec<Document> = cursor.try_collect().await?;
        Ok(documents.into_iter().map(Self::song_from_document).collect())
    }

    #[instrument(skip(self))]
    async fn average_difficulty(&self, level: Option<i64>) -> SongResult<Option<f64>> {
        let row: Option<AverageDifficulty> =
            Self::aggregate_one(&self.songs, Self::difficulty_pipeline(level)).await?;
        Ok(row.and_then(|row| row.average_difficulty))
    }

    #[instrument(skip(self))]
    async fn clear_songs(&self) -> SongResult<u64> {
        let result = self.songs.delete_many(doc! {}).await?;
        tracing::info!(count = result.deleted_count, "Songs cleared");
        Ok(result.deleted_count)
    }

    #[instrument(skip(self, rating), fields(song_id = %rating.song_id, rating = rating.rating))]
    async fn insert_rating(&self, rating: Rating) -> SongResult<()> {
        self.ratings.insert_one(&rating).await?;
        tracing::info!("Rating stored successfully");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn rating_stats(&self, song_id: &str) -> SongResult<RatingStats> {
        let row: Option<RatingStats> =
            Self::aggregate_one(&self.ratings, Self::rating_pipeline(song_id)).await?;
        Ok(row.unwrap_or_default())
    }
}
