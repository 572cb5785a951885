use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::LazyLock;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::error::{SongError, SongResult};

/// Largest page `GET /songs` ever returns; also the page size when none is given.
pub const MAX_PAGE_SIZE: i64 = 11;

/// Search terms are restricted to word characters so they can be used as a
/// `$regex` without escaping.
pub static SEARCH_MESSAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9_]*$").expect("search message pattern is a valid regex")
});

/// A song document.
///
/// The catalog is schema-flexible: any JSON object is accepted and stored
/// as-is. `title`, `artist`, `difficulty` and `level` are the fields the
/// service queries on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = Object, example = json!({
    "artist": "The Yousicians",
    "title": "Lycanthropic Metamorphosis",
    "difficulty": 14.6,
    "level": 13,
    "released": "2016-10-26"
}))]
pub struct Song(pub Map<String, Value>);

impl Song {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn title(&self) -> Option<&str> {
        self.get("title").and_then(Value::as_str)
    }

    pub fn artist(&self) -> Option<&str> {
        self.get("artist").and_then(Value::as_str)
    }

    pub fn difficulty(&self) -> Option<f64> {
        self.get("difficulty").and_then(Value::as_f64)
    }

    pub fn level(&self) -> Option<i64> {
        self.get("level").and_then(Value::as_i64)
    }
}

impl From<Map<String, Value>> for Song {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

/// Query parameters for `GET /songs`.
///
/// Kept as raw strings so malformed numbers produce the standard error body.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct ListParams {
    /// 1-based page number
    pub page: Option<String>,
    /// Requested page size; anything above 11 is capped at 11
    pub page_size: Option<String>,
}

/// Resolved skip/limit for a listing query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub offset: u64,
    pub limit: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: MAX_PAGE_SIZE,
        }
    }
}

impl Pagination {
    /// Apply the listing policy to already-parsed parameters.
    ///
    /// The limit is the requested page size capped at [`MAX_PAGE_SIZE`], but
    /// the offset is computed from the *uncapped* page size, so
    /// `page=2&page_size=20` skips 20 and returns at most 11.
    ///
    /// A page size below 1 is handed to the store as is: 0 means no limit
    /// and a negative size returns that many songs in a single batch. Only
    /// an offset that would be negative or overflow is rejected.
    pub fn resolve(page: Option<i64>, page_size: Option<i64>) -> SongResult<Self> {
        let limit = page_size.map_or(MAX_PAGE_SIZE, |size| size.min(MAX_PAGE_SIZE));

        let offset = match page {
            None => 0,
            Some(page) if page <= 1 => 0,
            Some(page) => {
                let size = page_size.ok_or_else(|| {
                    SongError::Validation("page_size is required when page is greater than 1".into())
                })?;
                size.checked_mul(page - 1)
                    .and_then(|skip| u64::try_from(skip).ok())
                    .ok_or_else(|| SongError::Validation("page is out of range".into()))?
            }
        };

        Ok(Self { offset, limit })
    }

    pub fn from_params(params: &ListParams) -> SongResult<Self> {
        let page = parse_integer("page", params.page.as_deref())?;
        let page_size = parse_integer("page_size", params.page_size.as_deref())?;
        Self::resolve(page, page_size)
    }
}

/// Query parameters for `GET /songs/search`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams, Validate)]
pub struct SearchParams {
    /// Case-insensitive text matched against artist and title; letters,
    /// digits and underscores only. Missing means match everything.
    #[validate(regex(
        path = *SEARCH_MESSAGE,
        message = "message may only contain letters, digits and underscores"
    ))]
    pub message: Option<String>,
}

/// Query parameters for `GET /songs/avg/difficulty`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct DifficultyParams {
    /// Only average songs of this level (non-negative integer)
    pub level: Option<String>,
}

impl DifficultyParams {
    /// The level filter, if any. Only plain ASCII digits are accepted.
    pub fn level(&self) -> SongResult<Option<i64>> {
        let Some(raw) = self.level.as_deref() else {
            return Ok(None);
        };

        if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(SongError::Validation(format!(
                "level must be a non-negative integer, got '{raw}'"
            )));
        }

        raw.parse::<i64>()
            .map(Some)
            .map_err(|_| SongError::Validation(format!("level '{raw}' is out of range")))
    }
}

/// Average difficulty over the selected songs; `null` when none matched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AverageDifficulty {
    #[schema(example = 10.32)]
    pub average_difficulty: Option<f64>,
}

/// Query parameters for `POST /songs/rating`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct RatingParams {
    /// Identifier of the rated song
    pub song_id: Option<String>,
    /// Integer from 1 to 5
    pub rating: Option<String>,
}

/// A validated rating request.
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct NewRating {
    #[validate(length(min = 1, message = "song_id must not be empty"))]
    pub song_id: String,
    #[validate(range(min = 1, max = 5, message = "rating must be one of 1, 2, 3, 4, 5"))]
    pub rating: i32,
}

impl TryFrom<RatingParams> for NewRating {
    type Error = SongError;

    fn try_from(params: RatingParams) -> SongResult<Self> {
        let song_id = params
            .song_id
            .ok_or_else(|| SongError::Validation("song_id is required".into()))?;

        let rating = params
            .rating
            .as_deref()
            .ok_or_else(|| SongError::Validation("rating is required".into()))?
            .trim()
            .parse::<i32>()
            .map_err(|_| SongError::Validation("rating must be an integer".into()))?;

        let rating = Self { song_id, rating };
        rating
            .validate()
            .map_err(|e| SongError::Validation(e.to_string()))?;
        Ok(rating)
    }
}

/// A stored rating. Ratings are append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub song_id: String,
    pub rating: i32,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub timestamp: DateTime<Utc>,
}

impl Rating {
    /// Stamp a validated rating with the current time
    pub fn new(input: NewRating) -> Self {
        Self {
            song_id: input.song_id,
            rating: input.rating,
            timestamp: Utc::now(),
        }
    }
}

/// Lowest, highest and mean rating of one song; all `null` without ratings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RatingStats {
    #[schema(example = 1)]
    pub min: Option<i64>,
    #[schema(example = 5)]
    pub max: Option<i64>,
    #[schema(example = 3.0)]
    pub avg: Option<f64>,
}

fn parse_integer(name: &str, raw: Option<&str>) -> SongResult<Option<i64>> {
    raw.map(|value| {
        value
            .trim()
            .parse::<i64>()
            .map_err(|_| SongError::Validation(format!("{name} must be an integer, got '{value}'")))
    })
    .transpose()
}
