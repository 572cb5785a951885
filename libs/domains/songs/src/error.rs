use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SongError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("Write not acknowledged: {acknowledged} of {expected} documents stored")]
    Unacknowledged { expected: usize, acknowledged: usize },

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type SongResult<T> = Result<T, SongError>;

/// Convert SongError to AppError for standardized error responses
impl From<SongError> for AppError {
    fn from(err: SongError) -> Self {
        match err {
            SongError::Validation(msg) => AppError::BadRequest(msg),
            SongError::NotFound(msg) => AppError::NotFound(msg),
            SongError::Database(e) => AppError::Database(e),
            err @ SongError::Unacknowledged { .. } => AppError::Unacknowledged(err.to_string()),
            SongError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for SongError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<bson::de::Error> for SongError {
    fn from(err: bson::de::Error) -> Self {
        SongError::Internal(format!("Failed to decode document: {}", err))
    }
}
