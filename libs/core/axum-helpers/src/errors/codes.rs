//! Type-safe error codes for API responses.
//!
//! Each code carries a client-facing identifier (e.g. "VALIDATION_ERROR"),
//! an integer for logs and metrics (e.g. 1001) and a default message.
//!
//! ```rust
//! use axum_helpers::errors::ErrorCode;
//!
//! let code = ErrorCode::ValidationError;
//! assert_eq!(code.as_str(), "VALIDATION_ERROR");
//! assert_eq!(code.code(), 1001);
//! assert_eq!(code.default_message(), "Request validation failed");
//! ```

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Standardized error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Client errors (1000-1999)
    /// Request input failed a type or range check
    ValidationError,

    /// Query string could not be decoded
    InvalidQuery,

    /// Request body is not valid JSON for the endpoint
    InvalidJson,

    /// Requested resource or route was not found
    NotFound,

    /// An unexpected internal server error occurred
    InternalError,

    /// The route exists but not for this HTTP method
    MethodNotAllowed,

    // Database errors (2000-2999)
    /// The store could not be reached (server selection, pool, network)
    DatabaseUnavailable,

    /// The store rejected our credentials
    DatabaseAuth,

    /// A command or write failed on the server
    DatabaseError,

    /// A document could not be converted to or from BSON
    DatabaseDecode,

    /// The store did not acknowledge every document of a write
    DatabaseUnacknowledged,

    /// Any other driver error
    DatabaseUnhandled,
}

impl ErrorCode {
    /// SCREAMING_SNAKE_CASE identifier for clients.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ValidationError => "VALIDATION_ERROR",
            Self::InvalidQuery => "INVALID_QUERY",
            Self::InvalidJson => "INVALID_JSON",
            Self::NotFound => "NOT_FOUND",
            Self::InternalError => "INTERNAL_ERROR",
            Self::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            Self::DatabaseUnavailable => "DATABASE_UNAVAILABLE",
            Self::DatabaseAuth => "DATABASE_AUTH",
            Self::DatabaseError => "DATABASE_ERROR",
            Self::DatabaseDecode => "DATABASE_DECODE",
            Self::DatabaseUnacknowledged => "DATABASE_UNACKNOWLEDGED",
            Self::DatabaseUnhandled => "DATABASE_UNHANDLED",
        }
    }

    /// Integer code for structured logs. Ranges:
    /// - 1000-1999: client errors
    /// - 2000-2999: database errors
    pub fn code(&self) -> i32 {
        match self {
            Self::ValidationError => 1001,
            Self::InvalidQuery => 1002,
            Self::InvalidJson => 1003,
            Self::NotFound => 1004,
            Self::InternalError => 1005,
            Self::MethodNotAllowed => 1006,

            Self::DatabaseUnavailable => 2001,
            Self::DatabaseAuth => 2002,
            Self::DatabaseError => 2003,
            Self::DatabaseDecode => 2010,
            Self::DatabaseUnacknowledged => 2020,
            Self::DatabaseUnhandled => 2099,
        }
    }

    /// Default human-readable message; handlers may override it.
    pub fn default_message(&self) -> &'static str {
        match self {
            Self::ValidationError => "Request validation failed",
            Self::InvalidQuery => "Invalid query string",
            Self::InvalidJson => "Invalid JSON format",
            Self::NotFound => "Resource not found",
            Self::InternalError => "An internal server error occurred",
            Self::MethodNotAllowed => "The HTTP method is not allowed for this resource",
            Self::DatabaseUnavailable => "Database is unavailable",
            Self::DatabaseAuth => "Database authentication failed",
            Self::DatabaseError => "Database error occurred",
            Self::DatabaseDecode => "Failed to convert a database document",
            Self::DatabaseUnacknowledged => "Database did not acknowledge the write",
            Self::DatabaseUnhandled => "Unhandled database error",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_string_representation() {
        assert_eq!(ErrorCode::ValidationError.as_str(), "VALIDATION_ERROR");
        assert_eq!(ErrorCode::NotFound.as_str(), "NOT_FOUND");
        assert_eq!(ErrorCode::DatabaseUnavailable.as_str(), "DATABASE_UNAVAILABLE");
    }

    #[test]
    fn test_error_code_ranges() {
        assert_eq!(ErrorCode::ValidationError.code(), 1001);
        assert_eq!(ErrorCode::DatabaseError.code(), 2003);
        assert!((2000..3000).contains(&ErrorCode::DatabaseUnacknowledged.code()));
    }

    #[test]
    fn test_error_code_serialization_matches_as_str() {
        for code in [
            ErrorCode::InvalidQuery,
            ErrorCode::DatabaseDecode,
            ErrorCode::MethodNotAllowed,
        ] {
            let json = serde_json::to_string(&code).unwrap();
            assert_eq!(json, format!("\"{}\"", code.as_str()));
        }
    }

    #[test]
    fn test_error_code_deserialization() {
        let code: ErrorCode = serde_json::from_str("\"VALIDATION_ERROR\"").unwrap();
        assert_eq!(code, ErrorCode::ValidationError);
    }
}
