//! JSON extractor that ignores the request's Content-Type.

use crate::errors::AppError;
use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;

/// JSON body extractor that parses the raw body whatever its Content-Type.
///
/// Clients that post JSON as `text/plain` or with no header at all are still
/// served. A body that is not valid JSON for `T` is rejected with a 400
/// `INVALID_JSON` error.
///
/// # Example
/// ```ignore
/// use axum_helpers::extractors::JsonBody;
/// use serde_json::Value;
///
/// async fn create(JsonBody(payload): JsonBody<Value>) -> String {
///     payload.to_string()
/// }
/// ```
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| AppError::InvalidJson(e.body_text()))?;

        serde_json::from_slice(&bytes)
            .map(JsonBody)
            .map_err(|e| AppError::InvalidJson(format!("Request body is not valid JSON: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::header;
    use serde_json::{Value, json};

    async fn extract(request: Request) -> Result<Value, AppError> {
        JsonBody::<Value>::from_request(request, &())
            .await
            .map(|JsonBody(v)| v)
    }

    #[tokio::test]
    async fn test_parses_body_without_content_type() {
        let request = Request::builder()
            .body(Body::from(r#"[{"artist": "A"}]"#))
            .unwrap();
        assert_eq!(extract(request).await.unwrap(), json!([{"artist": "A"}]));
    }

    #[tokio::test]
    async fn test_parses_body_with_text_plain() {
        let request = Request::builder()
            .header(header::CONTENT_TYPE, "text/plain")
            .body(Body::from(r#"{"title": "T"}"#))
            .unwrap();
        assert_eq!(extract(request).await.unwrap()["title"], "T");
    }

    #[tokio::test]
    async fn test_rejects_malformed_json() {
        let request = Request::builder().body(Body::from("{not json")).unwrap();
        assert!(matches!(
            extract(request).await,
            Err(AppError::InvalidJson(_))
        ));
    }
}
