use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use axum_helpers::{
    JsonBody, QueryParams,
    errors::responses::{
        BadRequestValidationResponse, InternalServerErrorResponse, NotFoundResponse,
        ServiceUnavailableResponse,
    },
};
use serde_json::{Value, json};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::{SongError, SongResult};
use crate::models::{
    AverageDifficulty, DifficultyParams, ListParams, RatingParams, RatingStats, SearchParams, Song,
};
use crate::repository::SongRepository;
use crate::service::SongService;

/// OpenAPI documentation for the Songs API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_songs,
        create_songs,
        search_songs,
        average_difficulty,
        rate_song,
        rating_stats,
    ),
    components(
        schemas(Song, AverageDifficulty, RatingStats),
        responses(
            BadRequestValidationResponse,
            NotFoundResponse,
            InternalServerErrorResponse,
            ServiceUnavailableResponse
        )
    ),
    tags(
        (name = "Songs", description = "Song catalog and ratings")
    )
)]
pub struct ApiDoc;

/// Create the songs router; mount it at `/songs`
pub fn router<R: SongRepository + 'static>(service: SongService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_songs).post(create_songs))
        .route("/search", get(search_songs))
        .route("/avg/difficulty", get(average_difficulty))
        .route("/rating", post(rate_song))
        .route("/avg/rating/{song_id}", get(rating_stats))
        .route("/{operation}", get(unknown_operation))
        .with_state(shared_service)
}

/// List songs in insertion order, 11 per page at most
#[utoipa::path(
    get,
    path = "",
    tag = "Songs",
    params(ListParams),
    responses(
        (status = 200, description = "One page of songs", body = Vec<Song>),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse),
        (status = 503, response = ServiceUnavailableResponse)
    )
)]
async fn list_songs<R: SongRepository>(
    State(service): State<Arc<SongService<R>>>,
    QueryParams(params): QueryParams<ListParams>,
) -> SongResult<Json<Vec<Song>>> {
    let songs = service.list_songs(&params).await?;
    Ok(Json(songs))
}

/// Add a batch of songs
///
/// The body is parsed as JSON whatever its Content-Type.
#[utoipa::path(
    post,
    path = "",
    tag = "Songs",
    request_body = Vec<Song>,
    responses(
        (status = 201, description = "Songs stored; the body is an empty JSON object"),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse),
        (status = 503, response = ServiceUnavailableResponse)
    )
)]
async fn create_songs<R: SongRepository>(
    State(service): State<Arc<SongService<R>>>,
    JsonBody(songs): JsonBody<Vec<Song>>,
) -> SongResult<impl IntoResponse> {
    service.add_songs(songs).await?;
    Ok(created())
}

/// Search songs by artist or title
#[utoipa::path(
    get,
    path = "/search",
    tag = "Songs",
    params(SearchParams),
    responses(
        (status = 200, description = "Matching songs", body = Vec<Song>),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn search_songs<R: SongRepository>(
    State(service): State<Arc<SongService<R>>>,
    QueryParams(params): QueryParams<SearchParams>,
) -> SongResult<Json<Vec<Song>>> {
    let songs = service.search_songs(&params).await?;
    Ok(Json(songs))
}

/// Average difficulty, optionally for one level
#[utoipa::path(
    get,
    path = "/avg/difficulty",
    tag = "Songs",
    params(DifficultyParams),
    responses(
        (status = 200, description = "Average difficulty; null when no song matched", body = AverageDifficulty),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn average_difficulty<R: SongRepository>(
    State(service): State<Arc<SongService<R>>>,
    QueryParams(params): QueryParams<DifficultyParams>,
) -> SongResult<Json<AverageDifficulty>> {
    let average = service.average_difficulty(&params).await?;
    Ok(Json(average))
}

/// Rate a song from 1 to 5
#[utoipa::path(
    post,
    path = "/rating",
    tag = "Songs",
    params(RatingParams),
    responses(
        (status = 201, description = "Rating stored; the body is an empty JSON object"),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn rate_song<R: SongRepository>(
    State(service): State<Arc<SongService<R>>>,
    QueryParams(params): QueryParams<RatingParams>,
) -> SongResult<impl IntoResponse> {
    service.rate_song(params).await?;
    Ok(created())
}

/// Lowest, highest and average rating of a song
#[utoipa::path(
    get,
    path = "/avg/rating/{song_id}",
    tag = "Songs",
    params(
        ("song_id" = String, Path, description = "Song identifier")
    ),
    responses(
        (status = 200, description = "Rating statistics; all null without ratings", body = RatingStats),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn rating_stats<R: SongRepository>(
    State(service): State<Arc<SongService<R>>>,
    Path(song_id): Path<String>,
) -> SongResult<Json<RatingStats>> {
    let stats = service.rating_stats(&song_id).await?;
    Ok(Json(stats))
}

async fn unknown_operation(Path(operation): Path<String>) -> SongError {
    SongError::NotFound(format!("Unknown song operation '{operation}'"))
}

fn created() -> (StatusCode, Json<Value>) {
    (StatusCode::CREATED, Json(json!({})))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Pagination;
    use crate::repository::MockSongRepository;
    use axum::{
        body::Body,
        http::{Method, Request, header},
    };
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn app(repo: MockSongRepository) -> Router {
        Router::new().nest("/songs", router(SongService::new(repo)))
    }

    async fn send(app: Router, method: Method, uri: &str, body: Body) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(body)
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        send(app, Method::GET, uri, Body::empty()).await
    }

    #[tokio::test]
    async fn test_list_songs_default_page() {
        let mut repo = MockSongRepository::new();
        repo.expect_list_songs()
            .withf(|page| *page == Pagination::default())
            .returning(|_| Ok(vec![Song::default()]));

        let (status, body) = get_json(app(repo), "/songs").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([{}]));
    }

    #[tokio::test]
    async fn test_list_songs_bad_page_size_is_400_envelope() {
        let mut repo = MockSongRepository::new();
        repo.expect_list_songs().never();

        let (status, body) = get_json(app(repo), "/songs?page_size=abc").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_list_songs_repeated_page_is_json_400() {
        let mut repo = MockSongRepository::new();
        repo.expect_list_songs().never();

        let (status, body) = get_json(app(repo), "/songs?page=1&page=2").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "INVALID_QUERY");
        assert_eq!(body["code"], 1002);
    }

    #[tokio::test]
    async fn test_search_repeated_message_is_json_400() {
        let mut repo = MockSongRepository::new();
        repo.expect_search_songs().never();

        let (status, body) = get_json(app(repo), "/songs/search?message=a&message=b").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "INVALID_QUERY");
    }

    #[tokio::test]
    async fn test_list_songs_zero_page_size_reaches_store() {
        let mut repo = MockSongRepository::new();
        repo.expect_list_songs()
            .withf(|page| *page == Pagination { offset: 0, limit: 0 })
            .times(1)
            .returning(|_| Ok(vec![Song::default(); 3]));

        let (status, body) = get_json(app(repo), "/songs?page_size=0").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_create_songs_without_content_type() {
        let mut repo = MockSongRepository::new();
        repo.expect_insert_songs()
            .withf(|songs| songs.len() == 2)
            .times(1)
            .returning(|songs| Ok(songs.len()));

        let body = Body::from(r#"[{"title": "one"}, {"title": "two"}]"#);
        let (status, body) = send(app(repo), Method::POST, "/songs", body).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body, json!({}));
    }

    #[tokio::test]
    async fn test_create_songs_rejects_non_object_elements() {
        let mut repo = MockSongRepository::new();
        repo.expect_insert_songs().never();

        let (status, body) =
            send(app(repo), Method::POST, "/songs", Body::from("[1, 2]")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "INVALID_JSON");
    }

    #[tokio::test]
    async fn test_create_songs_rejects_empty_batch() {
        let mut repo = MockSongRepository::new();
        repo.expect_insert_songs().never();

        let (status, _) = send(app(repo), Method::POST, "/songs", Body::from("[]")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_songs_unacknowledged_is_500() {
        let mut repo = MockSongRepository::new();
        repo.expect_insert_songs().returning(|songs| {
            Err(SongError::Unacknowledged {
                expected: songs.len(),
                acknowledged: 0,
            })
        });

        let (status, body) = send(app(repo), Method::POST, "/songs", Body::from("[{}]")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "DATABASE_UNACKNOWLEDGED");
    }

    #[tokio::test]
    async fn test_search_invalid_message_is_400() {
        let mut repo = MockSongRepository::new();
        repo.expect_search_songs().never();

        // "öä()89¶\{" percent-encoded, quotes included
        let uri = "/songs/search?message=%22%C3%B6%C3%A4()89%C2%B6%5C%7B%22";
        let (status, _) = get_json(app(repo), uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_search_passes_message() {
        let mut repo = MockSongRepository::new();
        repo.expect_search_songs()
            .withf(|message| message == "finger")
            .returning(|_| Ok(vec![Song::default(), Song::default()]));

        let (status, body) = get_json(app(repo), "/songs/search?message=finger").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_average_difficulty_empty_is_null() {
        let mut repo = MockSongRepository::new();
        repo.expect_average_difficulty().returning(|_| Ok(None));

        let (status, body) = get_json(app(repo), "/songs/avg/difficulty?level=99").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"average_difficulty": null}));
    }

    #[tokio::test]
    async fn test_average_difficulty_bad_level_is_400() {
        let mut repo = MockSongRepository::new();
        repo.expect_average_difficulty().never();

        let (status, _) = get_json(app(repo), "/songs/avg/difficulty?level=Im()").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_rate_song_created() {
        let mut repo = MockSongRepository::new();
        repo.expect_insert_rating()
            .withf(|rating| rating.song_id == "abc" && rating.rating == 3)
            .times(1)
            .returning(|_| Ok(()));

        let request = Request::builder()
            .method(Method::POST)
            .uri("/songs/rating?song_id=abc&rating=3")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{}"))
            .unwrap();
        let response = app(repo).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_rate_song_rejections() {
        for uri in [
            "/songs/rating?song_id=abc&rating=asdjh",
            "/songs/rating?song_id=abc&rating=6",
            "/songs/rating?rating=6",
            "/songs/rating?song_id=abc",
        ] {
            let mut repo = MockSongRepository::new();
            repo.expect_insert_rating().never();

            let (status, body) = send(app(repo), Method::POST, uri, Body::empty()).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(body["code"], 1001);
        }
    }

    #[tokio::test]
    async fn test_rating_stats() {
        let mut repo = MockSongRepository::new();
        repo.expect_rating_stats()
            .withf(|song_id| song_id == "5f1d")
            .returning(|_| {
                Ok(RatingStats {
                    min: Some(1),
                    max: Some(5),
                    avg: Some(3.0),
                })
            });

        let (status, body) = get_json(app(repo), "/songs/avg/rating/5f1d").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"min": 1, "max": 5, "avg": 3.0}));
    }

    #[tokio::test]
    async fn test_unknown_operation_is_404() {
        let (status, body) = get_json(app(MockSongRepository::new()), "/songs/popular").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "NOT_FOUND");
    }
}
