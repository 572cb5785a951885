//! OpenAPI documentation configuration

use utoipa::OpenApi;

/// Combined OpenAPI documentation for the service
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Songs API",
        version = "0.1.0",
        description = "Song catalog with search, difficulty averages and user ratings",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    nest(
        (path = "/songs", api = domain_songs::ApiDoc)
    ),
    tags(
        (name = "Songs", description = "Song catalog and rating endpoints (MongoDB)")
    )
)]
pub struct ApiDoc;
