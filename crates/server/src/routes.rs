pub mod auth;
pub mod comments;
pub mod listings;
pub mod users;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::types::Health;

use crate::auth::{require_admin, require_auth};
use crate::openapi::ApiDoc;
use crate::state::ServerState;
use crate::uploads::PUBLIC_PREFIX;

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Build the full application router: public, authenticated and admin routes plus docs and uploads.
pub fn build_router(state: ServerState, cors: CorsLayer, max_body_bytes: usize) -> Router {
    let uploads = ServeDir::new(&state.uploads.dir);

    // Public routes
    let public = Router::new()
        .route("/health", get(health))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/api/listings", get(listings::list))
        .route("/api/listings/:id", get(listings::get))
        .route("/api/comments/:id", get(comments::for_listing));

    // Bearer token required
    let protected = Router::new()
        .route("/api/listings", post(listings::create))
        .route("/api/listings/my", get(listings::mine))
        .route("/api/listings/favorites", get(listings::favorites))
        .route("/api/listings/:id", axum::routing::put(listings::update).delete(listings::delete))
        .route("/api/listings/:id/favorite", post(listings::toggle_favorite))
        .route("/api/comments", post(comments::create))
        .route("/api/comments/:id", delete(comments::delete))
        .route("/api/users/profile", get(users::profile).put(users::update_profile))
        .route("/api/users/listings", get(users::listings))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    // Bearer token and a stored ADMIN role
    let admin = Router::new()
        .route("/api/users", get(users::all))
        .route("/api/users/stats", get(users::stats))
        .route("/api/users/:id", delete(users::delete))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    public
        .merge(protected)
        .merge(admin)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest_service(PUBLIC_PREFIX, uploads)
        .with_state(state)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                // one INFO span per request with method and path
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                // status and latency
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                // 5xx and friends
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
