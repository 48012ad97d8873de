use axum::{
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{make_span_with_request_id, request_id_middleware};

pub mod genres;
pub mod sessions;
pub mod state;

pub use state::{AppState, Settings};

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// API routes under /api/v1
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/genres", get(genres::list))
        .route("/genres/:genre/tracks", get(genres::tracks))
        .route("/sessions", post(sessions::create))
        .route("/sessions/:id", get(sessions::show).delete(sessions::end))
        .route("/sessions/:id/genres", post(sessions::select_genres))
        .route("/sessions/:id/tracks", post(sessions::select_tracks))
        .route("/sessions/:id/preferences", post(sessions::save_preferences))
        .route("/sessions/:id/register", post(sessions::register))
        .route("/sessions/:id/login", post(sessions::login))
        .route("/sessions/:id/logout", post(sessions::logout))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
