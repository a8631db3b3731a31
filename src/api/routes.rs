//! HTTP API route definitions.

use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::handlers::{
    build_by_id, data_bundle, data_summary, empty_build_id, health, list_builds, metrics, openapi,
    permafrost_marshal, AppState,
};

/// Create the API router.
///
/// The fixed `permafrost-marshal` route is matched before the `:id` route for
/// that exact path segment.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health endpoint
        .route("/api/health", get(health))
        // Reference data
        .route("/api/data/summary", get(data_summary))
        .route("/api/data", get(data_bundle))
        // Builds
        .route("/api/builds", get(list_builds))
        .route("/api/builds/", get(empty_build_id))
        .route("/api/builds/permafrost-marshal", get(permafrost_marshal))
        .route("/api/builds/:id", get(build_by_id))
        .route("/api/builds/:id/", get(build_by_id))
        // Docs and metrics
        .route("/api/openapi.json", get(openapi))
        .route("/metrics", get(metrics))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
