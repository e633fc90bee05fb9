//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! This module binds the project scene and sketch endpoints, mounts the
//! storage tree so mesh URLs resolve, and wraps everything in the shared
//! middleware stack. The viewer is served separately and calls these
//! endpoints cross-origin.

pub mod projects;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Sketch bodies carry every stroke sample plus an SVG rendering.
const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;


/// Build the full application router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);
    let storage_mount = format!("/{}", state.config.storage_mount());
    let storage = ServeDir::new(&state.config.storage_dir);

    Router::new()
        .route("/api/projects/{id}/scene", get(projects::get_scene).put(projects::save_scene))
        .route("/api/projects/{id}/sketches", post(projects::save_sketch))
        .route("/healthz", get(healthz))
        .nest_service(&storage_mount, storage)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
