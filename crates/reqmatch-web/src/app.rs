use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Allow large uploads (100MB).
const MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::index::index))
        .route("/api/upload", post(handlers::upload::upload))
        .route("/admin", get(handlers::admin::dashboard))
        .route("/api/history", get(handlers::admin::history))
        .route("/api/documents", get(handlers::documents::list))
        .route("/api/delete/{filename}", delete(handlers::documents::delete))
        .route("/api/health", get(handlers::health::health))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
