use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::response::Html;
use reqmatch_core::ComparisonRun;

use crate::error::ApiError;
use crate::state::AppState;
use crate::template;

/// Dashboard of every saved comparison run.
pub async fn dashboard(State(state): State<Arc<AppState>>) -> Result<Html<String>, ApiError> {
    let history = state.history.load()?;
    Ok(template::render_admin(&history))
}

/// Saved comparison runs as JSON, oldest first.
pub async fn history(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ComparisonRun>>, ApiError> {
    Ok(Json(state.history.load()?))
}
