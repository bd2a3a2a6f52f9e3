use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use reqmatch_core::CoreError;

use crate::error::ApiError;
use crate::models::{DocumentsResponse, MessageResponse};
use crate::state::AppState;

pub async fn list(State(state): State<Arc<AppState>>) -> Result<Json<DocumentsResponse>, ApiError> {
    let names = state.store.documents(&state.config.extension)?;
    Ok(Json(DocumentsResponse::from_names(names)))
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    match state.store.delete(&filename) {
        Ok(()) => Ok(Json(MessageResponse {
            message: format!("{} has been deleted.", filename),
        })),
        Err(CoreError::NotFound(_)) => Err(ApiError::NotFound("File not found.".to_string())),
        Err(e) => Err(e.into()),
    }
}
