use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::response::Html;
use reqmatch_core::{CompareOptions, Comparator, ComparisonRun, CoreError};

use crate::error::ApiError;
use crate::state::AppState;
use crate::template;
use crate::upload;

/// Store the uploaded reference PDF, compare it against the upload folder
/// and render the results.
pub async fn upload(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Html<String>, ApiError> {
    let file = upload::parse_multipart(multipart, &state.config.extension).await?;

    // MuPDF extraction is blocking; keep it off the async workers.
    let run = tokio::task::spawn_blocking(move || compare_upload(&state, &file.filename, &file.data))
        .await
        .map_err(|e| ApiError::Internal(format!("Comparison task error: {}", e)))??;

    Ok(template::render_results(&run))
}

fn compare_upload(state: &AppState, filename: &str, data: &[u8]) -> Result<ComparisonRun, CoreError> {
    let stored = state.store.store(filename, data)?;

    let run = Comparator::new(state.backend.as_ref(), &state.store)
        .with_options(CompareOptions::from(&state.config))
        .compare(&stored, |_| {})?;

    if state.config.auto_save {
        state.history.save(&run)?;
    }
    Ok(run)
}
