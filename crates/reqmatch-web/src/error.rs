use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use reqmatch_core::CoreError;

use crate::models::MessageResponse;

/// Handler error, rendered as `{"message": ...}` with a matching status.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Internal(String),
    Core(CoreError),
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        ApiError::Core(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Core(err) => match err {
                CoreError::InvalidInput(_) => StatusCode::BAD_REQUEST,
                CoreError::NotFound(_) => StatusCode::NOT_FOUND,
                CoreError::Extraction { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                CoreError::DataCorruption { .. } | CoreError::Io { .. } => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::BadRequest(m) | ApiError::NotFound(m) | ApiError::Internal(m) => m,
            ApiError::Core(err) => err.to_string(),
        };
        if status.is_server_error() {
            tracing::error!(%status, %message, "request failed");
        } else {
            tracing::debug!(%status, %message, "request rejected");
        }
        (status, Json(MessageResponse { message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqmatch_core::BackendError;

    #[test]
    fn core_errors_map_to_statuses() {
        let cases = [
            (CoreError::InvalidInput("x".into()), StatusCode::BAD_REQUEST),
            (CoreError::NotFound("x.pdf".into()), StatusCode::NOT_FOUND),
            (
                CoreError::Extraction {
                    document: "x.pdf".into(),
                    source: BackendError::OpenError("bad".into()),
                },
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                CoreError::Io {
                    context: "write".into(),
                    source: std::io::Error::other("disk full"),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }
}
