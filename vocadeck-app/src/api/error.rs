use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use vocadeck_core::CoreError;

/// Failures a handler can return. Handlers log them inside their own span
/// (`#[instrument(err)]`), so conversion into a response stays silent.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error("malformed request body: {0}")]
    Body(#[from] JsonRejection),
    #[error("invalid query string: {0}")]
    Query(#[from] QueryRejection),
    #[error("invalid path: {0}")]
    Path(#[from] PathRejection),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Core(CoreError::Invalid(_))
            | ApiError::Body(_)
            | ApiError::Query(_)
            | ApiError::Path(_) => StatusCode::BAD_REQUEST,
            ApiError::Core(CoreError::Conflict(_)) => StatusCode::CONFLICT,
            ApiError::Core(CoreError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Core(CoreError::Storage(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing text; store details stay in the server log.
    fn message(&self) -> String {
        match self {
            ApiError::Core(CoreError::Invalid(m)) | ApiError::Core(CoreError::Conflict(m)) => {
                (*m).to_string()
            }
            ApiError::Core(CoreError::NotFound(what)) => format!("{what} not found"),
            ApiError::Core(CoreError::Storage(_)) => "internal server error".to_string(),
            ApiError::Body(rej) => format!("malformed request body: {}", rej.body_text()),
            ApiError::Query(rej) => format!("invalid query string: {}", rej.body_text()),
            ApiError::Path(rej) => format!("invalid path: {}", rej.body_text()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(ErrorBody { error: self.message() })).into_response()
    }
}
