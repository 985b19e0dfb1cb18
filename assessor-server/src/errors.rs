//! HTTP error responses

use assessor_storage::StorageError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Errors a handler can answer with
#[derive(Error, Debug)]
pub enum ApiError {
    /// Readiness probe failure: `{"status":"not ready","error":..}`
    #[error("not ready: {0}")]
    NotReady(String),

    /// Storage operation failed; the message is passed through unchanged
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Result type for handlers
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotReady(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Storage(StorageError::NotConnected) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match self {
            ApiError::NotReady(error) => json!({
                "status": "not ready",
                "error": error,
            }),
            ApiError::Storage(e) => json!({
                "status": "error",
                "message": e.to_string(),
            }),
        };
        (status, Json(body)).into_response()
    }
}
