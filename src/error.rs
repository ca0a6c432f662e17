use axum::{
    Json,
    extract::multipart::{MultipartError, MultipartRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::types::ErrorBody;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Failed to get file from request: missing `image` field")]
    MissingImage,
    #[error("Uploaded image is empty")]
    EmptyImage,
    /// Malformed or oversized multipart body; `status` is the one axum reports.
    #[error("Failed to read multipart body: {message}")]
    Multipart { status: StatusCode, message: String },
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingImage | ApiError::EmptyImage => StatusCode::BAD_REQUEST,
            ApiError::Multipart { status, .. } => *status,
        }
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        ApiError::Multipart {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        ApiError::Multipart {
            status: err.status(),
            message: err.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.to_string(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}
