//! Request-boundary error mapping.
//!
//! The pipeline propagates typed errors; this module is the only place
//! they are turned into HTTP responses. Compress-path failures of every
//! kind surface as 400 with the original system's detail shape; a stats
//! read failure is the one server-side error, surfaced as 500.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use webpress_core::CompressError;

/// Errors a request handler can surface to the client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Upload missing, empty, or not decodable as an image.
    #[error("{0}")]
    InvalidInput(String),

    /// Normalization or transcoding failed.
    #[error("{0}")]
    Encoding(String),

    /// The stats write failed after a successful transcode.
    #[error("{0}")]
    Persistence(String),

    /// The stats listing could not be read.
    #[error("{0}")]
    StatsUnavailable(String),
}

impl From<CompressError> for ApiError {
    fn from(err: CompressError) -> Self {
        match err {
            CompressError::InvalidInput(reason) => ApiError::InvalidInput(reason),
            CompressError::Encoding(reason) => ApiError::Encoding(reason),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::StatsUnavailable(reason) => {
                tracing::error!(%reason, "failed to read compression stats");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "detail": format!("Error reading stats: {reason}") })),
                )
                    .into_response()
            }
            other => {
                tracing::error!(reason = %other, "error compressing image");
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "detail": format!("Error processing image: {other}") })),
                )
                    .into_response()
            }
        }
    }
}
