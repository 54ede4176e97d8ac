use crate::core::error::AppError;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

/// Error returned by every HTTP handler, rendered as `{error, message[, details]}`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Rejected before any pipeline work started.
    #[error("{error}: {message}")]
    BadRequest { error: &'static str, message: String },

    #[error("Request exceeded the {0:?} deadline")]
    DeadlineExceeded(Duration),

    /// A pipeline failure. `debug` controls whether internals reach the response body.
    #[error("{source}")]
    Pipeline {
        #[source]
        source: AppError,
        debug: bool,
    },
}

impl ApiError {
    pub fn bad_request(error: &'static str, message: impl Into<String>) -> Self {
        ApiError::BadRequest {
            error,
            message: message.into(),
        }
    }

    pub fn pipeline(source: AppError, debug: bool) -> Self {
        ApiError::Pipeline { source, debug }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message, details) = match self {
            ApiError::BadRequest { error, message } => (StatusCode::BAD_REQUEST, error, message, None),
            ApiError::DeadlineExceeded(deadline) => {
                tracing::warn!("Request abandoned after {:?}", deadline);
                (
                    StatusCode::GATEWAY_TIMEOUT,
                    "Request timed out",
                    format!(
                        "The request did not finish within {} seconds. Please try again later.",
                        deadline.as_secs()
                    ),
                    None,
                )
            }
            ApiError::Pipeline { source, debug } => match &source {
                e if e.is_client_error() => (StatusCode::BAD_REQUEST, "Invalid input", e.to_string(), None),
                AppError::SearchNotConfigured => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Search not configured",
                    "Search API credentials are missing. Set GOOGLE_CUSTOM_SEARCH_API_KEY and GOOGLE_CUSTOM_SEARCH_ENGINE_ID."
                        .to_string(),
                    None,
                ),
                e => {
                    tracing::error!("Request failed: {e}");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Internal error",
                        "An error occurred while processing the request. Please try again later.".to_string(),
                        debug.then(|| e.to_string()),
                    )
                }
            },
        };

        let mut body = json!({
            "error": error,
            "message": message,
        });
        if let Some(details) = details {
            body["details"] = json!(details);
        }

        (status, Json(body)).into_response()
    }
}
