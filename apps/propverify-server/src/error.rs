//! Error types for the PropVerify server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use verification_engine::VerificationError;

/// Message returned for every downstream failure. The cause is only logged.
pub const ANALYSIS_FAILED_MESSAGE: &str =
    "Failed to analyze documents securely. The language model may be overloaded.";

/// Message returned when the request carries no documents text
pub const NO_DOCUMENTS_MESSAGE: &str = "No documents text provided";

/// Server error types
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Request body too large")]
    PayloadTooLarge,

    #[error("Analysis failed: {0}")]
    Analysis(#[from] VerificationError),
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ServerError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ServerError::PayloadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "Request body too large".to_string(),
            ),
            ServerError::Analysis(err) => {
                tracing::error!("Document analysis failed: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ANALYSIS_FAILED_MESSAGE.to_string(),
                )
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
