//! API handlers for the PropVerify server
//!
//! Provides REST endpoints for:
//! - Document analysis
//! - Health checks
//!
//! and, when a static directory is configured, serves the built web UI with
//! a fallback to its `index.html` for client-side routes.

use std::path::Path;

use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::services::{ServeDir, ServeFile};
use tracing::{debug, info};
use verification_engine::ReportObject;

use crate::error::{ServerError, NO_DOCUMENTS_MESSAGE};
use crate::AppState;

/// Largest accepted request body (50 MiB)
pub const MAX_BODY_BYTES: usize = 50 * 1024 * 1024;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Handler: GET /health
pub async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "propverify-server",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Analyze request body
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    /// All document texts, joined with blank lines
    #[serde(default)]
    pub documents_text: Option<String>,
}

/// Handler: POST /api/analyze
///
/// A body that is not JSON, lacks `documentsText`, or carries an empty one
/// is a 400. Every failure after that is a 500 with a fixed message. On
/// success the body is the model's JSON object, unchanged.
pub async fn handle_analyze(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<ReportObject>, ServerError> {
    let Json(req) = payload.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ServerError::PayloadTooLarge
        } else {
            debug!("Rejected analyze body: {}", rejection.body_text());
            ServerError::BadRequest(NO_DOCUMENTS_MESSAGE.to_string())
        }
    })?;

    let documents_text = match req.documents_text {
        Some(text) if !text.is_empty() => text,
        _ => return Err(ServerError::BadRequest(NO_DOCUMENTS_MESSAGE.to_string())),
    };

    info!("Analyze request: {} bytes of document text", documents_text.len());

    let envelope = state.engine.seal_payload(documents_text)?;
    let report = state.engine.analyze_sealed(&envelope).await?;

    Ok(Json(report))
}

/// Build the application router (without rate limiting)
pub fn router(state: AppState, static_dir: Option<&Path>) -> Router {
    let api = Router::new()
        .route("/health", get(handle_health))
        .route("/api/analyze", post(handle_analyze))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state);

    match static_dir {
        Some(dir) => {
            let index = ServeFile::new(dir.join("index.html"));
            api.fallback_service(ServeDir::new(dir).fallback(index))
        }
        None => api,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_endpoint() {
        let response = handle_health().await;
        assert_eq!(response.status, "healthy");
        assert_eq!(response.service, "propverify-server");
    }

    #[test]
    fn test_request_field_is_camel_case() {
        let req: AnalyzeRequest =
            serde_json::from_str(r#"{"documentsText": "Deed 1995"}"#).unwrap();
        assert_eq!(req.documents_text.as_deref(), Some("Deed 1995"));

        let req: AnalyzeRequest = serde_json::from_str("{}").unwrap();
        assert!(req.documents_text.is_none());
    }
}
