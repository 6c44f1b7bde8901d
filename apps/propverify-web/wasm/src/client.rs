//! Browser client for the analysis endpoint
//!
//! `analyze_documents` performs the fetch. Building the request body and
//! turning a response into a report or a user-facing message are plain
//! functions so they run in native tests.

use serde::{Deserialize, Serialize};
use shared_types::VerificationResult;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, RequestMode, Response};

/// Shown when the server cannot be reached at all
pub const CONNECT_FAILED_MESSAGE: &str = "Failed to connect to the analysis server.";

/// Shown when the server rejects a request without saying why
pub const ANALYSIS_FAILED_FALLBACK: &str = "Failed to analyze documents";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeBody<'a> {
    documents_text: &'a str,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// Endpoint URL under `api_base`; an empty base means same origin
pub fn analyze_url(api_base: &str) -> String {
    format!("{}/api/analyze", api_base.trim_end_matches('/'))
}

pub fn request_body(documents_text: &str) -> String {
    // A struct holding one &str always serializes
    serde_json::to_string(&AnalyzeBody { documents_text }).unwrap_or_default()
}

/// Message for a non-success response: the server's `error` field if present
pub fn failure_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .filter(|e| !e.is_empty())
        .unwrap_or_else(|| ANALYSIS_FAILED_FALLBACK.to_string())
}

/// Interpret a response given its success flag and body text
pub fn interpret_response(ok: bool, body: &str) -> Result<VerificationResult, String> {
    if !ok {
        return Err(failure_message(body));
    }
    serde_json::from_str(body).map_err(|_| ANALYSIS_FAILED_FALLBACK.to_string())
}

/// POST the joined document text and return the parsed report.
///
/// Every failure is reduced to a message suitable for display.
pub async fn analyze_documents(
    api_base: &str,
    documents_text: &str,
) -> Result<VerificationResult, String> {
    let (ok, body) = post_json(&analyze_url(api_base), &request_body(documents_text))
        .await
        .map_err(|e| {
            web_sys::console::error_2(&"Error calling backend API:".into(), &e);
            CONNECT_FAILED_MESSAGE.to_string()
        })?;
    interpret_response(ok, &body)
}

async fn post_json(url: &str, body: &str) -> Result<(bool, String), JsValue> {
    let window = web_sys::window().ok_or("No window")?;

    let opts = RequestInit::new();
    opts.set_method("POST");
    opts.set_mode(RequestMode::Cors);
    opts.set_body(&JsValue::from_str(body));

    let request = Request::new_with_str_and_init(url, &opts)?;
    request.headers().set("Content-Type", "application/json")?;

    let response = JsFuture::from(window.fetch_with_request(&request)).await?;
    let response: Response = response.dyn_into()?;

    let text = JsFuture::from(response.text()?).await?;
    Ok((response.ok(), text.as_string().unwrap_or_default()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const REPORT: &str = r#"{"propertySummary":"ok","ownershipTimeline":[],"risks":[],"riskScore":10,"categoryScores":{"Legal":1,"Financial":1,"Structural":1,"Ownership":1},"legalStatus":"clear","surveyDetails":"n/a"}"#;

    #[test]
    fn test_analyze_url() {
        assert_eq!(analyze_url(""), "/api/analyze");
        assert_eq!(analyze_url("http://localhost:4000"), "http://localhost:4000/api/analyze");
        assert_eq!(analyze_url("http://localhost:4000/"), "http://localhost:4000/api/analyze");
    }

    #[test]
    fn test_request_body_uses_camel_case() {
        let text = "Deed\n\n\"quoted\"";
        let body: serde_json::Value = serde_json::from_str(&request_body(text)).unwrap();
        assert_eq!(body, serde_json::json!({ "documentsText": text }));
    }

    #[test]
    fn test_server_error_message_surfaces() {
        let body = r#"{"error":"No documents text provided"}"#;
        assert_eq!(
            interpret_response(false, body),
            Err("No documents text provided".to_string())
        );
    }

    #[test]
    fn test_unreadable_error_body_falls_back() {
        assert_eq!(failure_message("<html>502</html>"), ANALYSIS_FAILED_FALLBACK);
        assert_eq!(failure_message("{}"), ANALYSIS_FAILED_FALLBACK);
        assert_eq!(failure_message(r#"{"error":""}"#), ANALYSIS_FAILED_FALLBACK);
    }

    #[test]
    fn test_success_parses_report() {
        let report = interpret_response(true, REPORT).unwrap();
        assert_eq!(report.legal_status, "clear");
        assert_eq!(report.risk_score.value(), 10.0);
    }

    #[test]
    fn test_off_schema_report_is_accepted() {
        let body = r#"{"risks":[{"type":"legal","severity":"medium"}],"riskScore":"45","confidence":"high"}"#;
        let report = interpret_response(true, body).unwrap();
        assert_eq!(report.risk_score.value(), 45.0);
        assert_eq!(report.risks[0].severity, shared_types::RiskSeverity::Medium);
        assert_eq!(report.extra["confidence"], "high");
    }

    #[test]
    fn test_success_with_bad_body_is_error() {
        assert!(interpret_response(true, "not json").is_err());
    }
}
