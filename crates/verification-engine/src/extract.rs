//! Pull the JSON report out of free-form model output
//!
//! The model is asked for JSON only but routinely wraps it in prose or code
//! fences. The report is taken to be everything from the first `{` to the
//! last `}` inclusive. Text containing more than one object therefore
//! selects a span that is not valid JSON and fails; that is the intended
//! behavior, not something to work around here.
//!
//! The span only has to parse as a JSON object. Its shape is not checked;
//! the object is handed back exactly as the model wrote it.

use serde_json::{Map, Value};

use crate::error::{Result, VerificationError};

/// A report as emitted by the model: any JSON object
pub type ReportObject = Map<String, Value>;

/// The inclusive span from the first `{` to the last `}`
pub fn extract_json_span(raw: &str) -> Result<&str> {
    let start = raw
        .find('{')
        .ok_or_else(|| VerificationError::MalformedResponse("no opening brace".into()))?;
    let end = raw
        .rfind('}')
        .ok_or_else(|| VerificationError::MalformedResponse("no closing brace".into()))?;

    if end < start {
        return Err(VerificationError::MalformedResponse(
            "closing brace precedes opening brace".into(),
        ));
    }

    Ok(&raw[start..=end])
}

/// Parse the model output into a report object; any failure rejects the whole output
pub fn extract_report(raw: &str) -> Result<ReportObject> {
    let span = extract_json_span(raw)?;
    serde_json::from_str(span).map_err(|e| VerificationError::MalformedResponse(e.to_string()))
}
