//! Property document verification
//!
//! Turns concatenated document text into a report object:
//!
//! 1. the text is sealed into an envelope as soon as it is received
//! 2. the envelope is opened only inside [`VerificationEngine::analyze`]
//! 3. the prompt is built and sent to the [`LlmCollaborator`] under a deadline
//! 4. the report object is extracted from the raw output and returned as is
//!
//! The envelope never leaves the process and is keyed by a server secret, so
//! it gives no confidentiality against this process; it only keeps the raw
//! request text from being held in plaintext between ingress and analysis.

pub mod collaborator;
pub mod error;
pub mod extract;
pub mod prompt;

use std::sync::Arc;
use std::time::Duration;

use shared_crypto::EnvelopeCodec;
use shared_types::{Envelope, VerificationResult};
use tracing::{debug, info, warn};

pub use collaborator::{LlmCollaborator, OllamaClient, DEFAULT_MODEL, DEFAULT_OLLAMA_URL};
pub use error::{Result, VerificationError};
pub use extract::{extract_json_span, extract_report, ReportObject};
pub use prompt::build_prompt;

/// Default deadline for one collaborator call
pub const DEFAULT_LLM_TIMEOUT_MS: u64 = 120_000;

/// Verification pipeline entry point
pub struct VerificationEngine {
    codec: EnvelopeCodec,
    collaborator: Arc<dyn LlmCollaborator>,
    timeout: Duration,
}

impl VerificationEngine {
    pub fn new(codec: EnvelopeCodec, collaborator: Arc<dyn LlmCollaborator>) -> Self {
        Self {
            codec,
            collaborator,
            timeout: Duration::from_millis(DEFAULT_LLM_TIMEOUT_MS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Seal received text; the plaintext is dropped here
    pub fn seal_payload(&self, documents_text: String) -> Result<Envelope> {
        if documents_text.is_empty() {
            return Err(VerificationError::EmptyInput);
        }
        let envelope = self.codec.seal(&documents_text)?;
        drop(documents_text);
        Ok(envelope)
    }

    /// Open a sealed payload and produce the verification report
    pub async fn analyze_sealed(&self, envelope: &Envelope) -> Result<ReportObject> {
        let prompt = {
            let documents_text = self.codec.open(envelope)?;
            build_prompt(&documents_text)?
        };

        let timeout_ms = self.timeout.as_millis() as u64;
        let raw = tokio::time::timeout(self.timeout, self.collaborator.generate(&prompt))
            .await
            .map_err(|_| VerificationError::UpstreamTimeout(timeout_ms))??;

        debug!("Collaborator returned {} bytes", raw.len());

        let report = extract_report(&raw)?;
        match VerificationResult::from_object(&report) {
            Ok(view) => info!(
                "Verification report: risk_score={}, risks={}, timeline_events={}",
                view.risk_score.value(),
                view.risks.len(),
                view.ownership_timeline.len()
            ),
            Err(e) => warn!("Verification report does not follow the schema: {}", e),
        }
        Ok(report)
    }

    /// Seal then analyze in one step
    pub async fn analyze(&self, documents_text: String) -> Result<ReportObject> {
        let envelope = self.seal_payload(documents_text)?;
        self.analyze_sealed(&envelope).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    const REPORT: &str = r#"{"propertySummary":"ok","ownershipTimeline":[],"risks":[],"riskScore":10,"categoryScores":{"Legal":1,"Financial":1,"Structural":1,"Ownership":1},"legalStatus":"clear","surveyDetails":"n/a"}"#;

    /// Collaborator stub that records prompts and replies with fixed text
    struct Scripted {
        reply: String,
        delay: Option<Duration>,
        calls: AtomicUsize,
        prompts: Mutex<Vec<String>>,
    }

    impl Scripted {
        fn replying(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: reply.to_string(),
                delay: None,
                calls: AtomicUsize::new(0),
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn slow(delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                reply: REPORT.to_string(),
                delay: Some(delay),
                calls: AtomicUsize::new(0),
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait::async_trait]
    impl LlmCollaborator for Scripted {
        async fn generate(&self, prompt: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().unwrap().push(prompt.to_string());
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            Ok(self.reply.clone())
        }
    }

    fn engine(stub: Arc<Scripted>) -> VerificationEngine {
        VerificationEngine::new(EnvelopeCodec::from_passphrase("test-secret"), stub)
    }

    #[tokio::test]
    async fn test_analyze_returns_parsed_report() {
        let stub = Scripted::replying(REPORT);
        let report = engine(stub.clone())
            .analyze("Deed 1995\n\nSurvey 2020".to_string())
            .await
            .unwrap();

        assert_eq!(report["propertySummary"], "ok");
        assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
        let prompts = stub.prompts.lock().unwrap();
        assert!(prompts[0].contains("Deed 1995\n\nSurvey 2020"));
    }

    #[tokio::test]
    async fn test_empty_text_never_calls_collaborator() {
        let stub = Scripted::replying(REPORT);
        let result = engine(stub.clone()).analyze(String::new()).await;
        assert!(matches!(result, Err(VerificationError::EmptyInput)));
        assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_whitespace_text_never_calls_collaborator() {
        let stub = Scripted::replying(REPORT);
        let result = engine(stub.clone()).analyze("  \n ".to_string()).await;
        assert!(matches!(result, Err(VerificationError::EmptyInput)));
        assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_tampered_envelope_is_authentication_error() {
        let stub = Scripted::replying(REPORT);
        let engine = engine(stub.clone());
        let mut envelope = engine.seal_payload("Deed".to_string()).unwrap();
        envelope.ciphertext = "00000000".to_string();

        let result = engine.analyze_sealed(&envelope).await;
        assert!(matches!(result, Err(VerificationError::Authentication)));
        assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unparseable_output_is_malformed() {
        let stub = Scripted::replying("I could not read those documents.");
        let result = engine(stub).analyze("Deed".to_string()).await;
        assert!(matches!(result, Err(VerificationError::MalformedResponse(_))));
    }

    #[tokio::test]
    async fn test_off_schema_report_is_passed_through() {
        let reply = r#"{"risks":[{"type":"Legal","severity":"medium"}],"riskScore":"45","confidence":"high"}"#;
        let report = engine(Scripted::replying(reply))
            .analyze("Deed".to_string())
            .await
            .unwrap();

        let expected: serde_json::Value = serde_json::from_str(reply).unwrap();
        assert_eq!(serde_json::Value::Object(report), expected);
    }

    #[tokio::test]
    async fn test_slow_collaborator_times_out() {
        let stub = Scripted::slow(Duration::from_millis(500));
        let engine = engine(stub).with_timeout(Duration::from_millis(20));
        let result = engine.analyze("Deed".to_string()).await;
        assert!(matches!(result, Err(VerificationError::UpstreamTimeout(20))));
    }
}
