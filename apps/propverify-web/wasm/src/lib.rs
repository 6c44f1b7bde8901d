//! WASM bindings for the PropVerify web UI
//!
//! All session state lives in Rust. JavaScript only handles DOM events,
//! file reads and rendering.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { PropVerifySession, analyzeDocuments } from './pkg/propverify_wasm.js';
//!
//! await init();
//!
//! const session = new PropVerifySession();
//! const id = session.addDocument(file.name, file.type, file.size);
//! session.beginExtraction(id);
//! session.completeExtraction(id, new Uint8Array(await file.arrayBuffer()));
//!
//! if (session.canVerify()) {
//!   const { token, documentsText } = session.beginVerification();
//!   try {
//!     session.completeVerification(token, await analyzeDocuments("", documentsText));
//!   } catch (message) {
//!     session.failVerification(token, String(message));
//!   }
//! }
//! ```

pub mod client;
pub mod session;

use serde::Serialize;
use shared_types::{AcceptedFileType, RiskBand, VerificationResult};
use wasm_bindgen::prelude::*;

pub use session::{PendingVerification, SessionError, UploadSession};

/// Initialize the WASM module
/// Called automatically by wasm-bindgen
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Get the library version
#[wasm_bindgen]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// `accept` attribute for the file input
#[wasm_bindgen(js_name = acceptAttribute)]
pub fn accept_attribute() -> String {
    AcceptedFileType::ALL
        .iter()
        .map(|t| format!(".{}", t.extension()))
        .collect::<Vec<_>>()
        .join(",")
}

#[wasm_bindgen(js_name = isAcceptedFile)]
pub fn is_accepted_file(name: &str, mime_type: &str) -> bool {
    AcceptedFileType::from_name_or_mime(name, mime_type).is_some()
}

/// Gauge label for a risk score: "Safe", "Caution" or "High Risk"
#[wasm_bindgen(js_name = riskBandLabel)]
pub fn risk_band_label(score: f64) -> String {
    RiskBand::from_score(score).label().to_string()
}

/// POST document text to `{apiBase}/api/analyze`.
///
/// Resolves to the report object, rejects with a display message.
#[wasm_bindgen(js_name = analyzeDocuments)]
pub async fn analyze_documents(
    api_base: String,
    documents_text: String,
) -> Result<JsValue, JsValue> {
    let report = client::analyze_documents(&api_base, &documents_text)
        .await
        .map_err(|msg| JsValue::from_str(&msg))?;
    to_js(&report)
}

/// Maps (including flattened report fields) become plain objects
fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

fn js_err(e: SessionError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Verification session exposed to JavaScript
#[wasm_bindgen]
pub struct PropVerifySession {
    inner: UploadSession,
}

#[wasm_bindgen]
impl PropVerifySession {
    /// New session with a random per-session sealing key
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            inner: UploadSession::new(),
        }
    }

    /// New session sealing under a key derived from `passphrase`
    #[wasm_bindgen(js_name = withPassphrase)]
    pub fn with_passphrase(passphrase: &str) -> Self {
        Self {
            inner: UploadSession::with_passphrase(passphrase),
        }
    }

    #[wasm_bindgen(js_name = addDocument)]
    pub fn add_document(&mut self, name: &str, mime_type: &str, size_bytes: f64) -> String {
        self.inner.add_document(name, mime_type, size_bytes.max(0.0) as u64)
    }

    #[wasm_bindgen(js_name = removeDocument)]
    pub fn remove_document(&mut self, id: &str) -> Result<(), JsValue> {
        self.inner.remove_document(id).map_err(js_err)
    }

    #[wasm_bindgen(js_name = beginExtraction)]
    pub fn begin_extraction(&mut self, id: &str) -> Result<(), JsValue> {
        self.inner.begin_extraction(id).map_err(js_err)
    }

    #[wasm_bindgen(js_name = completeExtraction)]
    pub fn complete_extraction(&mut self, id: &str, bytes: &[u8]) -> Result<(), JsValue> {
        self.inner.complete_extraction(id, bytes).map_err(js_err)
    }

    #[wasm_bindgen(js_name = failExtraction)]
    pub fn fail_extraction(&mut self, id: &str) -> Result<(), JsValue> {
        self.inner.fail_extraction(id).map_err(js_err)
    }

    /// Sealed `{ciphertext, iv, authTag}` copy of a document's text
    #[wasm_bindgen(js_name = getSealedContent)]
    pub fn get_sealed_content(&self, id: &str) -> Result<JsValue, JsValue> {
        let envelope = self.inner.sealed_content(id).map_err(js_err)?;
        to_js(envelope)
    }

    #[wasm_bindgen(js_name = canVerify)]
    pub fn can_verify(&self) -> bool {
        self.inner.can_verify()
    }

    /// Mark a request in flight; returns `{token, documentsText}`
    #[wasm_bindgen(js_name = beginVerification)]
    pub fn begin_verification(&mut self) -> Result<JsValue, JsValue> {
        let pending = self.inner.begin_verification().map_err(js_err)?;
        to_js(&pending)
    }

    /// Store the report for request `token`.
    ///
    /// Returns false when the request was abandoned by `reset`.
    #[wasm_bindgen(js_name = completeVerification)]
    pub fn complete_verification(
        &mut self,
        token: u32,
        report: JsValue,
    ) -> Result<bool, JsValue> {
        match serde_wasm_bindgen::from_value::<VerificationResult>(report) {
            Ok(result) => Ok(self.inner.finish_verification(token, Ok(result))),
            Err(e) => {
                let message = client::ANALYSIS_FAILED_FALLBACK.to_string();
                self.inner.finish_verification(token, Err(message));
                Err(JsValue::from_str(&format!("Invalid report: {}", e)))
            }
        }
    }

    /// Record a failure for request `token`; false when it was abandoned
    #[wasm_bindgen(js_name = failVerification)]
    pub fn fail_verification(&mut self, token: u32, message: String) -> bool {
        self.inner.finish_verification(token, Err(message))
    }

    pub fn reset(&mut self) {
        self.inner.reset();
    }

    #[wasm_bindgen(getter, js_name = isProcessing)]
    pub fn is_processing(&self) -> bool {
        self.inner.is_processing()
    }

    #[wasm_bindgen(getter)]
    pub fn error(&self) -> Option<String> {
        self.inner.error().map(str::to_string)
    }

    #[wasm_bindgen(getter, js_name = documentCount)]
    pub fn document_count(&self) -> usize {
        self.inner.documents().len()
    }

    #[wasm_bindgen(js_name = getDocuments)]
    pub fn get_documents(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.documents())
    }

    /// Current report, or `null`
    #[wasm_bindgen(js_name = getResult)]
    pub fn get_result(&self) -> Result<JsValue, JsValue> {
        match self.inner.result() {
            Some(result) => to_js(result),
            None => Ok(JsValue::NULL),
        }
    }

    /// Gauge label for the current report, if any
    #[wasm_bindgen(js_name = getRiskBand)]
    pub fn get_risk_band(&self) -> Option<String> {
        self.inner
            .result()
            .map(|r| r.risk_band().label().to_string())
    }
}

impl Default for PropVerifySession {
    fn default() -> Self {
        Self::new()
    }
}
