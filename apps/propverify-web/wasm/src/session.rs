//! Upload session state
//!
//! Holds the uploaded documents, the current report and the in-flight flag
//! for one page session. Nothing here touches the DOM, so it is exercised
//! directly in native tests; `lib.rs` wraps it for JavaScript.
//!
//! Extraction results are matched back to documents by the id assigned at
//! upload time. Two files with the same name are two documents.

use rand_core::{OsRng, RngCore};
use serde::Serialize;
use shared_crypto::{EnvelopeCodec, KEY_LEN};
use shared_types::{join_readable_text, Document, DocumentStatus, Envelope, VerificationResult};
use thiserror::Error;

/// Shown when no uploaded document produced any text
pub const NO_READABLE_CONTENT_MESSAGE: &str = "No readable content found in documents.";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Unknown document: {0}")]
    UnknownDocument(String),

    #[error("A verification request is already in flight")]
    InFlight,

    #[error("No readable content found in documents.")]
    NoReadableContent,

    #[error("Document {0} has no sealed content")]
    NotSealed(String),

    #[error("Sealed content could not be opened: {0}")]
    Envelope(String),
}

/// A started verification request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingVerification {
    /// Pass back to `finish_verification`; outcomes with a stale token are dropped
    pub token: u32,
    pub documents_text: String,
}

/// In-memory state of one verification session
pub struct UploadSession {
    documents: Vec<Document>,
    result: Option<VerificationResult>,
    error: Option<String>,
    in_flight: bool,
    /// Bumped by every `begin_verification` and `reset`
    generation: u32,
    codec: EnvelopeCodec,
}

impl UploadSession {
    /// New session sealing under a random key that never leaves this session
    pub fn new() -> Self {
        let mut key = [0u8; KEY_LEN];
        OsRng.fill_bytes(&mut key);
        Self::with_codec(EnvelopeCodec::from_key(key))
    }

    pub fn with_passphrase(passphrase: &str) -> Self {
        Self::with_codec(EnvelopeCodec::from_passphrase(passphrase))
    }

    fn with_codec(codec: EnvelopeCodec) -> Self {
        Self {
            documents: Vec::new(),
            result: None,
            error: None,
            in_flight: false,
            generation: 0,
            codec,
        }
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn document(&self, id: &str) -> Option<&Document> {
        self.documents.iter().find(|d| d.id == id)
    }

    pub fn result(&self) -> Option<&VerificationResult> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_processing(&self) -> bool {
        self.in_flight
    }

    /// Register an uploaded file; returns its id
    pub fn add_document(&mut self, name: &str, mime_type: &str, size_bytes: u64) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        self.documents
            .push(Document::new(id.clone(), name, mime_type, size_bytes));
        id
    }

    pub fn remove_document(&mut self, id: &str) -> Result<(), SessionError> {
        let index = self.index_of(id)?;
        self.documents.remove(index);
        Ok(())
    }

    /// A read for `id` has started
    pub fn begin_extraction(&mut self, id: &str) -> Result<(), SessionError> {
        let doc = self.document_mut(id)?;
        doc.status = DocumentStatus::Processing;
        Ok(())
    }

    /// Store the text read for `id` and seal it.
    ///
    /// Bytes are decoded as UTF-8 with replacement characters, the way a
    /// browser text read does.
    pub fn complete_extraction(&mut self, id: &str, bytes: &[u8]) -> Result<(), SessionError> {
        let index = self.index_of(id)?;
        let text = String::from_utf8_lossy(bytes).into_owned();
        let sealed = self.codec.seal(&text);

        let doc = &mut self.documents[index];
        match sealed {
            Ok(envelope) => {
                doc.text_content = Some(text);
                doc.envelope = Some(envelope);
                doc.status = DocumentStatus::Completed;
            }
            Err(_) => {
                doc.status = DocumentStatus::Error;
            }
        }
        Ok(())
    }

    /// The read for `id` failed
    pub fn fail_extraction(&mut self, id: &str) -> Result<(), SessionError> {
        let doc = self.document_mut(id)?;
        doc.status = DocumentStatus::Error;
        Ok(())
    }

    pub fn sealed_content(&self, id: &str) -> Result<&Envelope, SessionError> {
        let doc = self
            .document(id)
            .ok_or_else(|| SessionError::UnknownDocument(id.to_string()))?;
        doc.envelope
            .as_ref()
            .ok_or_else(|| SessionError::NotSealed(id.to_string()))
    }

    /// Open the sealed copy of a document's text
    pub fn open_sealed(&self, id: &str) -> Result<String, SessionError> {
        let envelope = self.sealed_content(id)?;
        self.codec
            .open(envelope)
            .map_err(|e| SessionError::Envelope(e.to_string()))
    }

    /// At least one document has text and nothing is in flight
    pub fn can_verify(&self) -> bool {
        !self.in_flight && self.documents.iter().any(|d| d.readable_text().is_some())
    }

    /// Start a verification request; returns the text to send and its token.
    ///
    /// Clears the previous error. Fails without changing the in-flight flag
    /// when a request is already running or there is no text.
    pub fn begin_verification(&mut self) -> Result<PendingVerification, SessionError> {
        if self.in_flight {
            return Err(SessionError::InFlight);
        }
        self.error = None;

        let text = join_readable_text(&self.documents);
        if text.is_empty() {
            self.error = Some(NO_READABLE_CONTENT_MESSAGE.to_string());
            return Err(SessionError::NoReadableContent);
        }

        self.in_flight = true;
        self.generation = self.generation.wrapping_add(1);
        Ok(PendingVerification {
            token: self.generation,
            documents_text: text,
        })
    }

    /// Record the outcome of the request holding `token`.
    ///
    /// Returns false and changes nothing when the token is not the current
    /// request's, e.g. a request that outlived a `reset`.
    pub fn finish_verification(
        &mut self,
        token: u32,
        outcome: Result<VerificationResult, String>,
    ) -> bool {
        if !self.in_flight || token != self.generation {
            return false;
        }
        self.in_flight = false;
        match outcome {
            Ok(result) => {
                self.result = Some(result);
                self.error = None;
            }
            Err(message) => {
                self.error = Some(message);
            }
        }
        true
    }

    /// Drop every document, the result and any error.
    ///
    /// A request still running is abandoned: its outcome will be ignored.
    pub fn reset(&mut self) {
        self.documents.clear();
        self.result = None;
        self.error = None;
        self.in_flight = false;
        self.generation = self.generation.wrapping_add(1);
    }

    fn index_of(&self, id: &str) -> Result<usize, SessionError> {
        self.documents
            .iter()
            .position(|d| d.id == id)
            .ok_or_else(|| SessionError::UnknownDocument(id.to_string()))
    }

    fn document_mut(&mut self, id: &str) -> Result<&mut Document, SessionError> {
        let index = self.index_of(id)?;
        Ok(&mut self.documents[index])
    }
}

impl Default for UploadSession {
    fn default() -> Self {
        Self::new()
    }
}
