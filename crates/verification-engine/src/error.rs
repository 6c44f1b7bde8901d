use shared_crypto::CryptoError;
use thiserror::Error;

/// Failures while producing a verification report.
///
/// None of these messages are meant for end users; the HTTP layer logs
/// them and answers with a fixed message.
#[derive(Error, Debug)]
pub enum VerificationError {
    #[error("no readable document text")]
    EmptyInput,

    #[error("payload envelope failed authentication")]
    Authentication,

    #[error("payload envelope error: {0}")]
    Envelope(String),

    #[error("malformed model response: {0}")]
    MalformedResponse(String),

    #[error("LLM service error: {0}")]
    Upstream(String),

    #[error("LLM service did not answer within {0}ms")]
    UpstreamTimeout(u64),
}

impl From<CryptoError> for VerificationError {
    fn from(err: CryptoError) -> Self {
        match err {
            CryptoError::Authentication => VerificationError::Authentication,
            other => VerificationError::Envelope(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, VerificationError>;
