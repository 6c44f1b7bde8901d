use thiserror::Error;

/// Envelope codec errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Tag did not verify: corrupted or tampered data, or the wrong key
    #[error("envelope authentication failed")]
    Authentication,

    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),

    #[error("decrypted payload is not valid UTF-8")]
    InvalidUtf8,

    #[error("cipher failure: {0}")]
    Cipher(String),
}
