//! Authenticated-encryption envelope
//!
//! The three parts are hex-encoded and each one is required to open the
//! envelope again.

use serde::{Deserialize, Serialize};

/// Output of an AES-GCM seal: ciphertext, initialization vector and tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    /// Hex-encoded ciphertext (same length as the UTF-8 plaintext)
    pub ciphertext: String,
    /// Hex-encoded 96-bit IV
    pub iv: String,
    /// Hex-encoded 128-bit authentication tag
    pub auth_tag: String,
}
