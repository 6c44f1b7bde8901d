//! AES-256-GCM envelope codec
//!
//! Keys are derived by hashing a passphrase with SHA-256. This is a
//! convenience derivation with no salt or stretching; a guessable passphrase
//! yields a guessable key.
//!
//! Every [`EnvelopeCodec::seal`] draws a fresh 96-bit IV from the OS RNG and
//! returns the ciphertext, IV and detached tag hex-encoded. No associated
//! data is bound.

use aes_gcm::{
    aead::{AeadInPlace, KeyInit, Tag},
    Aes256Gcm, Nonce,
};
use rand_core::{OsRng, RngCore};
use sha2::{Digest, Sha256};
use shared_types::Envelope;
use zeroize::Zeroizing;

use crate::error::CryptoError;

/// AES-256 key length in bytes
pub const KEY_LEN: usize = 32;
/// GCM IV length in bytes (96 bits)
pub const IV_LEN: usize = 12;
/// GCM tag length in bytes
pub const TAG_LEN: usize = 16;

/// SHA-256 of the passphrase, used directly as the AES-256 key
pub fn derive_key(passphrase: &str) -> [u8; KEY_LEN] {
    let digest = Sha256::digest(passphrase.as_bytes());
    let mut key = [0u8; KEY_LEN];
    key.copy_from_slice(&digest);
    key
}

/// Seals and opens envelopes under a single derived key
pub struct EnvelopeCodec {
    key: Zeroizing<[u8; KEY_LEN]>,
}

impl EnvelopeCodec {
    pub fn from_passphrase(passphrase: &str) -> Self {
        Self::from_key(derive_key(passphrase))
    }

    pub fn from_key(key: [u8; KEY_LEN]) -> Self {
        Self {
            key: Zeroizing::new(key),
        }
    }

    fn cipher(&self) -> Result<Aes256Gcm, CryptoError> {
        Aes256Gcm::new_from_slice(self.key.as_slice())
            .map_err(|e| CryptoError::Cipher(e.to_string()))
    }

    /// Encrypt `plaintext` under a fresh random IV
    pub fn seal(&self, plaintext: &str) -> Result<Envelope, CryptoError> {
        let mut iv = [0u8; IV_LEN];
        OsRng.fill_bytes(&mut iv);
        self.seal_with_iv(plaintext, iv)
    }

    fn seal_with_iv(&self, plaintext: &str, iv: [u8; IV_LEN]) -> Result<Envelope, CryptoError> {
        let cipher = self.cipher()?;
        let mut buf = plaintext.as_bytes().to_vec();
        let tag = cipher
            .encrypt_in_place_detached(Nonce::from_slice(&iv), b"", &mut buf)
            .map_err(|e| CryptoError::Cipher(e.to_string()))?;

        Ok(Envelope {
            ciphertext: hex::encode(&buf),
            iv: hex::encode(iv),
            auth_tag: hex::encode(tag.as_slice()),
        })
    }

    /// Verify and decrypt an envelope produced by this codec's key.
    ///
    /// On tag failure nothing of the plaintext is returned.
    pub fn open(&self, envelope: &Envelope) -> Result<String, CryptoError> {
        let iv = decode_part("iv", &envelope.iv, Some(IV_LEN))?;
        let tag = decode_part("authTag", &envelope.auth_tag, Some(TAG_LEN))?;
        let mut buf = decode_part("ciphertext", &envelope.ciphertext, None)?;

        let cipher = self.cipher()?;
        cipher
            .decrypt_in_place_detached(
                Nonce::from_slice(&iv),
                b"",
                &mut buf,
                Tag::<Aes256Gcm>::from_slice(&tag),
            )
            .map_err(|_| CryptoError::Authentication)?;

        String::from_utf8(buf).map_err(|_| CryptoError::InvalidUtf8)
    }
}

impl std::fmt::Debug for EnvelopeCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvelopeCodec")
            .field("key", &"<redacted>")
            .finish()
    }
}

fn decode_part(
    field: &str,
    value: &str,
    expected_len: Option<usize>,
) -> Result<Vec<u8>, CryptoError> {
    let bytes = hex::decode(value)
        .map_err(|e| CryptoError::MalformedEnvelope(format!("{} is not valid hex: {}", field, e)))?;

    if let Some(len) = expected_len {
        if bytes.len() != len {
            return Err(CryptoError::MalformedEnvelope(format!(
                "{} must be {} bytes, got {}",
                field,
                len,
                bytes.len()
            )));
        }
    }

    Ok(bytes)
}
