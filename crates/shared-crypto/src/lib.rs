//! Shared cryptography utilities
//!
//! This crate provides the authenticated-encryption envelope used on both
//! sides of PropVerify: the browser session seals extracted document text
//! and the server seals request payloads on receipt.

pub mod codec;
pub mod error;

pub use codec::{derive_key, EnvelopeCodec, IV_LEN, KEY_LEN, TAG_LEN};
pub use error::CryptoError;
