//! Encryption collaborator for record payloads.
//!
//! The client never decrypts: it hands the free-text fields to an
//! [`Encryptor`] and stores whatever opaque string comes back.
//!
//! [`EnvelopeEncryptor`] is the stand-in used until a homomorphic
//! encryption service is wired in. It only base64-wraps a JSON envelope
//! and offers no confidentiality.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::Serialize;
use thiserror::Error;

/// Prefix marking ciphertext produced by [`EnvelopeEncryptor`].
pub const CIPHERTEXT_PREFIX: &str = "FHE-";

/// Encryption failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct EncryptError(pub String);

/// Plaintext handed to the encryption collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SealedFields {
    /// Free-text notes.
    pub notes: String,
    /// Classification copied into the ciphertext.
    pub meta: SealedMeta,
}

/// Classification fields embedded in [`SealedFields`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SealedMeta {
    /// Platform name.
    pub platform: String,
    /// Brand name.
    pub brand: String,
}

/// Turns plaintext fields into an opaque ciphertext string.
#[async_trait]
pub trait Encryptor: Send + Sync {
    /// Encrypt `fields`.
    async fn encrypt(&self, fields: &SealedFields) -> Result<String, EncryptError>;
}

/// Stand-in encryptor: `FHE-` + base64(JSON(fields)).
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvelopeEncryptor;

#[async_trait]
impl Encryptor for EnvelopeEncryptor {
    async fn encrypt(&self, fields: &SealedFields) -> Result<String, EncryptError> {
        let json = serde_json::to_vec(fields).map_err(|e| EncryptError(e.to_string()))?;
        Ok(format!("{CIPHERTEXT_PREFIX}{}", STANDARD.encode(json)))
    }
}
