//! Error types for BrandAssoc blob codecs.

use thiserror::Error;

/// Errors that can occur while encoding or decoding stored blobs.
#[derive(Debug, Error)]
pub enum CodecError {
    /// JSON serialization failed
    #[error("serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),

    /// JSON deserialization failed
    #[error("deserialization failed: {0}")]
    Deserialization(#[source] serde_json::Error),

    /// The blob was empty where a value was required
    #[error("empty blob")]
    Empty,

    /// The record blob carries no identifier and none was supplied
    #[error("record has no id")]
    MissingId,

    /// The record blob names a different id than the key it was stored under
    #[error("record id mismatch: stored under {expected}, blob says {found}")]
    IdMismatch {
        /// Id derived from the storage key.
        expected: String,
        /// Id found inside the blob.
        found: String,
    },

    /// Identifier is not usable as a storage key suffix
    #[error("invalid record id: {0:?}")]
    InvalidId(String),
}
