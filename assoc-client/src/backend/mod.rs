//! Key-value backend abstraction for BrandAssoc.
//!
//! The backend is a flat namespace of byte blobs addressed by string keys
//! (a contract's `getData`/`setData`, a local file, memory for tests).
//!
//! # Design
//!
//! The backend trait is async and deliberately minimal:
//! - `is_available()` is a liveness probe
//! - `get()` returns empty bytes for an absent key
//! - `set()` overwrites a key and may be declined by the signing identity
//!
//! There is no listing, no batching and no atomicity across keys.

mod mock;

pub use mock::MockBackend;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Backend errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// The service reported itself unavailable.
    #[error("backend unavailable")]
    Unavailable,

    /// The signing identity declined the write.
    #[error("declined by signer: {0}")]
    Declined(String),

    /// Any other failure (network, rejected transaction, ...).
    #[error("backend request failed: {0}")]
    Failed(String),
}

/// Key-value backend storing opaque blobs.
#[async_trait]
pub trait KvBackend: Send + Sync {
    /// Liveness probe.
    async fn is_available(&self) -> Result<bool, BackendError>;

    /// Read the blob under `key`. Absent keys yield empty bytes.
    async fn get(&self, key: &str) -> Result<Vec<u8>, BackendError>;

    /// Overwrite the blob under `key`.
    async fn set(&self, key: &str, value: &[u8]) -> Result<(), BackendError>;
}

#[async_trait]
impl<B: KvBackend + ?Sized> KvBackend for Arc<B> {
    async fn is_available(&self) -> Result<bool, BackendError> {
        (**self).is_available().await
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, BackendError> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<(), BackendError> {
        (**self).set(key, value).await
    }
}
