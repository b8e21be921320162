//! # brandassoc-client
//!
//! Client library syncing BrandAssoc records over a flat key-value backend.
//!
//! The backend only offers `get`, `set` and `is_available` on string keys.
//! This crate builds a discoverable collection on top of it:
//!
//! ```text
//! association_keys        -> index blob (ordered record ids)
//! association_<id>        -> one record blob per id
//! ```
//!
//! ## Features
//!
//! - **Two-Phase Write**: record first, index second; a failure never leaves
//!   the index pointing at a missing record
//! - **Fail-Soft Reload**: corrupt or missing records are skipped, not fatal
//! - **Observable Status**: write lifecycle and refresh flag via `watch` channels
//! - **Backend Abstraction**: pluggable key-value backend (mock, file, ...)
//!
//! ## Example
//!
//! ```ignore
//! use brandassoc_client::{AddInput, MockBackend, SyncConfig, SyncEngine};
//!
//! let engine = SyncEngine::new(SyncConfig::default(), MockBackend::new());
//! engine.set_account("0xABC").await;
//!
//! engine.add(AddInput::new("Acme", "TV", 8)).await?;
//! let records = engine.reload().await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backend;
pub mod encrypt;
pub mod engine;
pub mod error;
mod status;
pub mod store;

pub use backend::{BackendError, KvBackend, MockBackend};
pub use encrypt::{
    EncryptError, Encryptor, EnvelopeEncryptor, SealedFields, SealedMeta, CIPHERTEXT_PREFIX,
};
pub use engine::{AddInput, SyncConfig, SyncEngine, KNOWN_PLATFORMS};
pub use error::{ClientError, WritePhase};
pub use store::{IndexStore, RecordStore, StoreError, DEFAULT_INDEX_KEY, DEFAULT_RECORD_PREFIX};

pub use brandassoc_core::{
    FailureKind, ResetDelays, Stats, Tab, TxFailure, TxStatus, PENDING_MESSAGE, SUCCESS_MESSAGE,
};
pub use brandassoc_types::{Index, Record, RecordId};
