//! # brandassoc-types
//!
//! Data model and blob codecs for BrandAssoc key-value sync.
//!
//! This crate provides the foundational types used across all BrandAssoc crates:
//! - [`RecordId`] - Time-based record identifier
//! - [`Record`] - One brand-association entry
//! - [`Index`] - Ordered manifest of record identifiers
//! - [`codec`] - Byte encodings stored in the key-value backend
//! - [`CodecError`] - Error types

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod codec;
mod error;
mod ids;
mod record;

pub use codec::{decode_index, decode_record, decode_stored_record, encode_index, encode_record};
pub use error::CodecError;
pub use ids::RecordId;
pub use record::{Index, Record, HIGH_SCORE_THRESHOLD, LOW_SCORE_THRESHOLD};
