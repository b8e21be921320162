//! Byte encodings for blobs stored in the key-value backend.
//!
//! Both the index and the records are UTF-8 JSON so that blobs written by
//! the web client and by this crate are interchangeable:
//!
//! ```text
//! association_keys      -> ["1700000000000-k3j9x0a", ...]
//! association_<id>      -> {"id":..,"platform":..,"brand":..,"score":..,
//!                           "data":<ciphertext>,"timestamp":<secs>,"owner":..}
//! ```
//!
//! Decoding is strict per blob. Callers decide how to degrade: a bad record
//! is skipped, a bad index is read as empty.

use serde::{Deserialize, Serialize};

use crate::{CodecError, Index, Record, RecordId};

/// On-the-wire shape of a record blob.
#[derive(Debug, Serialize, Deserialize)]
struct StoredRecord {
    /// Absent in blobs written by older clients, which key records by id only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    platform: String,
    brand: String,
    score: i32,
    data: String,
    timestamp: u64,
    #[serde(default)]
    owner: String,
}

/// Serialize a record to its stored bytes.
pub fn encode_record(record: &Record) -> Result<Vec<u8>, CodecError> {
    let stored = StoredRecord {
        id: Some(record.id.as_str().to_string()),
        platform: record.platform.clone(),
        brand: record.brand.clone(),
        score: record.score,
        data: record.ciphertext.clone(),
        timestamp: record.created_at,
        owner: record.owner.clone(),
    };
    serde_json::to_vec(&stored).map_err(CodecError::Serialization)
}

/// Deserialize a self-describing record blob.
///
/// Fails with [`CodecError::MissingId`] for blobs that do not carry their
/// own id; use [`decode_stored_record`] when the storage key is known.
pub fn decode_record(bytes: &[u8]) -> Result<Record, CodecError> {
    let stored = parse_record(bytes)?;
    let id = match stored.id.as_deref() {
        Some(raw) => RecordId::parse(raw)?,
        None => return Err(CodecError::MissingId),
    };
    Ok(into_record(id, stored))
}

/// Deserialize a record blob read from the key derived from `id`.
///
/// Blobs without an embedded id take `id`. A blob whose embedded id names
/// a different record is rejected.
pub fn decode_stored_record(id: &RecordId, bytes: &[u8]) -> Result<Record, CodecError> {
    let stored = parse_record(bytes)?;
    if let Some(found) = stored.id.as_deref() {
        if found != id.as_str() {
            return Err(CodecError::IdMismatch {
                expected: id.to_string(),
                found: found.to_string(),
            });
        }
    }
    Ok(into_record(id.clone(), stored))
}

/// Serialize the index manifest.
pub fn encode_index(index: &Index) -> Result<Vec<u8>, CodecError> {
    serde_json::to_vec(index).map_err(CodecError::Serialization)
}

/// Deserialize the index manifest.
///
/// An empty blob is the valid "no records yet" state. Entries that are not
/// valid ids (empty, whitespace, control characters) are dropped so they
/// never turn into storage keys; the remaining ids keep their order.
pub fn decode_index(bytes: &[u8]) -> Result<Index, CodecError> {
    if bytes.is_empty() {
        return Ok(Index::new());
    }
    let entries: Vec<String> =
        serde_json::from_slice(bytes).map_err(CodecError::Deserialization)?;
    Ok(entries
        .iter()
        .filter_map(|entry| RecordId::parse(entry).ok())
        .collect())
}

fn parse_record(bytes: &[u8]) -> Result<StoredRecord, CodecError> {
    if bytes.is_empty() {
        return Err(CodecError::Empty);
    }
    serde_json::from_slice(bytes).map_err(CodecError::Deserialization)
}

fn into_record(id: RecordId, stored: StoredRecord) -> Record {
    Record {
        id,
        platform: stored.platform,
        brand: stored.brand,
        score: stored.score,
        ciphertext: stored.data,
        created_at: stored.timestamp,
        owner: stored.owner,
    }
}
