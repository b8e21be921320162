//! Index and record stores over a [`KvBackend`].
//!
//! [`IndexStore`] owns the one distinguished key holding the manifest of
//! record ids. [`RecordStore`] owns the per-record keys, derived as
//! `prefix + id`. Neither caches anything; every call goes to the backend.

use std::sync::Arc;

use brandassoc_types::{
    decode_index, decode_stored_record, encode_index, CodecError, Index, Record, RecordId,
};
use thiserror::Error;

use crate::backend::{BackendError, KvBackend};

/// Key holding the index blob.
pub const DEFAULT_INDEX_KEY: &str = "association_keys";

/// Prefix of every record key.
pub const DEFAULT_RECORD_PREFIX: &str = "association_";

/// Store-level errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backend error.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// Codec error.
    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Reads and appends the index manifest.
///
/// `append_index` is a plain read-modify-write with no locking: two
/// sessions appending concurrently can lose one of the ids (last writer
/// wins). Callers only rely on `read_index`/`append_index`, so a backend
/// with conditional writes can replace the body without touching them.
#[derive(Debug)]
pub struct IndexStore<B> {
    backend: Arc<B>,
    key: String,
}

impl<B: KvBackend> IndexStore<B> {
    /// Create an index store on `key`.
    pub fn new(backend: Arc<B>, key: &str) -> Self {
        Self {
            backend,
            key: key.to_string(),
        }
    }

    /// The index key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Read the current index.
    ///
    /// Absent means empty. An undecodable index is logged and read as empty.
    pub async fn read_index(&self) -> Result<Index, BackendError> {
        let bytes = self.backend.get(&self.key).await?;
        Ok(self.decode_or_empty(&bytes))
    }

    /// Append `id` if not already present and write the index back.
    ///
    /// Returns whether the id was added. Appending an existing id does not
    /// write.
    pub async fn append_index(&self, id: &RecordId) -> Result<bool, StoreError> {
        let mut index = self.read_index().await?;
        if !index.push_unique(id.clone()) {
            tracing::debug!("index already contains {}", id);
            return Ok(false);
        }

        let bytes = encode_index(&index)?;
        self.backend.set(&self.key, &bytes).await?;
        tracing::debug!("index {} now holds {} ids", self.key, index.len());
        Ok(true)
    }

    fn decode_or_empty(&self, bytes: &[u8]) -> Index {
        match decode_index(bytes) {
            Ok(index) => index,
            Err(e) => {
                tracing::warn!("index {} unreadable, treating as empty: {}", self.key, e);
                Index::new()
            }
        }
    }
}

/// Reads and writes individual record blobs.
#[derive(Debug)]
pub struct RecordStore<B> {
    backend: Arc<B>,
    prefix: String,
}

impl<B: KvBackend> RecordStore<B> {
    /// Create a record store deriving keys with `prefix`.
    pub fn new(backend: Arc<B>, prefix: &str) -> Self {
        Self {
            backend,
            prefix: prefix.to_string(),
        }
    }

    /// Storage key for `id`.
    pub fn record_key(&self, id: &RecordId) -> String {
        format!("{}{}", self.prefix, id)
    }

    /// Read the raw blob for `id` (empty if absent).
    pub async fn read_record(&self, id: &RecordId) -> Result<Vec<u8>, BackendError> {
        self.backend.get(&self.record_key(id)).await
    }

    /// Write the blob for `id`. Ids are unique, so there is no read first.
    pub async fn write_record(&self, id: &RecordId, bytes: &[u8]) -> Result<(), BackendError> {
        self.backend.set(&self.record_key(id), bytes).await
    }

    /// Read and decode the record for `id`; `None` if the key is absent.
    pub async fn load_record(&self, id: &RecordId) -> Result<Option<Record>, StoreError> {
        let bytes = self.read_record(id).await?;
        if bytes.is_empty() {
            return Ok(None);
        }
        Ok(Some(decode_stored_record(id, &bytes)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockBackend;
    use brandassoc_types::encode_record;

    fn id(s: &str) -> RecordId {
        RecordId::parse(s).unwrap()
    }

    fn stores(backend: &MockBackend) -> (IndexStore<MockBackend>, RecordStore<MockBackend>) {
        let shared = Arc::new(backend.clone());
        (
            IndexStore::new(Arc::clone(&shared), DEFAULT_INDEX_KEY),
            RecordStore::new(shared, DEFAULT_RECORD_PREFIX),
        )
    }

    // ===========================================
    // IndexStore Tests
    // ===========================================

    #[tokio::test]
    async fn absent_index_is_empty() {
        let backend = MockBackend::new();
        let (index, _) = stores(&backend);
        assert!(index.read_index().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn corrupt_index_is_empty() {
        let backend = MockBackend::new();
        backend.insert(DEFAULT_INDEX_KEY, b"{not an array".to_vec());
        let (index, _) = stores(&backend);
        assert!(index.read_index().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn invalid_index_entries_never_become_keys() {
        let backend = MockBackend::new();
        backend.insert(DEFAULT_INDEX_KEY, br#"["", "a b", "1-a"]"#.to_vec());
        let (index, records) = stores(&backend);

        for id in &index.read_index().await.unwrap() {
            records.load_record(id).await.unwrap();
        }

        assert_eq!(
            backend.get_calls(),
            vec![DEFAULT_INDEX_KEY.to_string(), "association_1-a".to_string()]
        );
    }

    #[tokio::test]
    async fn append_writes_back() {
        let backend = MockBackend::new();
        let (index, _) = stores(&backend);

        assert!(index.append_index(&id("1-a")).await.unwrap());
        assert!(index.append_index(&id("2-b")).await.unwrap());

        assert_eq!(
            backend.value(DEFAULT_INDEX_KEY).unwrap(),
            br#"["1-a","2-b"]"#.to_vec()
        );
    }

    #[tokio::test]
    async fn append_is_idempotent() {
        let backend = MockBackend::new();
        let (index, _) = stores(&backend);

        index.append_index(&id("1-a")).await.unwrap();
        assert!(!index.append_index(&id("1-a")).await.unwrap());

        let ids = index.read_index().await.unwrap();
        assert_eq!(ids.len(), 1);
        assert!(ids.contains(&id("1-a")));
        // The duplicate append did not write
        assert_eq!(backend.set_calls().len(), 1);
    }

    #[tokio::test]
    async fn append_over_corrupt_index_starts_fresh() {
        let backend = MockBackend::new();
        backend.insert(DEFAULT_INDEX_KEY, b"garbage".to_vec());
        let (index, _) = stores(&backend);

        index.append_index(&id("1-a")).await.unwrap();
        assert_eq!(index.read_index().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn append_propagates_write_failure() {
        let backend = MockBackend::new();
        backend.fail_next_set(DEFAULT_INDEX_KEY, BackendError::Failed("reverted".into()));
        let (index, _) = stores(&backend);

        let result = index.append_index(&id("1-a")).await;
        assert!(matches!(
            result,
            Err(StoreError::Backend(BackendError::Failed(_)))
        ));
        assert!(index.read_index().await.unwrap().is_empty());
    }

    // ===========================================
    // RecordStore Tests
    // ===========================================

    #[test]
    fn record_key_uses_prefix() {
        let backend = MockBackend::new();
        let (_, records) = stores(&backend);
        assert_eq!(records.record_key(&id("9-z")), "association_9-z");
    }

    #[tokio::test]
    async fn write_then_load() {
        let backend = MockBackend::new();
        let (_, records) = stores(&backend);
        let record = Record {
            id: id("5-e"),
            platform: "Print".into(),
            brand: "Globex".into(),
            score: 4,
            ciphertext: "FHE-x".into(),
            created_at: 5,
            owner: "0x1".into(),
        };

        records
            .write_record(&record.id, &encode_record(&record).unwrap())
            .await
            .unwrap();

        assert_eq!(records.load_record(&record.id).await.unwrap(), Some(record));
    }

    #[tokio::test]
    async fn load_missing_is_none() {
        let backend = MockBackend::new();
        let (_, records) = stores(&backend);
        assert_eq!(records.load_record(&id("1-a")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn load_corrupt_is_codec_error() {
        let backend = MockBackend::new();
        backend.insert("association_1-a", b"\x00\x01".to_vec());
        let (_, records) = stores(&backend);
        assert!(matches!(
            records.load_record(&id("1-a")).await,
            Err(StoreError::Codec(_))
        ));
    }
}
