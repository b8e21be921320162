//! File-backed key-value store.
//!
//! Keeps every key in one JSON object (`key -> base64(value)`), rewritten
//! through a temp file and rename on each `set`.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use brandassoc_client::{BackendError, KvBackend};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

use crate::config::set_file_permissions_0600;

/// Key-value backend persisted to a single JSON file.
#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileBackend {
    /// Open the store at `path`. The file is created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Path of the store file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn directory(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    async fn load(&self) -> Result<BTreeMap<String, String>, BackendError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => serde_json::from_str(&contents).map_err(|e| {
                BackendError::Failed(format!("{} is corrupt: {}", self.path.display(), e))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(BackendError::Failed(e.to_string())),
        }
    }

    async fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), BackendError> {
        let contents =
            serde_json::to_vec_pretty(entries).map_err(|e| BackendError::Failed(e.to_string()))?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, contents)
            .await
            .map_err(|e| BackendError::Failed(e.to_string()))?;
        set_file_permissions_0600(&tmp)
            .await
            .map_err(|e| BackendError::Failed(e.to_string()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| BackendError::Failed(e.to_string()))
    }
}

#[async_trait]
impl KvBackend for FileBackend {
    async fn is_available(&self) -> Result<bool, BackendError> {
        Ok(tokio::fs::metadata(self.directory())
            .await
            .map(|meta| meta.is_dir())
            .unwrap_or(false))
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, BackendError> {
        let entries = self.load().await?;
        match entries.get(key) {
            Some(encoded) => STANDARD
                .decode(encoded)
                .map_err(|e| BackendError::Failed(format!("value of {key} is not base64: {e}"))),
            None => Ok(Vec::new()),
        }
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<(), BackendError> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.load().await?;
        entries.insert(key.to_string(), STANDARD.encode(value));
        self.persist(&entries).await?;
        tracing::debug!("stored {} bytes under {}", value.len(), key);
        Ok(())
    }
}
