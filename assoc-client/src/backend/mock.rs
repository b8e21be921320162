//! Mock backend for testing.
//!
//! Stores blobs in memory, records every write, and allows injecting
//! failures for the next read or write whose key matches a prefix.

use super::{BackendError, KvBackend};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

/// Mock backend for testing.
///
/// Clones share state, so a test can keep one handle while the engine owns
/// another.
#[derive(Debug, Clone)]
pub struct MockBackend {
    inner: Arc<Mutex<MockBackendInner>>,
}

#[derive(Debug)]
struct MockBackendInner {
    available: bool,
    blobs: HashMap<String, Vec<u8>>,
    set_log: Vec<String>,
    get_log: Vec<String>,
    fail_get: VecDeque<(String, BackendError)>,
    fail_set: VecDeque<(String, BackendError)>,
}

impl Default for MockBackendInner {
    fn default() -> Self {
        Self {
            available: true,
            blobs: HashMap::new(),
            set_log: Vec::new(),
            get_log: Vec::new(),
            fail_get: VecDeque::new(),
            fail_set: VecDeque::new(),
        }
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    /// Create an empty, available backend.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockBackendInner::default())),
        }
    }

    /// Seed a blob directly, bypassing the write log.
    pub fn insert(&self, key: &str, value: impl Into<Vec<u8>>) {
        let mut inner = self.inner.lock().unwrap();
        inner.blobs.insert(key.to_string(), value.into());
    }

    /// Get the blob stored under `key`, if any.
    pub fn value(&self, key: &str) -> Option<Vec<u8>> {
        let inner = self.inner.lock().unwrap();
        inner.blobs.get(key).cloned()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().blobs.len()
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().unwrap().blobs.is_empty()
    }

    /// Keys of every successful `set()`, in order.
    pub fn set_calls(&self) -> Vec<String> {
        self.inner.lock().unwrap().set_log.clone()
    }

    /// Keys of every `get()`, in order.
    pub fn get_calls(&self) -> Vec<String> {
        self.inner.lock().unwrap().get_log.clone()
    }

    /// Change what `is_available()` reports.
    pub fn set_available(&self, available: bool) {
        self.inner.lock().unwrap().available = available;
    }

    /// Cause the next `get()` whose key starts with `key_prefix` to fail.
    pub fn fail_next_get(&self, key_prefix: &str, error: BackendError) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_get.push_back((key_prefix.to_string(), error));
    }

    /// Cause the next `set()` whose key starts with `key_prefix` to fail.
    pub fn fail_next_set(&self, key_prefix: &str, error: BackendError) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_set.push_back((key_prefix.to_string(), error));
    }

    /// Clear all state (blobs, logs, injected failures) and mark available.
    pub fn reset(&self) {
        let mut inner = self.inner.lock().unwrap();
        *inner = MockBackendInner::default();
    }
}

fn take_failure(
    queue: &mut VecDeque<(String, BackendError)>,
    key: &str,
) -> Option<BackendError> {
    let pos = queue.iter().position(|(prefix, _)| key.starts_with(prefix))?;
    queue.remove(pos).map(|(_, error)| error)
}

#[async_trait]
impl KvBackend for MockBackend {
    async fn is_available(&self) -> Result<bool, BackendError> {
        Ok(self.inner.lock().unwrap().available)
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, BackendError> {
        let mut inner = self.inner.lock().unwrap();
        inner.get_log.push(key.to_string());

        // Check for forced failure
        if let Some(error) = take_failure(&mut inner.fail_get, key) {
            return Err(error);
        }

        Ok(inner.blobs.get(key).cloned().unwrap_or_default())
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<(), BackendError> {
        let mut inner = self.inner.lock().unwrap();

        // Check for forced failure
        if let Some(error) = take_failure(&mut inner.fail_set, key) {
            return Err(error);
        }

        inner.set_log.push(key.to_string());
        inner.blobs.insert(key.to_string(), value.to_vec());
        Ok(())
    }
}
