//! SyncEngine - the main interface for BrandAssoc.
//!
//! This module provides [`SyncEngine`], which turns a flat key-value
//! backend into a browsable collection of records.
//!
//! # Architecture
//!
//! ```text
//! Application → SyncEngine → IndexStore / RecordStore → KvBackend
//!                   ↓
//!              brandassoc-core (views, status machine)
//! ```
//!
//! # Protocols
//!
//! **Reload** reads the index, fetches every record it names, skips the
//! ones that are missing or undecodable, sorts newest first and swaps the
//! result in as the new collection.
//!
//! **Add** writes the record blob first and appends its id to the index
//! second. A failed record write leaves the backend as it was; a failed
//! index append leaves an orphaned record that no reload will show.
//!
//! # Example
//!
//! ```ignore
//! use brandassoc_client::{AddInput, MockBackend, SyncConfig, SyncEngine, Tab};
//!
//! let engine = SyncEngine::new(SyncConfig::default(), MockBackend::new());
//! engine.set_account("0xABC").await;
//! engine.add(AddInput::new("Acme", "TV", 8).with_notes("prime time")).await?;
//!
//! let strong = engine.filtered("acme", Tab::High);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use brandassoc_core::{
    filter, stats, ResetDelays, StatusEvent, Stats, Tab, TxStatus, PENDING_MESSAGE,
    SUCCESS_MESSAGE,
};
use brandassoc_types::{encode_record, Record, RecordId};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::backend::KvBackend;
use crate::encrypt::{Encryptor, EnvelopeEncryptor, SealedFields, SealedMeta};
use crate::error::ClientError;
use crate::status::StatusDriver;
use crate::store::{IndexStore, RecordStore, DEFAULT_INDEX_KEY, DEFAULT_RECORD_PREFIX};

/// Platforms offered by the entry form. Platform stays free-form.
pub const KNOWN_PLATFORMS: [&str; 5] = ["Social Media", "TV", "Print", "Outdoor", "Digital"];

/// Configuration for SyncEngine.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Key holding the index blob.
    pub index_key: String,
    /// Prefix of record keys.
    pub record_prefix: String,
    /// How long a finished write stays visible before returning to idle.
    pub reset_delays: ResetDelays,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            index_key: DEFAULT_INDEX_KEY.to_string(),
            record_prefix: DEFAULT_RECORD_PREFIX.to_string(),
            reset_delays: ResetDelays::default(),
        }
    }
}

impl SyncConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the index key.
    pub fn with_index_key(mut self, key: &str) -> Self {
        self.index_key = key.to_string();
        self
    }

    /// Set the record key prefix.
    pub fn with_record_prefix(mut self, prefix: &str) -> Self {
        self.record_prefix = prefix.to_string();
        self
    }

    /// Set the status reset delays.
    pub fn with_reset_delays(mut self, delays: ResetDelays) -> Self {
        self.reset_delays = delays;
        self
    }
}

/// User input for a new record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddInput {
    /// Brand name (required).
    pub brand: String,
    /// Platform (required).
    pub platform: String,
    /// Association score, 1-10 by convention.
    pub score: i32,
    /// Free-text notes, only ever stored encrypted.
    pub notes: String,
}

impl AddInput {
    /// Create input without notes.
    pub fn new(brand: &str, platform: &str, score: i32) -> Self {
        Self {
            brand: brand.to_string(),
            platform: platform.to_string(),
            score,
            notes: String::new(),
        }
    }

    /// Attach notes.
    pub fn with_notes(mut self, notes: &str) -> Self {
        self.notes = notes.to_string();
        self
    }

    /// Brand and platform must be non-blank.
    pub fn validate(&self) -> Result<(), ClientError> {
        if self.brand.trim().is_empty() || self.platform.trim().is_empty() {
            return Err(ClientError::InvalidInput(
                "Please fill required fields".to_string(),
            ));
        }
        Ok(())
    }

    fn sealed_fields(&self) -> SealedFields {
        SealedFields {
            notes: self.notes.clone(),
            meta: SealedMeta {
                platform: self.platform.clone(),
                brand: self.brand.clone(),
            },
        }
    }
}

/// Clears the refreshing flag when dropped.
struct RefreshGuard<'a>(&'a watch::Sender<bool>);

impl<'a> RefreshGuard<'a> {
    /// Set the flag; `None` if it was already set.
    fn acquire(flag: &'a watch::Sender<bool>) -> Option<Self> {
        let claimed = flag.send_if_modified(|refreshing| {
            if *refreshing {
                false
            } else {
                *refreshing = true;
                true
            }
        });
        claimed.then_some(Self(flag))
    }
}

impl Drop for RefreshGuard<'_> {
    fn drop(&mut self) {
        self.0.send_replace(false);
    }
}

/// The main sync engine.
///
/// Owns the synchronized collection, the refreshing flag, the current
/// account and the write status. All of them are observable through
/// `watch` receivers.
pub struct SyncEngine<B, E = EnvelopeEncryptor> {
    config: SyncConfig,
    backend: Arc<B>,
    encryptor: E,
    index: IndexStore<B>,
    records: RecordStore<B>,
    account: watch::Sender<String>,
    collection: watch::Sender<Arc<Vec<Record>>>,
    refreshing: watch::Sender<bool>,
    /// Bumped on every account change; a reload only publishes if the
    /// epoch it started under is still current.
    epoch: AtomicU64,
    status: Arc<StatusDriver>,
}

impl<B: KvBackend> SyncEngine<B, EnvelopeEncryptor> {
    /// Create a new SyncEngine with the stand-in encryptor.
    pub fn new(config: SyncConfig, backend: B) -> Self {
        Self::with_encryptor(config, backend, EnvelopeEncryptor)
    }
}

impl<B: KvBackend, E: Encryptor> SyncEngine<B, E> {
    /// Create a new SyncEngine with a custom encryption collaborator.
    pub fn with_encryptor(config: SyncConfig, backend: B, encryptor: E) -> Self {
        let backend = Arc::new(backend);
        let index = IndexStore::new(Arc::clone(&backend), &config.index_key);
        let records = RecordStore::new(Arc::clone(&backend), &config.record_prefix);
        let status = StatusDriver::new(config.reset_delays);
        let (account, _) = watch::channel(String::new());
        let (collection, _) = watch::channel(Arc::new(Vec::new()));
        let (refreshing, _) = watch::channel(false);

        Self {
            config,
            backend,
            encryptor,
            index,
            records,
            account,
            collection,
            refreshing,
            epoch: AtomicU64::new(0),
            status,
        }
    }

    // ===========================================
    // Session
    // ===========================================

    /// The bound account (empty when unauthenticated).
    pub fn account(&self) -> String {
        self.account.borrow().clone()
    }

    /// Whether an account is bound.
    pub fn is_authenticated(&self) -> bool {
        !self.account.borrow().is_empty()
    }

    /// Bind a new account (empty string to sign out).
    ///
    /// A change drops the cached collection and any finished write status,
    /// and stops reloads started under the previous account from
    /// publishing. It does not reload.
    pub async fn set_account(&self, account: &str) {
        let changed = self.account.send_if_modified(|current| {
            if current.as_str() == account {
                false
            } else {
                *current = account.to_string();
                true
            }
        });
        if !changed {
            return;
        }

        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.collection.send_replace(Arc::new(Vec::new()));
        self.status.apply(StatusEvent::Cleared).await;
        tracing::debug!("account changed, session state reset");
    }

    /// Subscribe to account changes.
    pub fn subscribe_account(&self) -> watch::Receiver<String> {
        self.account.subscribe()
    }

    /// Follow an identity provider's account channel until it closes.
    pub fn watch_account(self: &Arc<Self>, mut accounts: watch::Receiver<String>) -> JoinHandle<()>
    where
        B: 'static,
        E: 'static,
    {
        let engine = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                let account = accounts.borrow_and_update().clone();
                engine.set_account(&account).await;
                if accounts.changed().await.is_err() {
                    break;
                }
            }
        })
    }

    // ===========================================
    // Reload
    // ===========================================

    /// Rebuild the collection from the backend.
    ///
    /// Returns the new collection. If a reload is already running this is
    /// a no-op returning the current collection. Missing or corrupt
    /// records are logged and left out; only an unavailable backend or a
    /// failed index read is an error, and then the previous collection
    /// stays in place.
    pub async fn reload(&self) -> Result<Arc<Vec<Record>>, ClientError> {
        let Some(guard) = RefreshGuard::acquire(&self.refreshing) else {
            tracing::debug!("refresh already in progress, ignoring");
            return Ok(self.collection());
        };
        self.reload_holding(guard).await
    }

    /// Reload after any running refresh has finished.
    ///
    /// A refresh already in flight may have read the index before the
    /// latest write, so its result cannot stand in for a fresh pass.
    async fn reload_fresh(&self) -> Result<Arc<Vec<Record>>, ClientError> {
        loop {
            if let Some(guard) = RefreshGuard::acquire(&self.refreshing) {
                return self.reload_holding(guard).await;
            }
            tracing::debug!("waiting for running refresh before reloading");
            let mut refreshing = self.refreshing.subscribe();
            let _ = refreshing.wait_for(|busy| !*busy).await;
        }
    }

    async fn reload_holding(
        &self,
        _guard: RefreshGuard<'_>,
    ) -> Result<Arc<Vec<Record>>, ClientError> {
        let epoch = self.epoch.load(Ordering::SeqCst);

        self.ensure_available().await?;

        let ids = self.index.read_index().await?;
        tracing::debug!("reloading {} records", ids.len());

        let mut records = Vec::with_capacity(ids.len());
        for id in &ids {
            match self.records.load_record(id).await {
                Ok(Some(record)) => records.push(record),
                Ok(None) => tracing::warn!("record {} is indexed but missing, skipping", id),
                Err(e) => tracing::warn!("record {} unreadable, skipping: {}", id, e),
            }
        }

        // Stable: equal timestamps keep index order
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let collection = Arc::new(records);

        if self.epoch.load(Ordering::SeqCst) != epoch {
            tracing::debug!("account changed during reload, discarding result");
            return Ok(self.collection());
        }

        self.collection.send_replace(Arc::clone(&collection));
        Ok(collection)
    }

    /// Whether a reload is running.
    pub fn is_refreshing(&self) -> bool {
        *self.refreshing.borrow()
    }

    /// Subscribe to the refreshing flag.
    pub fn subscribe_refreshing(&self) -> watch::Receiver<bool> {
        self.refreshing.subscribe()
    }

    /// The current collection, newest first.
    pub fn collection(&self) -> Arc<Vec<Record>> {
        self.collection.borrow().clone()
    }

    /// Subscribe to collection replacements.
    pub fn subscribe_collection(&self) -> watch::Receiver<Arc<Vec<Record>>> {
        self.collection.subscribe()
    }

    /// Records of the current collection matching `search_term` and `tab`.
    pub fn filtered(&self, search_term: &str, tab: Tab) -> Vec<Record> {
        let collection = self.collection();
        filter(&collection, search_term, tab)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Statistics over the current (unfiltered) collection.
    pub fn stats(&self) -> Stats {
        stats(&self.collection())
    }

    // ===========================================
    // Add
    // ===========================================

    /// Create a record owned by the bound account.
    ///
    /// Runs the two-phase write and, on success, reloads the collection
    /// (waiting out any refresh already running). The success display delay
    /// starts once that reload returns. Rejected with [`ClientError::NotAuthenticated`],
    /// [`ClientError::InvalidInput`] or [`ClientError::Busy`] before any
    /// I/O. Every other failure also lands in the write status as
    /// `Failed`; nothing is retried.
    pub async fn add(&self, input: AddInput) -> Result<Record, ClientError> {
        let owner = self.account();
        if owner.is_empty() {
            return Err(ClientError::NotAuthenticated);
        }
        input.validate()?;

        let Some(generation) = self.status.try_submit(PENDING_MESSAGE).await else {
            tracing::debug!("add rejected: a write is already pending");
            return Err(ClientError::Busy);
        };

        match self.write(owner, input).await {
            Ok(record) => {
                tracing::info!("stored and indexed record {}", record.id);
                self.status
                    .apply(StatusEvent::Completed {
                        message: SUCCESS_MESSAGE.to_string(),
                    })
                    .await;
                if let Err(e) = self.reload_fresh().await {
                    tracing::warn!("reload after write failed: {}", e);
                }
                self.status.apply(StatusEvent::Settled { generation }).await;
                Ok(record)
            }
            Err(err) => {
                match err.orphan() {
                    Some(id) => tracing::error!(
                        orphan_id = %id,
                        "record {} written but not indexed: {}",
                        self.records.record_key(id),
                        err
                    ),
                    None => tracing::warn!("write failed, index untouched: {}", err),
                }
                self.status
                    .apply(StatusEvent::Failed {
                        failure: err.to_failure(),
                    })
                    .await;
                Err(err)
            }
        }
    }

    async fn write(&self, owner: String, input: AddInput) -> Result<Record, ClientError> {
        self.ensure_available().await?;

        let ciphertext = self.encryptor.encrypt(&input.sealed_fields()).await?;
        let record = Record {
            id: RecordId::generate(),
            platform: input.platform,
            brand: input.brand,
            score: input.score,
            ciphertext,
            created_at: unix_now(),
            owner,
        };
        let bytes = encode_record(&record)?;

        // Phase 1: the record. Nothing references it yet.
        self.records
            .write_record(&record.id, &bytes)
            .await
            .map_err(ClientError::record_phase)?;

        // Phase 2: the index. Failing here orphans the record.
        self.index
            .append_index(&record.id)
            .await
            .map_err(|e| ClientError::index_phase(record.id.clone(), e))?;

        Ok(record)
    }

    /// Current write status.
    pub fn status(&self) -> TxStatus {
        self.status.current()
    }

    /// Subscribe to write status transitions.
    pub fn subscribe_status(&self) -> watch::Receiver<TxStatus> {
        self.status.subscribe()
    }

    // ===========================================
    // Backend
    // ===========================================

    /// Probe the backend's liveness.
    pub async fn check_availability(&self) -> Result<bool, ClientError> {
        Ok(self.backend.is_available().await?)
    }

    async fn ensure_available(&self) -> Result<(), ClientError> {
        if self.check_availability().await? {
            Ok(())
        } else {
            Err(ClientError::Unavailable)
        }
    }

    /// The index store (for diagnostics and tests).
    pub fn index_store(&self) -> &IndexStore<B> {
        &self.index
    }

    /// The record store (for diagnostics and tests).
    pub fn record_store(&self) -> &RecordStore<B> {
        &self.records
    }

    /// The underlying backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The engine configuration.
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
