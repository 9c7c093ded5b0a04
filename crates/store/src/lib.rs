//! # UIPM Store
//!
//! Durable, versioned persistence for the named pattern library and its
//! rename history.
//!
//! ## Core Features
//!
//! - **Pluggable Backends**: storage goes through the [`StoreBackend`] trait.
//!   Out of the box it provides:
//!   - An in-memory backend for tests and ephemeral use.
//!   - A JSON file backend (`backend-file` feature, on by default) that
//!     rewrites one pretty-printed document per mutation.
//! - **Schema-checked loads**: a document that is not valid JSON or fails the
//!   [`PatternStore`] schema is never partially trusted. It is logged and
//!   replaced with an empty store.
//! - **Read cache**: [`PatternRepository`] keeps the last loaded or written
//!   snapshot in memory until [`PatternRepository::invalidate_cache`].
//! - **Serialized writes**: every read-modify-write runs under the
//!   repository's write lock, so concurrent upserts never lose an update.
//!
//! ## Example Usage
//!
//! ```
//! use features::{LayoutMode, PositionZone, StructureFeatures};
//! use store::{BackendConfig, PatternRepository, UpsertPatternRequest};
//!
//! let repo = PatternRepository::new(&BackendConfig::in_memory()).unwrap();
//! let structure = StructureFeatures::new(
//!     vec!["INSTANCE".into(), "TEXT".into()],
//!     LayoutMode::Horizontal,
//!     160.0,
//!     40.0,
//!     PositionZone::Bottom,
//! );
//!
//! let created = repo.upsert_pattern(UpsertPatternRequest::new("Button/Primary", structure.clone())).unwrap();
//! let updated = repo.upsert_pattern(UpsertPatternRequest::new("Button/Primary", structure)).unwrap();
//!
//! assert_eq!(created.id, updated.id);
//! assert_eq!(updated.usage_count, 2);
//! assert_eq!(repo.get_all_patterns().unwrap().len(), 1);
//! ```

mod backend;
mod types;

pub use backend::{BackendConfig, InMemoryBackend, StoreBackend};
#[cfg(feature = "backend-file")]
pub use backend::JsonFileBackend;
pub use types::{
    Pattern, PatternHistory, PatternStore, StoreStats, UpsertPatternRequest,
    STORE_SCHEMA_VERSION,
};

use chrono::Utc;
use features::{validate_name, ValidationError};
use std::path::Path;
use std::sync::{Arc, Mutex, RwLock};
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Errors surfaced by the store.
///
/// Corrupt documents are not errors: they are recovered inside
/// [`PatternRepository::load_store`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("pattern name already in use: {0}")]
    NameConflict(String),
    #[error("backend error: {0}")]
    Backend(String),
    #[error("io error: {0}")]
    Io(String),
    #[error("serialization error: {0}")]
    Serialize(String),
}

impl StoreError {
    pub fn backend<E: std::fmt::Display>(err: E) -> Self {
        Self::Backend(err.to_string())
    }

    pub(crate) fn io(path: &Path, err: std::io::Error) -> Self {
        Self::Io(format!("{}: {err}", path.display()))
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialize(e.to_string())
    }
}

/// Owned repository over one pattern library document.
pub struct PatternRepository {
    backend: Box<dyn StoreBackend>,
    /// Last successfully loaded or written snapshot.
    cache: RwLock<Option<Arc<PatternStore>>>,
    /// Held across every read-modify-write and cache fill.
    write_lock: Mutex<()>,
}

impl PatternRepository {
    /// Build the backend from `cfg`. Nothing is read until first access.
    pub fn new(cfg: &BackendConfig) -> Result<Self, StoreError> {
        Ok(Self::with_backend(cfg.build()?))
    }

    /// Build a repository around a custom backend (dependency injection).
    pub fn with_backend(backend: Box<dyn StoreBackend>) -> Self {
        Self {
            backend,
            cache: RwLock::new(None),
            write_lock: Mutex::new(()),
        }
    }

    /// Return the cached store, loading (and if needed creating or
    /// resetting) the backing document on first access.
    pub fn load_store(&self) -> Result<Arc<PatternStore>, StoreError> {
        if let Some(store) = self.cached()? {
            return Ok(store);
        }
        let _guard = self.lock_writes()?;
        self.snapshot_locked()
    }

    /// Drop the in-memory snapshot; the next access re-reads the backend.
    pub fn invalidate_cache(&self) {
        let mut guard = self
            .cache
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = None;
        debug!(backend = %self.backend.describe(), "pattern store cache invalidated");
    }

    pub fn get_all_patterns(&self) -> Result<Vec<Pattern>, StoreError> {
        Ok(self.load_store()?.patterns.clone())
    }

    pub fn get_pattern_by_id(&self, id: &str) -> Result<Option<Pattern>, StoreError> {
        let store = self.load_store()?;
        Ok(store.patterns.iter().find(|p| p.id == id).cloned())
    }

    pub fn get_pattern_by_name(&self, name: &str) -> Result<Option<Pattern>, StoreError> {
        let store = self.load_store()?;
        Ok(store.patterns.iter().find(|p| p.name == name).cloned())
    }

    /// Most recently used first.
    pub fn get_recent_patterns(&self, limit: usize) -> Result<Vec<Pattern>, StoreError> {
        let mut patterns = self.get_all_patterns()?;
        patterns.sort_by(|a, b| b.last_used_at.cmp(&a.last_used_at));
        patterns.truncate(limit);
        Ok(patterns)
    }

    /// Most used first.
    pub fn get_frequent_patterns(&self, limit: usize) -> Result<Vec<Pattern>, StoreError> {
        let mut patterns = self.get_all_patterns()?;
        patterns.sort_by(|a, b| b.usage_count.cmp(&a.usage_count));
        patterns.truncate(limit);
        Ok(patterns)
    }

    /// Create a pattern for a new name or update the one already holding it.
    ///
    /// On update the structure is replaced, `usageCount` incremented and
    /// `lastUsedAt` bumped; provenance fields are only overwritten when the
    /// request supplies them. Invalid input fails before anything is written.
    pub fn upsert_pattern(&self, request: UpsertPatternRequest) -> Result<Pattern, StoreError> {
        request.validate()?;

        self.mutate(|store| {
            let now = Utc::now();
            let pattern = match store.position_by_name(&request.name) {
                Some(idx) => {
                    let mut updated = store.patterns[idx].clone();
                    updated.structure = request.structure;
                    updated.touch(now);
                    if request.source_node_id.is_some() {
                        updated.source_node_id = request.source_node_id;
                    }
                    if request.source_file_key.is_some() {
                        updated.source_file_key = request.source_file_key;
                    }
                    updated.validate()?;
                    store.patterns[idx] = updated.clone();
                    info!(
                        name = %updated.name,
                        usage_count = updated.usage_count,
                        "updated pattern"
                    );
                    updated
                }
                None => {
                    let created = Pattern::create(request, now);
                    created.validate()?;
                    store.patterns.push(created.clone());
                    info!(name = %created.name, id = %created.id, "created pattern");
                    created
                }
            };
            Ok(pattern)
        })
    }

    /// Remove a pattern. Returns whether anything was deleted.
    pub fn delete_pattern(&self, id: &str) -> Result<bool, StoreError> {
        self.mutate_if(|store| match store.position_by_id(id) {
            Some(idx) => {
                let removed = store.patterns.remove(idx);
                info!(id, name = %removed.name, "deleted pattern");
                Ok(Some(true))
            }
            None => Ok(None),
        })
        .map(|deleted| deleted.unwrap_or(false))
    }

    /// Bump `usageCount` and `lastUsedAt` for an existing pattern.
    pub fn record_pattern_usage(&self, id: &str) -> Result<Option<Pattern>, StoreError> {
        self.mutate_if(|store| {
            let Some(idx) = store.position_by_id(id) else {
                return Ok(None);
            };
            let pattern = &mut store.patterns[idx];
            pattern.touch(Utc::now());
            debug!(name = %pattern.name, usage_count = pattern.usage_count, "recorded pattern usage");
            Ok(Some(pattern.clone()))
        })
    }

    /// Rename a pattern, appending a history entry.
    ///
    /// A blank name is a validation error. Taking over the name of another
    /// live pattern fails with [`StoreError::NameConflict`].
    pub fn rename_pattern(&self, id: &str, new_name: &str) -> Result<Option<Pattern>, StoreError> {
        validate_name("name", new_name)?;

        self.mutate_if(|store| {
            let Some(idx) = store.position_by_id(id) else {
                return Ok(None);
            };
            if let Some(other) = store.position_by_name(new_name) {
                if other != idx {
                    return Err(StoreError::NameConflict(new_name.to_string()));
                }
            }

            let now = Utc::now();
            let from_name = store.patterns[idx].name.clone();
            store.history.push(PatternHistory {
                pattern_id: id.to_string(),
                from_name: from_name.clone(),
                to_name: new_name.to_string(),
                changed_at: now,
            });

            let pattern = &mut store.patterns[idx];
            pattern.name = new_name.to_string();
            pattern.last_used_at = now;
            info!(id, from = %from_name, to = new_name, "renamed pattern");
            Ok(Some(pattern.clone()))
        })
    }

    /// Most recent rename first.
    pub fn get_history(&self, limit: usize) -> Result<Vec<PatternHistory>, StoreError> {
        let store = self.load_store()?;
        // Reverse first so equal timestamps keep newest-first after the stable sort.
        let mut history: Vec<PatternHistory> = store.history.iter().rev().cloned().collect();
        history.sort_by(|a, b| b.changed_at.cmp(&a.changed_at));
        history.truncate(limit);
        Ok(history)
    }

    /// Empty patterns and history, keeping the schema version.
    pub fn reset(&self) -> Result<(), StoreError> {
        self.mutate(|store| {
            let stats = store.stats();
            *store = PatternStore::empty();
            warn!(
                patterns = stats.pattern_count,
                history = stats.history_count,
                "pattern store reset"
            );
            Ok(())
        })
    }

    pub fn stats(&self) -> Result<StoreStats, StoreError> {
        Ok(self.load_store()?.stats())
    }

    fn cached(&self) -> Result<Option<Arc<PatternStore>>, StoreError> {
        let guard = self
            .cache
            .read()
            .map_err(|_| StoreError::backend("poisoned lock"))?;
        Ok(guard.clone())
    }

    fn lock_writes(&self) -> Result<std::sync::MutexGuard<'_, ()>, StoreError> {
        self.write_lock
            .lock()
            .map_err(|_| StoreError::backend("poisoned lock"))
    }

    /// Current snapshot; caller must hold the write lock.
    fn snapshot_locked(&self) -> Result<Arc<PatternStore>, StoreError> {
        if let Some(store) = self.cached()? {
            return Ok(store);
        }
        let store = Arc::new(self.read_or_init()?);
        self.replace_cache(store.clone())?;
        Ok(store)
    }

    fn read_or_init(&self) -> Result<PatternStore, StoreError> {
        let Some(bytes) = self.backend.read()? else {
            info!(backend = %self.backend.describe(), "creating empty pattern store");
            let store = PatternStore::empty();
            self.persist(&store)?;
            return Ok(store);
        };

        let parsed = serde_json::from_slice::<PatternStore>(&bytes)
            .map_err(|e| e.to_string())
            .and_then(|store| store.validate().map(|_| store).map_err(|e| e.to_string()));

        match parsed {
            Ok(store) => {
                debug!(
                    backend = %self.backend.describe(),
                    patterns = store.patterns.len(),
                    "loaded pattern store"
                );
                Ok(store)
            }
            Err(reason) => {
                error!(
                    backend = %self.backend.describe(),
                    %reason,
                    "invalid pattern store document, resetting"
                );
                let store = PatternStore::empty();
                self.persist(&store)?;
                Ok(store)
            }
        }
    }

    fn persist(&self, store: &PatternStore) -> Result<(), StoreError> {
        let document = serde_json::to_vec_pretty(store)?;
        self.backend.write(&document)
    }

    fn replace_cache(&self, store: Arc<PatternStore>) -> Result<(), StoreError> {
        *self
            .cache
            .write()
            .map_err(|_| StoreError::backend("poisoned lock"))? = Some(store);
        Ok(())
    }

    /// Run `op` on a private copy of the store and persist it.
    fn mutate<T>(
        &self,
        op: impl FnOnce(&mut PatternStore) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let _guard = self.lock_writes()?;
        let mut working = (*self.snapshot_locked()?).clone();
        let out = op(&mut working)?;
        self.commit(working)?;
        Ok(out)
    }

    fn commit(&self, store: PatternStore) -> Result<(), StoreError> {
        self.persist(&store)?;
        self.replace_cache(Arc::new(store))
    }

    /// Like [`mutate`](Self::mutate), but `Ok(None)` means nothing changed and
    /// nothing is written.
    fn mutate_if<T>(
        &self,
        op: impl FnOnce(&mut PatternStore) -> Result<Option<T>, StoreError>,
    ) -> Result<Option<T>, StoreError> {
        let _guard = self.lock_writes()?;
        let mut working = (*self.snapshot_locked()?).clone();

        let Some(out) = op(&mut working)? else {
            return Ok(None);
        };

        self.commit(working)?;
        Ok(Some(out))
    }
}
