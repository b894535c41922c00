//! Shared bouquet storage.
//!
//! Holds every shared bouquet in memory and, when configured with a data
//! directory, mirrors each record to `{id}.json` so links survive restarts.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use bouquet_core::{ShareId, SharePayload};
use bouquet_export::{BouquetPersistence, ExportError, ExportResult};
use serde::{Deserialize, Serialize};

/// Errors that can occur during store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// An I/O error occurred during persistence.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// A record could not be serialized or parsed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// The record violates a composition invariant.
    #[error("Invalid record: {0}")]
    Invalid(#[from] bouquet_core::BouquetError),
}

/// A persisted bouquet together with its storage metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredBouquet {
    /// Share identifier.
    pub id: ShareId,
    /// The record as submitted, composite mode included.
    pub payload: SharePayload,
    /// Server-side insertion time, milliseconds since the Unix epoch.
    pub stored_at: u64,
}

#[derive(Debug, Default)]
struct Records {
    by_id: HashMap<ShareId, StoredBouquet>,
    /// Ids handed out to inserts still writing their file.
    reserved: HashSet<ShareId>,
    latest_stamp: u64,
}

impl Records {
    /// Strictly increasing insertion stamp, so listing order is stable.
    fn next_stamp(&mut self) -> u64 {
        let stamp = current_timestamp_ms().max(self.latest_stamp + 1);
        self.latest_stamp = stamp;
        stamp
    }

    /// Pick an id no stored or in-progress record uses, with its stamp.
    fn reserve(&mut self) -> (ShareId, u64) {
        let mut id = ShareId::generate();
        while self.by_id.contains_key(&id) || self.reserved.contains(&id) {
            id = ShareId::generate();
        }
        self.reserved.insert(id.clone());
        (id, self.next_stamp())
    }

    fn insert(&mut self, stored: StoredBouquet) {
        self.latest_stamp = self.latest_stamp.max(stored.stored_at);
        self.by_id.insert(stored.id.clone(), stored);
    }
}

/// Thread-safe store of shared bouquets.
#[derive(Debug, Clone, Default)]
pub struct BouquetStore {
    records: Arc<RwLock<Records>>,
    /// Optional data directory for filesystem persistence.
    data_dir: Option<PathBuf>,
}

impl BouquetStore {
    /// Create an in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store backed by `data_dir`, loading any records already there.
    ///
    /// Files that fail to parse are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or listed.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let data_dir = data_dir.into();
        std::fs::create_dir_all(&data_dir)?;

        let mut records = Records::default();
        for entry in std::fs::read_dir(&data_dir)? {
            let path = entry?.path();
            if !path.extension().is_some_and(|ext| ext == "json") {
                continue;
            }
            match load_record(&path) {
                Ok(stored) => records.insert(stored),
                Err(e) => tracing::warn!("Skipping unreadable bouquet {}: {e}", path.display()),
            }
        }
        tracing::info!(
            count = records.by_id.len(),
            dir = %data_dir.display(),
            "Loaded shared bouquets"
        );

        Ok(Self {
            records: Arc::new(RwLock::new(records)),
            data_dir: Some(data_dir),
        })
    }

    /// Validate and store a record under a fresh identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Invalid`] for an inconsistent record, or an I/O
    /// or serialization error if the record could not be written to disk. A
    /// record that failed to persist is not kept in memory either.
    pub fn insert(&self, payload: SharePayload) -> Result<StoredBouquet, StoreError> {
        payload.validate()?;

        let (id, stored_at) = self.write_records().reserve();
        let stored = StoredBouquet {
            id,
            payload,
            stored_at,
        };

        // Written outside the lock.
        let persisted = self.persist(&stored);

        let mut records = self.write_records();
        records.reserved.remove(&stored.id);
        persisted?;
        records.insert(stored.clone());
        tracing::debug!(id = %stored.id, "Stored shared bouquet");
        Ok(stored)
    }

    /// Get a stored bouquet by id.
    #[must_use]
    pub fn get(&self, id: &ShareId) -> Option<StoredBouquet> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        records.by_id.get(id).cloned()
    }

    /// All stored bouquets, most recently stored first.
    #[must_use]
    pub fn list_newest_first(&self) -> Vec<StoredBouquet> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        let mut all: Vec<_> = records.by_id.values().cloned().collect();
        all.sort_by(|a, b| {
            b.stored_at
                .cmp(&a.stored_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        all
    }

    /// Number of stored bouquets.
    #[must_use]
    pub fn len(&self) -> usize {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        records.by_id.len()
    }

    /// Whether the store holds no bouquets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The configured data directory, if any.
    #[must_use]
    pub fn data_dir(&self) -> Option<&Path> {
        self.data_dir.as_deref()
    }

    /// Whether the backing directory (if any) is still reachable.
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.data_dir.as_ref().map_or(true, |dir| dir.is_dir())
    }

    fn write_records(&self) -> std::sync::RwLockWriteGuard<'_, Records> {
        self.records
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, stored: &StoredBouquet) -> Result<(), StoreError> {
        let Some(ref data_dir) = self.data_dir else {
            return Ok(());
        };
        let json = serde_json::to_string_pretty(stored)?;
        let path = data_dir.join(format!("{}.json", stored.id));
        std::fs::write(&path, json).inspect_err(|e| {
            tracing::warn!("Failed to persist bouquet {} to {}: {e}", stored.id, path.display());
        })?;
        Ok(())
    }
}

fn load_record(path: &Path) -> Result<StoredBouquet, StoreError> {
    let contents = std::fs::read_to_string(path)?;
    let stored: StoredBouquet = serde_json::from_str(&contents)?;
    stored.payload.validate()?;
    Ok(stored)
}

fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

#[async_trait]
impl BouquetPersistence for BouquetStore {
    async fn insert(&self, payload: SharePayload) -> ExportResult<ShareId> {
        let store = self.clone();
        let stored = tokio::task::spawn_blocking(move || BouquetStore::insert(&store, payload))
            .await
            .map_err(|e| ExportError::Persistence(e.to_string()))?
            .map_err(|e| ExportError::Persistence(e.to_string()))?;
        Ok(stored.id)
    }

    async fn fetch(&self, id: &ShareId) -> ExportResult<Option<SharePayload>> {
        Ok(self.get(id).map(|stored| stored.payload))
    }
}
