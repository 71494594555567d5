//! Persistence for manual forecast overrides, keyed by `(city, date)`

use async_trait::async_trait;
use chrono::NaiveDate;
use fjall::{Database, Keyspace, PersistMode};
use std::collections::HashMap;
use std::path::Path;
use tokio::sync::RwLock;
use tokio::task;

use crate::models::ForecastOverride;
use crate::{Result, ServiceError};

const KEYSPACE_NAME: &str = "forecast_overrides";

/// Lookup and upsert of override records.
///
/// Implementations do not validate records; callers must.
#[async_trait]
pub trait OverrideStore: Send + Sync {
    /// Exact-match lookup on the natural key
    async fn find(&self, city: &str, date: NaiveDate) -> Result<Option<ForecastOverride>>;

    /// Create the record or overwrite the temperatures of the existing one
    async fn upsert(&self, record: ForecastOverride) -> Result<()>;
}

/// City bytes, a NUL separator, then the ISO date
fn record_key(city: &str, date: NaiveDate) -> Vec<u8> {
    let mut key = Vec::with_capacity(city.len() + 11);
    key.extend_from_slice(city.as_bytes());
    key.push(0);
    key.extend_from_slice(date.format("%Y-%m-%d").to_string().as_bytes());
    key
}

fn get_from_store(store: Keyspace, key: Vec<u8>) -> Result<Option<Vec<u8>>> {
    store
        .get(key)
        .map(|value| value.map(|v| v.to_vec()))
        .map_err(|e| ServiceError::store(format!("read failed: {e}")))
}

/// Overrides persisted in an on-disk fjall keyspace.
///
/// Every upsert is synced to disk before it returns.
pub struct KeyspaceOverrideStore {
    db: Database,
    store: Keyspace,
}

impl KeyspaceOverrideStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = Database::builder(path.as_ref())
            .open()
            .map_err(|e| ServiceError::store(format!("failed to open database: {e}")))?;
        let store = db
            .keyspace(KEYSPACE_NAME, fjall::KeyspaceCreateOptions::default)
            .map_err(|e| ServiceError::store(format!("failed to open keyspace: {e}")))?;
        Ok(Self { db, store })
    }
}

#[async_trait]
impl OverrideStore for KeyspaceOverrideStore {
    #[tracing::instrument(name = "find_override", level = "debug", skip(self))]
    async fn find(&self, city: &str, date: NaiveDate) -> Result<Option<ForecastOverride>> {
        let store = self.store.clone();
        let key = record_key(city, date);

        let maybe_bytes = task::spawn_blocking(move || get_from_store(store, key)).await??;

        match maybe_bytes {
            Some(bytes) => {
                tracing::debug!("Override found");
                Ok(Some(postcard::from_bytes(&bytes)?))
            }
            None => {
                tracing::debug!("No override stored");
                Ok(None)
            }
        }
    }

    #[tracing::instrument(name = "upsert_override", level = "debug", skip(self, record), fields(record = %record))]
    async fn upsert(&self, record: ForecastOverride) -> Result<()> {
        let db = self.db.clone();
        let store = self.store.clone();
        let key = record_key(&record.city, record.date);
        let bytes = postcard::to_stdvec(&record)?;

        task::spawn_blocking(move || {
            store.insert(key, bytes)?;
            db.persist(PersistMode::SyncAll)
        })
        .await?
        .map_err(|e| ServiceError::store(format!("write failed: {e}")))?;
        Ok(())
    }
}

/// Overrides held in process memory; lost on restart
#[derive(Default)]
pub struct InMemoryOverrideStore {
    records: RwLock<HashMap<(String, NaiveDate), ForecastOverride>>,
}

impl InMemoryOverrideStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl OverrideStore for InMemoryOverrideStore {
    async fn find(&self, city: &str, date: NaiveDate) -> Result<Option<ForecastOverride>> {
        let records = self.records.read().await;
        Ok(records.get(&(city.to_string(), date)).cloned())
    }

    async fn upsert(&self, record: ForecastOverride) -> Result<()> {
        let mut records = self.records.write().await;
        records.insert((record.city.clone(), record.date), record);
        Ok(())
    }
}
