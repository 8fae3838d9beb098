//! Expiring key-value store for operation progress snapshots.
//!
//! The engine only sees the [`ProgressStore`] trait. Production wiring picks
//! [`RedisProgressStore`] when `PROGRESS_STORE_URL` is set and
//! [`MemoryProgressStore`] otherwise. Every `set` restarts the entry's TTL.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use catalog_core::bulk::{progress_key, OperationSnapshot};
use moka::future::Cache;
use moka::Expiry;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

/// Upper bound on snapshots held by the in-process store.
///
/// This trades retention for memory: once full, moka may evict a snapshot
/// before its TTL and polling that operation answers 404. Deployments that
/// need the full retention window under heavy submission rates should set
/// `PROGRESS_STORE_URL` and use Redis.
const MEMORY_MAX_ENTRIES: u64 = 100_000;

#[derive(Debug, thiserror::Error)]
pub enum ProgressError {
    #[error("Progress snapshot could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Progress store backend error: {0}")]
    Backend(#[from] redis::RedisError),
}

/// `get`/`set` with TTL over opaque string values.
#[async_trait]
pub trait ProgressStore: Send + Sync {
    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), ProgressError>;

    /// `None` when the key was never written or has expired.
    async fn get(&self, key: &str) -> Result<Option<String>, ProgressError>;
}

/// Encode and store the snapshot for `operation_id`.
pub async fn save_snapshot(
    store: &dyn ProgressStore,
    operation_id: &str,
    snapshot: &OperationSnapshot,
    ttl: Duration,
) -> Result<(), ProgressError> {
    let value = serde_json::to_string(snapshot)?;
    store.set(&progress_key(operation_id), value, ttl).await
}

/// Raw stored snapshot for `operation_id`, exactly as written.
pub async fn load_snapshot_raw(
    store: &dyn ProgressStore,
    operation_id: &str,
) -> Result<Option<String>, ProgressError> {
    store.get(&progress_key(operation_id)).await
}

/// Decoded snapshot for `operation_id`.
pub async fn load_snapshot(
    store: &dyn ProgressStore,
    operation_id: &str,
) -> Result<Option<OperationSnapshot>, ProgressError> {
    match load_snapshot_raw(store, operation_id).await? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Build the store selected by configuration.
pub async fn connect(url: Option<&str>) -> Result<Arc<dyn ProgressStore>, ProgressError> {
    match url {
        Some(url) => {
            let store = RedisProgressStore::connect(url).await?;
            tracing::info!("Progress store: redis");
            Ok(Arc::new(store))
        }
        None => {
            tracing::info!("Progress store: in-process");
            Ok(Arc::new(MemoryProgressStore::new()))
        }
    }
}

// ---------------------------------------------------------------------------
// In-process backend
// ---------------------------------------------------------------------------

#[derive(Clone)]
struct StoredValue {
    value: String,
    ttl: Duration,
}

/// Expires each entry `ttl` after its latest write.
struct WriteExpiry;

impl Expiry<String, StoredValue> for WriteExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &StoredValue,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &StoredValue,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Progress store backed by a `moka` cache inside this process.
#[derive(Clone)]
pub struct MemoryProgressStore {
    inner: Cache<String, StoredValue>,
}

impl MemoryProgressStore {
    pub fn new() -> Self {
        let inner = Cache::builder()
            .max_capacity(MEMORY_MAX_ENTRIES)
            .expire_after(WriteExpiry)
            .build();
        Self { inner }
    }
}

impl Default for MemoryProgressStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProgressStore for MemoryProgressStore {
    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), ProgressError> {
        self.inner
            .insert(key.to_string(), StoredValue { value, ttl })
            .await;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, ProgressError> {
        Ok(self.inner.get(key).await.map(|stored| stored.value))
    }
}

// ---------------------------------------------------------------------------
// Redis backend
// ---------------------------------------------------------------------------

/// Progress store backed by Redis `SET EX` / `GET`.
#[derive(Clone)]
pub struct RedisProgressStore {
    conn: ConnectionManager,
}

impl RedisProgressStore {
    pub async fn connect(url: &str) -> Result<Self, ProgressError> {
        let client = redis::Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl ProgressStore for RedisProgressStore {
    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), ProgressError> {
        let mut conn = self.conn.clone();
        // Redis rejects EX 0.
        let seconds = ttl.as_secs().max(1);
        conn.set_ex::<_, _, ()>(key, value, seconds).await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, ProgressError> {
        let mut conn = self.conn.clone();
        Ok(conn.get::<_, Option<String>>(key).await?)
    }
}

#[cfg(test)]
mod tests {
    use catalog_core::bulk::{OperationKind, OperationStatus};

    use super::*;

    #[tokio::test]
    async fn set_then_get_returns_value() {
        let store = MemoryProgressStore::new();
        store
            .set("k", "v".to_string(), Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v"));
    }

    #[tokio::test]
    async fn missing_key_is_none() {
        let store = MemoryProgressStore::new();
        assert!(store.get("never-written").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn entry_expires_after_ttl() {
        let store = MemoryProgressStore::new();
        store
            .set("k", "v".to_string(), Duration::from_millis(50))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(store.get("k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn write_restarts_ttl() {
        let store = MemoryProgressStore::new();
        let ttl = Duration::from_millis(300);
        store.set("k", "v1".to_string(), ttl).await.unwrap();

        tokio::time::sleep(Duration::from_millis(200)).await;
        store.set("k", "v2".to_string(), ttl).await.unwrap();

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v2"));
    }

    #[tokio::test]
    async fn snapshot_round_trips_under_namespaced_key() {
        let store = MemoryProgressStore::new();
        let snapshot = OperationSnapshot::processing(OperationKind::Import, 3);

        save_snapshot(&store, "op-1", &snapshot, Duration::from_secs(60))
            .await
            .unwrap();

        assert!(store.get("bulk:operation:op-1").await.unwrap().is_some());
        let loaded = load_snapshot(&store, "op-1").await.unwrap().unwrap();
        assert_eq!(loaded.status, OperationStatus::Processing);
        assert_eq!(loaded.total, 3);
    }

    #[tokio::test]
    async fn early_snapshot_survives_a_busy_window() {
        let store = MemoryProgressStore::new();
        let ttl = Duration::from_secs(60);
        store.set("first", "v".to_string(), ttl).await.unwrap();
        for i in 0..20_000 {
            store.set(&format!("op-{i}"), "v".to_string(), ttl).await.unwrap();
        }
        store.inner.run_pending_tasks().await;

        assert!(store.get("first").await.unwrap().is_some());
    }
}
