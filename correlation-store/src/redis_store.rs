//! Redis-backed correlation store.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tracing::info;

use crate::error::StoreError;
use crate::store::{added_flag_key, CorrelationStore};

/// Correlation store over a Redis server. The connection manager reconnects
/// on failure and is cheap to clone.
#[derive(Clone)]
pub struct RedisCorrelationStore {
    conn: ConnectionManager,
}

impl RedisCorrelationStore {
    /// Connects to the given Redis URL (e.g. `redis://localhost:6379`).
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let client = redis::Client::open(url)
            .map_err(|e| StoreError::Connection(format!("{}: {}", url, e)))?;
        let conn = ConnectionManager::new(client)
            .await
            .map_err(|e| StoreError::Connection(format!("{}: {}", url, e)))?;
        info!(url = %url, "Connected to correlation store");
        Ok(Self { conn })
    }
}

#[async_trait]
impl CorrelationStore for RedisCorrelationStore {
    async fn record_auto_add(&self, correlation_id: &str, path: &str) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        conn.set::<_, _, ()>(correlation_id, path).await?;
        conn.set::<_, _, ()>(added_flag_key(correlation_id), "1")
            .await?;
        info!(correlation_id = %correlation_id, path = %path, "Recorded auto-add");
        Ok(())
    }

    async fn auto_added_path(&self, correlation_id: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.conn.clone();
        let path: Option<String> = conn.get(correlation_id).await?;
        Ok(path)
    }

    async fn was_auto_added(&self, correlation_id: &str) -> Result<bool, StoreError> {
        let mut conn = self.conn.clone();
        let flag: Option<String> = conn.get(added_flag_key(correlation_id)).await?;
        Ok(flag.as_deref() == Some("1"))
    }

    async fn clear_auto_add(&self, correlation_id: &str) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        conn.set::<_, _, ()>(added_flag_key(correlation_id), "0")
            .await?;
        conn.del::<_, ()>(correlation_id).await?;
        info!(correlation_id = %correlation_id, "Cleared auto-add record");
        Ok(())
    }
}
