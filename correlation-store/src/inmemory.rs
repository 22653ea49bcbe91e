//! In-memory correlation store for tests and development. Mirrors the Redis
//! keyspace in a single map; data is lost on restart.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::store::{added_flag_key, CorrelationStore};

/// Thread-safe map-backed store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCorrelationStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryCorrelationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys held (both path and flag keys count).
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl CorrelationStore for InMemoryCorrelationStore {
    async fn record_auto_add(&self, correlation_id: &str, path: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.write().await;
        entries.insert(correlation_id.to_string(), path.to_string());
        entries.insert(added_flag_key(correlation_id), "1".to_string());
        Ok(())
    }

    async fn auto_added_path(&self, correlation_id: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.read().await.get(correlation_id).cloned())
    }

    async fn was_auto_added(&self, correlation_id: &str) -> Result<bool, StoreError> {
        let entries = self.entries.read().await;
        Ok(entries.get(&added_flag_key(correlation_id)).map(String::as_str) == Some("1"))
    }

    async fn clear_auto_add(&self, correlation_id: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.write().await;
        entries.insert(added_flag_key(correlation_id), "0".to_string());
        entries.remove(correlation_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_record_then_read_back() {
        let store = InMemoryCorrelationStore::new();
        store.record_auto_add("77", "/data/train/cats/x.jpg").await.unwrap();

        assert_eq!(
            store.auto_added_path("77").await.unwrap().as_deref(),
            Some("/data/train/cats/x.jpg")
        );
        assert!(store.was_auto_added("77").await.unwrap());
    }

    #[tokio::test]
    async fn test_missing_message_has_no_record() {
        let store = InMemoryCorrelationStore::new();
        assert_eq!(store.auto_added_path("77").await.unwrap(), None);
        assert!(!store.was_auto_added("77").await.unwrap());
    }

    #[tokio::test]
    async fn test_clear_flips_flag_and_drops_path() {
        let store = InMemoryCorrelationStore::new();
        store.record_auto_add("77", "/data/x.jpg").await.unwrap();
        store.clear_auto_add("77").await.unwrap();

        assert_eq!(store.auto_added_path("77").await.unwrap(), None);
        assert!(!store.was_auto_added("77").await.unwrap());
        // The flag key survives as "0" rather than disappearing.
        assert_eq!(store.len().await, 1);
    }
}
