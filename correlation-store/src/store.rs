//! CorrelationStore trait: auto-add records keyed by chat message id.

use async_trait::async_trait;

use crate::error::StoreError;

/// Cross-process record of auto-added training images. Written by the worker,
/// read by the dispatcher. Entries have no TTL.
#[async_trait]
pub trait CorrelationStore: Send + Sync {
    /// Records that `correlation_id` auto-added the file at `path`. Sets both
    /// the path key and the `_added` flag.
    async fn record_auto_add(&self, correlation_id: &str, path: &str) -> Result<(), StoreError>;

    /// Path of the file auto-added for this message, if any.
    async fn auto_added_path(&self, correlation_id: &str) -> Result<Option<String>, StoreError>;

    /// Whether the `_added` flag is currently `1`.
    async fn was_auto_added(&self, correlation_id: &str) -> Result<bool, StoreError>;

    /// Reverts the record after an undo: flag goes to `0`, path key is
    /// removed.
    async fn clear_auto_add(&self, correlation_id: &str) -> Result<(), StoreError>;
}

/// Key for the `_added` flag of a message.
pub(crate) fn added_flag_key(correlation_id: &str) -> String {
    format!("{}_added", correlation_id)
}
