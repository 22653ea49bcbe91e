//! Correlation-store error types.

use thiserror::Error;

/// Errors from the shared store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store error: {0}")]
    Backend(#[from] redis::RedisError),
    #[error("Connection error: {0}")]
    Connection(String),
}
