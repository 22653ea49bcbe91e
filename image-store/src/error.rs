//! Image-store error types.

use thiserror::Error;

/// Errors from image-tree operations.
#[derive(Error, Debug)]
pub enum ImageStoreError {
    #[error("Unsupported file type: {0}")]
    UnsupportedFiletype(String),
    #[error("Invalid class name: {0}")]
    InvalidClass(String),
    #[error("Nothing saved at: {0}")]
    NotFound(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
