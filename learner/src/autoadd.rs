//! Auto-add: filing a confidently-scored image into its predicted class and
//! recording the outcome in the shared store so the dispatcher can undo it.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use correlation_store::CorrelationStore;
use image_store::ImageStore;
use tracing::info;

use crate::model::Prediction;

/// Copies `img_path` into the predicted class when the top confidence exceeds
/// `threshold`, then writes the correlation record. Returns the destination
/// path when an add happened. The store write completes before this function
/// returns, so callers can print afterwards and the dispatcher never reads a
/// half-written record.
pub async fn maybe_auto_add(
    images: &ImageStore,
    store: &dyn CorrelationStore,
    prediction: &Prediction,
    img_path: &Path,
    threshold: f64,
    correlation_id: &str,
) -> Result<Option<PathBuf>> {
    if prediction.confidence <= threshold {
        return Ok(None);
    }

    let dest = images
        .file_into_class(&prediction.class, img_path)
        .context("Auto-add image to class")?;
    store
        .record_auto_add(correlation_id, &dest.display().to_string())
        .await
        .context("Record auto-add")?;

    info!(
        class = %prediction.class,
        confidence = prediction.confidence,
        correlation_id = %correlation_id,
        "Auto-added image"
    );
    Ok(Some(dest))
}
