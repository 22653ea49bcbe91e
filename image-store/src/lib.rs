//! Image-store crate: the on-disk tree of labeled training images, prediction
//! scratch uploads, and generated artifacts.
//!
//! ## Layout
//!
//! - `<root>/train/<class>/<file>` – labeled training images
//! - `<root>/train/models/` – reserved for persisted models, never listed
//! - `<root>/predict/<file>` – scratch uploads for one-off predictions
//! - `<root>/confusion_matrix.jpg`, `<root>/top_losses.jpg` – artifacts

mod error;
mod store;

pub use error::ImageStoreError;
pub use store::{ClassEntry, ImageStore, MODELS_DIR_NAME};
