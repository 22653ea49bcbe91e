//! The image tree: staged upload paths, class listing, auto-add filing.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::info;

use crate::error::ImageStoreError;

/// Directory under `train/` reserved for persisted models.
pub const MODELS_DIR_NAME: &str = "models";

/// A class directory with at least one image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassEntry {
    pub name: String,
    pub count: usize,
}

/// Handle on the image tree rooted at `save_path`.
#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
    supported: Vec<String>,
}

impl ImageStore {
    /// Creates a store over `root` accepting the given extensions
    /// (dot-prefixed, e.g. `.jpg`). Extensions compare case-insensitively.
    pub fn new(root: &Path, supported: Vec<String>) -> Self {
        let supported = supported.into_iter().map(|e| e.to_lowercase()).collect();
        Self {
            root: root.to_path_buf(),
            supported,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn train_dir(&self) -> PathBuf {
        self.root.join("train")
    }

    pub fn predict_dir(&self) -> PathBuf {
        self.root.join("predict")
    }

    pub fn models_dir(&self) -> PathBuf {
        self.train_dir().join(MODELS_DIR_NAME)
    }

    pub fn confusion_matrix_path(&self) -> PathBuf {
        self.root.join("confusion_matrix.jpg")
    }

    pub fn top_losses_path(&self) -> PathBuf {
        self.root.join("top_losses.jpg")
    }

    /// Checks the filename against the extension allow-list.
    pub fn validate_filename(&self, filename: &str) -> Result<(), ImageStoreError> {
        let ext = filename
            .rfind('.')
            .map(|i| filename[i..].to_lowercase())
            .ok_or_else(|| ImageStoreError::UnsupportedFiletype(filename.to_string()))?;
        if self.supported.contains(&ext) {
            Ok(())
        } else {
            Err(ImageStoreError::UnsupportedFiletype(filename.to_string()))
        }
    }

    /// Collision-free name for an upload: local timestamp (colons replaced so
    /// the name is filesystem-safe) prefixed to the original filename.
    pub fn generated_name(&self, original: &str) -> String {
        let time = Local::now().format("%Y-%m-%d %H_%M_%S%.6f");
        format!("{}_{}", time, original)
    }

    /// Validates the upload and reserves a destination path under
    /// `train/<class>/`, creating the class directory if absent. The caller
    /// writes the bytes.
    pub fn stage_train_upload(
        &self,
        class: &str,
        original: &str,
    ) -> Result<PathBuf, ImageStoreError> {
        validate_class_name(class)?;
        self.validate_filename(original)?;
        let class_dir = self.train_dir().join(class);
        fs::create_dir_all(&class_dir)?;
        Ok(class_dir.join(self.generated_name(original)))
    }

    /// Validates the upload and reserves a destination path under `predict/`.
    pub fn stage_predict_upload(&self, original: &str) -> Result<PathBuf, ImageStoreError> {
        self.validate_filename(original)?;
        let dir = self.predict_dir();
        fs::create_dir_all(&dir)?;
        Ok(dir.join(self.generated_name(original)))
    }

    /// Copies an already-saved image into `train/<class>/` under a generated
    /// name. Used by the worker's auto-add.
    pub fn file_into_class(&self, class: &str, src: &Path) -> Result<PathBuf, ImageStoreError> {
        validate_class_name(class)?;
        let original = src
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| ImageStoreError::NotFound(src.display().to_string()))?;
        let class_dir = self.train_dir().join(class);
        fs::create_dir_all(&class_dir)?;
        let dest = class_dir.join(self.generated_name(original));
        fs::copy(src, &dest)?;
        info!(class = %class, dest = %dest.display(), "Filed image into class");
        Ok(dest)
    }

    /// Class directories with at least one file, excluding the reserved
    /// models directory, sorted by name.
    pub fn list_classes(&self) -> Result<Vec<ClassEntry>, ImageStoreError> {
        let train = self.train_dir();
        let mut entries = Vec::new();
        if !train.exists() {
            return Ok(entries);
        }
        for dir in fs::read_dir(&train)? {
            let dir = dir?;
            if !dir.file_type()?.is_dir() {
                continue;
            }
            let name = dir.file_name().to_string_lossy().to_string();
            if name == MODELS_DIR_NAME {
                continue;
            }
            let count = fs::read_dir(dir.path())?
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
                .count();
            if count > 0 {
                entries.push(ClassEntry { name, count });
            }
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    /// Deletes a previously saved upload.
    pub fn remove_upload(&self, path: &Path) -> Result<(), ImageStoreError> {
        if !path.exists() {
            return Err(ImageStoreError::NotFound(path.display().to_string()));
        }
        fs::remove_file(path)?;
        info!(path = %path.display(), "Removed upload");
        Ok(())
    }
}

/// Class names become single directory components; reject separators and
/// dot-navigation.
fn validate_class_name(class: &str) -> Result<(), ImageStoreError> {
    let bad = class.is_empty()
        || class == "."
        || class == ".."
        || class == MODELS_DIR_NAME
        || class.contains('/')
        || class.contains('\\');
    if bad {
        return Err(ImageStoreError::InvalidClass(class.to_string()));
    }
    Ok(())
}
