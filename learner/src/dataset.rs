//! Dataset loading: verify pass over the class tree, fixed-size feature
//! vectors per image, and the train/validation split.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use image::DynamicImage;
use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::warn;

use image_store::MODELS_DIR_NAME;

/// Images with a larger side than this are discarded by verify.
pub const MAX_IMAGE_DIM: u32 = 500;

/// Images are resampled to this square side before flattening.
pub const FEATURE_SIDE: u32 = 32;

/// Length of one feature vector (RGB, normalized to 0..=1).
pub const FEATURE_LEN: usize = (FEATURE_SIDE * FEATURE_SIDE * 3) as usize;

/// Outcome of the data-hygiene pass.
#[derive(Debug, Clone, Copy)]
pub struct VerifyReport {
    pub checked: usize,
    pub removed: usize,
}

/// Walks every class directory (except the reserved models directory) and
/// deletes files that fail to decode or exceed [`MAX_IMAGE_DIM`].
pub fn verify(train_dir: &Path) -> Result<VerifyReport> {
    let mut report = VerifyReport {
        checked: 0,
        removed: 0,
    };
    if !train_dir.exists() {
        return Ok(report);
    }

    for class_dir in class_dirs(train_dir)? {
        for entry in fs::read_dir(&class_dir)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            report.checked += 1;

            let decoded = image::ImageReader::open(&path)
                .ok()
                .and_then(|r| r.with_guessed_format().ok())
                .and_then(|r| r.decode().ok());

            match decoded {
                Some(img) if img.width().max(img.height()) <= MAX_IMAGE_DIM => {}
                _ => {
                    warn!(path = %path.display(), "Discarding unreadable or oversized image");
                    fs::remove_file(&path)?;
                    report.removed += 1;
                }
            }
        }
    }
    Ok(report)
}

/// A loaded folder dataset: one row per image, class labels as indices into
/// `classes`.
#[derive(Debug, Clone)]
pub struct ImageDataset {
    pub classes: Vec<String>,
    pub records: Array2<f64>,
    pub targets: Array1<usize>,
    pub paths: Vec<PathBuf>,
}

impl ImageDataset {
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Shuffled split; `valid_pct` of the samples (rounded down) go to the
    /// validation set. Deterministic for a given seed.
    pub fn split(&self, valid_pct: f64, seed: u64) -> (ImageDataset, ImageDataset) {
        let mut indices: Vec<usize> = (0..self.len()).collect();
        indices.shuffle(&mut StdRng::seed_from_u64(seed));
        let n_valid = ((self.len() as f64) * valid_pct).floor() as usize;
        let (valid_idx, train_idx) = indices.split_at(n_valid);
        (self.subset(train_idx), self.subset(valid_idx))
    }

    fn subset(&self, indices: &[usize]) -> ImageDataset {
        ImageDataset {
            classes: self.classes.clone(),
            records: self.records.select(Axis(0), indices),
            targets: self.targets.select(Axis(0), indices),
            paths: indices.iter().map(|&i| self.paths[i].clone()).collect(),
        }
    }
}

/// Loads every decodable image under `train_dir` into a dataset. Class order
/// (and so label indices) is the sorted directory order.
pub fn load_dataset(train_dir: &Path) -> Result<ImageDataset> {
    let mut classes = Vec::new();
    let mut rows: Vec<f64> = Vec::new();
    let mut targets = Vec::new();
    let mut paths = Vec::new();

    for class_dir in class_dirs(train_dir)? {
        let name = class_dir
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let mut files: Vec<PathBuf> = fs::read_dir(&class_dir)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file())
            .collect();
        files.sort();

        let label = classes.len();
        let mut added = 0usize;
        for path in files {
            match features_for_path(&path) {
                Ok(features) => {
                    rows.extend(features);
                    targets.push(label);
                    paths.push(path);
                    added += 1;
                }
                Err(e) => warn!(path = %path.display(), error = %e, "Skipping image"),
            }
        }
        if added > 0 {
            classes.push(name);
        }
    }

    if classes.len() < 2 {
        anyhow::bail!(
            "need at least two classes with images to train, found {}",
            classes.len()
        );
    }

    let n = targets.len();
    let records = Array2::from_shape_vec((n, FEATURE_LEN), rows)
        .context("Assemble feature matrix")?;

    Ok(ImageDataset {
        classes,
        records,
        targets: Array1::from_vec(targets),
        paths,
    })
}

/// Feature vector for one image file.
pub fn features_for_path(path: &Path) -> Result<Vec<f64>> {
    let img = image::ImageReader::open(path)
        .with_context(|| format!("Open {}", path.display()))?
        .with_guessed_format()?
        .decode()
        .with_context(|| format!("Decode {}", path.display()))?;
    Ok(features_from_image(&img))
}

/// Resamples to a fixed square and flattens to normalized RGB values.
pub fn features_from_image(img: &DynamicImage) -> Vec<f64> {
    let small = img.resize_exact(
        FEATURE_SIDE,
        FEATURE_SIDE,
        image::imageops::FilterType::Triangle,
    );
    small
        .to_rgb8()
        .into_raw()
        .iter()
        .map(|&b| f64::from(b) / 255.0)
        .collect()
}

/// Class directories under `train_dir`, sorted, models excluded.
fn class_dirs(train_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut dirs: Vec<PathBuf> = fs::read_dir(train_dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.is_dir()
                && p.file_name()
                    .map(|n| n != MODELS_DIR_NAME)
                    .unwrap_or(false)
        })
        .collect();
    dirs.sort();
    Ok(dirs)
}
