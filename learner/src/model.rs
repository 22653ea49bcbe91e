//! Classifier fit, persistence, and prediction. The optimization itself is
//! linfa's; this module is plumbing around it.

use std::cmp::Ordering;
use std::fs;
use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use linfa::prelude::*;
use linfa_logistic::{MultiFittedLogisticRegression, MultiLogisticRegression};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::dataset::{features_for_path, ImageDataset};

/// Persisted model filename under the reserved models directory.
pub const MODEL_FILE: &str = "current_model.json";

/// A fitted classifier together with the class names its label indices refer
/// to.
#[derive(Serialize, Deserialize)]
pub struct TrainedModel {
    pub classes: Vec<String>,
    model: MultiFittedLogisticRegression<f64, usize>,
}

/// One scored image: top class plus the full ranked probability list.
#[derive(Debug, Clone)]
pub struct Prediction {
    pub class: String,
    pub confidence: f64,
    pub ranked: Vec<(f64, String)>,
}

impl TrainedModel {
    /// Fits a multinomial logistic-regression classifier on the dataset.
    pub fn fit(dataset: &ImageDataset, max_iterations: u64) -> Result<Self> {
        let linfa_dataset = Dataset::new(dataset.records.clone(), dataset.targets.clone());
        let model = MultiLogisticRegression::default()
            .max_iterations(max_iterations)
            .fit(&linfa_dataset)
            .context("Fit classifier")?;

        info!(
            samples = dataset.len(),
            classes = dataset.classes.len(),
            "Fitted classifier"
        );

        Ok(Self {
            classes: dataset.classes.clone(),
            model,
        })
    }

    /// Persists the model (with its class list) under `models_dir`.
    pub fn save(&self, models_dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(models_dir)?;
        let path = models_dir.join(MODEL_FILE);
        let file = File::create(&path)
            .with_context(|| format!("Create {}", path.display()))?;
        serde_json::to_writer(file, self).context("Serialize model")?;
        Ok(path)
    }

    /// Loads the persisted model.
    pub fn load(models_dir: &Path) -> Result<Self> {
        let path = models_dir.join(MODEL_FILE);
        let file = File::open(&path)
            .with_context(|| format!("No trained model at {}", path.display()))?;
        serde_json::from_reader(file).context("Deserialize model")
    }

    /// Label indices for a batch of feature rows.
    pub fn predict_labels(&self, records: &Array2<f64>) -> Array1<usize> {
        self.model.predict(records)
    }

    /// Class probabilities per row, columns in label-index order.
    pub fn probabilities(&self, records: &Array2<f64>) -> Array2<f64> {
        self.model.predict_probabilities(records)
    }

    /// Fraction of misclassified validation samples.
    pub fn error_rate(&self, valid: &ImageDataset) -> Result<f32> {
        let pred = self.predict_labels(&valid.records);
        let linfa_dataset = Dataset::new(valid.records.clone(), valid.targets.clone());
        let cm = pred
            .confusion_matrix(&linfa_dataset)
            .context("Confusion matrix")?;
        Ok(1.0 - cm.accuracy())
    }

    /// Scores a single image file.
    pub fn predict_image(&self, path: &Path) -> Result<Prediction> {
        let features = features_for_path(path)?;
        let records = Array2::from_shape_vec((1, features.len()), features)
            .context("Assemble feature row")?;
        let probs = self.probabilities(&records);

        let mut ranked: Vec<(f64, String)> = probs
            .row(0)
            .iter()
            .enumerate()
            .map(|(i, &p)| (p, self.classes[i].clone()))
            .collect();
        ranked.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));

        let (confidence, class) = ranked[0].clone();
        Ok(Prediction {
            class,
            confidence,
            ranked,
        })
    }
}
