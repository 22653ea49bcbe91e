//! # learner
//!
//! Training and inference worker. Loads the class-labeled image tree written
//! by the dispatcher, fits a classifier (or loads the persisted one), and in
//! inference mode optionally auto-files confident predictions back into the
//! training set, recording the outcome in the shared store.
//!
//! ## Modules
//!
//! - [`dataset`] – verify pass, folder loading, feature extraction, split
//! - [`model`] – classifier fit/persist/predict
//! - [`interp`] – confusion-matrix and top-losses artifacts
//! - [`autoadd`] – confident predictions flow back into the training set

pub mod autoadd;
pub mod dataset;
pub mod interp;
pub mod model;

pub use dataset::{ImageDataset, VerifyReport, FEATURE_LEN, MAX_IMAGE_DIM};
pub use model::{Prediction, TrainedModel};
