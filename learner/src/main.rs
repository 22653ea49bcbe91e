//! learner CLI: train on the image tree, or score one image and optionally
//! auto-file it. stdout is relayed to the chat by the dispatcher, so results
//! are printed; diagnostics go to stderr via tracing.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use correlation_store::RedisCorrelationStore;
use image_store::ImageStore;
use learner::autoadd::maybe_auto_add;
use learner::dataset::{self, load_dataset};
use learner::interp::{confusion_counts, write_confusion_matrix, write_top_losses};
use learner::model::TrainedModel;

/// Validation holdout fraction.
const VALID_PCT: f64 = 0.1;
/// Fixed shuffle seed keeps the split stable across runs over the same tree.
const SPLIT_SEED: u64 = 42;
/// Optimizer budget for one nominal epoch.
const ITERATIONS_PER_EPOCH: u64 = 100;

#[derive(Parser)]
#[command(name = "learner")]
#[command(about = "Training and inference worker for the image tree", long_about = None)]
#[command(version)]
struct LearnerArgs {
    /// Train on the image tree instead of predicting.
    #[arg(long)]
    train: bool,

    /// How many epochs to train for.
    #[arg(long, default_value_t = 5)]
    num_epochs: u32,

    /// Write confusion-matrix and top-losses artifacts after training.
    #[arg(long)]
    interp: bool,

    /// Path of the image to predict.
    #[arg(long, required_unless_present = "train")]
    img_path: Option<PathBuf>,

    /// Root of the image tree (the dispatcher's save path).
    #[arg(long)]
    data_dir: PathBuf,

    /// Auto-add the image to its predicted class when the top confidence
    /// exceeds this threshold.
    #[arg(long)]
    auto_add_threshold: Option<f64>,

    /// Chat message id used to tag shared-store records for auto-adds.
    #[arg(long)]
    correlation_id: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // stdout belongs to the prediction/training report; keep logs on stderr.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let args = LearnerArgs::parse();

    if args.train {
        run_train(&args)
    } else {
        run_predict(&args).await
    }
}

fn run_train(args: &LearnerArgs) -> Result<()> {
    let images = ImageStore::new(&args.data_dir, Vec::new());

    let report = dataset::verify(&images.train_dir()).context("Verify images")?;
    if report.removed > 0 {
        println!("verify: removed {} invalid image(s)", report.removed);
    }

    let dataset = load_dataset(&images.train_dir()).context("Load dataset")?;
    println!("classes: {:?}", dataset.classes);

    let (train_ds, valid_ds) = dataset.split(VALID_PCT, SPLIT_SEED);
    let iterations = u64::from(args.num_epochs) * ITERATIONS_PER_EPOCH;
    let model = TrainedModel::fit(&train_ds, iterations)?;
    let saved = model.save(&images.models_dir())?;

    if valid_ds.is_empty() {
        if args.interp {
            println!("not enough images for a validation set; skipping interpretation");
        }
    } else {
        let error_rate = model.error_rate(&valid_ds)?;
        println!("error_rate: {:.3}", error_rate);

        if args.interp {
            let pred = model.predict_labels(&valid_ds.records);
            let counts = confusion_counts(&valid_ds.targets, &pred, dataset.classes.len());
            write_confusion_matrix(&counts, &images.confusion_matrix_path())?;

            let probs = model.probabilities(&valid_ds.records);
            let mut losses: Vec<(PathBuf, f64)> = valid_ds
                .paths
                .iter()
                .zip(valid_ds.targets.iter())
                .enumerate()
                .map(|(row, (path, &target))| {
                    let p_true = probs[[row, target]].max(1e-12);
                    (path.clone(), -p_true.ln())
                })
                .collect();
            losses.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
            write_top_losses(&losses, &images.top_losses_path())?;

            println!("wrote confusion_matrix.jpg and top_losses.jpg");
        }
    }

    println!("saved model to {}", saved.display());
    Ok(())
}

async fn run_predict(args: &LearnerArgs) -> Result<()> {
    let img_path = args
        .img_path
        .as_deref()
        .context("--img-path is required unless --train is given")?;

    let images = ImageStore::new(&args.data_dir, Vec::new());
    let model = TrainedModel::load(&images.models_dir())
        .context("Load model (run a training pass first)")?;
    let prediction = model.predict_image(img_path)?;

    // The store record has to land before the dispatcher can read it, which
    // means before anything is printed.
    let mut auto_added = false;
    if let (Some(threshold), Some(correlation_id)) =
        (args.auto_add_threshold, args.correlation_id.as_deref())
    {
        let store = RedisCorrelationStore::connect(&redis_url_from_env())
            .await
            .context("Connect to the shared correlation store")?;
        auto_added = maybe_auto_add(
            &images,
            &store,
            &prediction,
            img_path,
            threshold,
            correlation_id,
        )
        .await?
        .is_some();
    }

    println!("Predicted Class: {}", prediction.class);
    let display: Vec<(f64, &str)> = prediction
        .ranked
        .iter()
        .map(|(p, class)| ((p * 1000.0).round() / 1000.0, class.as_str()))
        .collect();
    println!("Probs: {:?}", display);
    if auto_added {
        println!("auto-added to '{}'", prediction.class);
    }

    Ok(())
}

fn redis_url_from_env() -> String {
    let host = std::env::var("REDIS_HOST").unwrap_or_else(|_| "localhost".to_string());
    let port = std::env::var("REDIS_PORT").unwrap_or_else(|_| "6379".to_string());
    format!("redis://{}:{}", host, port)
}
