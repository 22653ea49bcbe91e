//! Interpretation artifacts: a confusion-matrix heatmap and a montage of the
//! worst-loss validation images, both written as JPEGs next to the image
//! tree. Class order in the heatmap matches the stdout class listing.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use image::{Rgb, RgbImage};
use ndarray::{Array1, Array2};

const CELL: u32 = 64;
const TILE: u32 = 224;
const GRID: u32 = 3;

/// Per-(truth, prediction) counts over the validation set.
pub fn confusion_counts(
    truth: &Array1<usize>,
    pred: &Array1<usize>,
    num_classes: usize,
) -> Array2<u32> {
    let mut counts = Array2::zeros((num_classes, num_classes));
    for (&t, &p) in truth.iter().zip(pred.iter()) {
        counts[[t, p]] += 1;
    }
    counts
}

/// Renders the counts as a white-to-blue heatmap, truth on rows, prediction
/// on columns.
pub fn write_confusion_matrix(counts: &Array2<u32>, dest: &Path) -> Result<()> {
    let n = counts.nrows() as u32;
    if n == 0 {
        anyhow::bail!("empty confusion matrix");
    }
    let max = counts.iter().copied().max().unwrap_or(0).max(1);

    let mut canvas = RgbImage::from_pixel(n * CELL, n * CELL, Rgb([255, 255, 255]));
    for ((row, col), &value) in counts.indexed_iter() {
        let shade = (255.0 * f64::from(value) / f64::from(max)) as u8;
        let pixel = Rgb([255 - shade, 255 - shade, 255]);
        for y in 0..CELL {
            for x in 0..CELL {
                canvas.put_pixel(col as u32 * CELL + x, row as u32 * CELL + y, pixel);
            }
        }
    }

    canvas
        .save(dest)
        .with_context(|| format!("Write {}", dest.display()))?;
    Ok(())
}

/// Lays the highest-loss validation images out on a grid, worst first
/// (left-to-right, top-to-bottom).
pub fn write_top_losses(worst: &[(PathBuf, f64)], dest: &Path) -> Result<()> {
    let count = worst.len().min((GRID * GRID) as usize);
    if count == 0 {
        anyhow::bail!("no validation samples to render");
    }
    let cols = GRID.min(count as u32);
    let rows = (count as u32).div_ceil(cols);

    let mut canvas = RgbImage::from_pixel(cols * TILE, rows * TILE, Rgb([255, 255, 255]));
    for (i, (path, _loss)) in worst.iter().take(count).enumerate() {
        let decoded = image::ImageReader::open(path)
            .ok()
            .and_then(|r| r.with_guessed_format().ok())
            .and_then(|r| r.decode().ok());
        let Some(img) = decoded else {
            continue;
        };
        let thumb = img.thumbnail(TILE, TILE).to_rgb8();
        let x = i64::from((i as u32 % cols) * TILE);
        let y = i64::from((i as u32 / cols) * TILE);
        image::imageops::replace(&mut canvas, &thumb, x, y);
    }

    canvas
        .save(dest)
        .with_context(|| format!("Write {}", dest.display()))?;
    Ok(())
}
