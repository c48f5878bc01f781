//! `urlsift train` – fit and save a model from a labeled CSV file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use urlsift_core::config::UrlsiftConfig;
use urlsift_core::dataset::Dataset;
use urlsift_core::ensemble;
use urlsift_core::label::Label;

pub fn run_train(
    cfg: &UrlsiftConfig,
    data: &Path,
    out: Option<PathBuf>,
    seed: Option<u64>,
) -> Result<()> {
    let mut training = cfg.training.clone();
    if let Some(seed) = seed {
        training.seed = seed;
    }
    let out = match out {
        Some(p) => p,
        None => cfg.resolved_model_path()?,
    };

    let dataset = Dataset::load(data)?;
    println!(
        "Loaded {} rows ({} benign, {} malicious).",
        dataset.len(),
        dataset.count(Label::Benign),
        dataset.count(Label::Malicious)
    );

    let features = dataset.features();
    let outcome = ensemble::train(&features, &dataset.labels, &training)
        .with_context(|| format!("train on {}", data.display()))?;

    println!("{}", outcome.report);
    outcome.model.save_to_path(&out)?;
    println!("Model saved to {}", out.display());
    Ok(())
}
