//! `urlsift predict` – classify one URL with a saved model.

use std::path::PathBuf;

use anyhow::{Context, Result};
use urlsift_core::config::UrlsiftConfig;
use urlsift_core::ensemble::Model;
use urlsift_core::features::extract;

use super::PredictionResponse;

pub fn run_predict(
    cfg: &UrlsiftConfig,
    url: &str,
    model_path: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let path = match model_path {
        Some(p) => p,
        None => cfg.resolved_model_path()?,
    };
    let model = Model::load_from_path(&path)?;
    let prediction = model.predict(&extract(url));
    tracing::debug!(url, label = %prediction.label, "prediction");

    if json {
        let body = PredictionResponse::new(url.to_string(), &prediction);
        let out = serde_json::to_string(&body).context("serialize prediction")?;
        println!("{out}");
    } else {
        println!(
            "{}  (benign {:.4}, malicious {:.4})",
            prediction.label, prediction.probabilities.benign, prediction.probabilities.malicious
        );
    }
    Ok(())
}
