//! `urlsift features` – print the feature vector of a URL.

use anyhow::{Context, Result};
use urlsift_core::features::extract;

pub fn run_features(url: &str) -> Result<()> {
    let features = extract(url);
    let json = serde_json::to_string_pretty(&features).context("serialize features")?;
    println!("{json}");
    Ok(())
}
