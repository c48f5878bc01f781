//! Labeled training data: raw CSV rows, label cleaning and feature extraction.

mod loader;

use std::path::Path;

use anyhow::Result;

use crate::features::{extract_batch, FeatureVector};
use crate::label::{normalize_label, Label};

pub use loader::{decode_text, load_csv, TextEncoding};

/// One raw row. `None` means the cell was missing or a recognized NA marker.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LabeledUrl {
    pub url: Option<String>,
    pub label: Option<String>,
}

/// Cleaned rows ready for training; `urls[i]` carries `labels[i]`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    pub urls: Vec<String>,
    pub labels: Vec<Label>,
}

impl Dataset {
    /// [`load_csv`] followed by [`clean_rows`].
    pub fn load(path: &Path) -> Result<Self> {
        let rows = load_csv(path)?;
        let total = rows.len();
        let (dataset, dropped) = clean_rows(rows);
        tracing::info!(
            path = %path.display(),
            total,
            kept = dataset.len(),
            dropped,
            "dataset loaded"
        );
        Ok(dataset)
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn count(&self, label: Label) -> usize {
        self.labels.iter().filter(|&&l| l == label).count()
    }

    pub fn features(&self) -> Vec<FeatureVector> {
        extract_batch(&self.urls)
    }
}

/// Keep rows with a URL and a recognized label; return them with the number dropped.
pub fn clean_rows<I>(rows: I) -> (Dataset, usize)
where
    I: IntoIterator<Item = LabeledUrl>,
{
    let mut dataset = Dataset::default();
    let mut dropped = 0;
    for row in rows {
        let label = normalize_label(row.label.as_deref());
        match (row.url, label) {
            (Some(url), Some(label)) => {
                dataset.urls.push(url);
                dataset.labels.push(label);
            }
            (url, _) => {
                tracing::trace!(?url, raw_label = ?row.label, "row dropped");
                dropped += 1;
            }
        }
    }
    if dropped > 0 {
        tracing::debug!(dropped, "rows without url or recognized label dropped");
    }
    (dataset, dropped)
}
