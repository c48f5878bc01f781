//! Stacking ensemble: a random forest and gradient-boosted trees whose out-of-fold
//! probabilities feed a logistic-regression meta-learner.
//!
//! A [`Model`] only exists as the result of [`train`] or of loading a saved one; it is
//! immutable afterwards and safe to share across threads.

mod boosting;
mod error;
mod folds;
mod forest;
mod logistic;
mod math;
mod metrics;
mod persist;
mod stacking;
mod tree;

use serde::{Deserialize, Serialize};

use crate::features::{FeatureVector, FEATURE_COUNT, FEATURE_NAMES};
use crate::label::Label;

pub use boosting::GradientBoosting;
pub use error::{ModelError, TrainError};
pub(crate) use folds::stratified_folds;
pub use folds::{stratified_split, Partition};
pub use forest::RandomForest;
pub use logistic::{LogisticRegression, MetaRow};
pub use metrics::{ClassMetrics, EvaluationReport};
pub use persist::MODEL_FORMAT_VERSION;
pub use stacking::{train, TrainingOutcome};
pub use tree::{DecisionTree, Node};

/// Feature vector in schema order, as the learners consume it.
pub type Row = [f64; FEATURE_COUNT];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassProbabilities {
    pub benign: f64,
    pub malicious: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: Label,
    pub probabilities: ClassProbabilities,
}

/// Trained stacking classifier.
///
/// Deserializing runs [`Model::validate`], so a model read from anywhere is always safe to
/// predict with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "persist::ModelRepr")]
pub struct Model {
    format_version: u32,
    feature_names: Vec<String>,
    forest: RandomForest,
    boosting: GradientBoosting,
    meta: LogisticRegression,
}

impl Model {
    pub(crate) fn new(
        forest: RandomForest,
        boosting: GradientBoosting,
        meta: LogisticRegression,
    ) -> Self {
        Self {
            format_version: MODEL_FORMAT_VERSION,
            feature_names: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
            forest,
            boosting,
            meta,
        }
    }

    pub fn predict(&self, features: &FeatureVector) -> Prediction {
        self.predict_row(&features.to_array())
    }

    pub fn predict_batch(&self, features: &[FeatureVector]) -> Vec<Prediction> {
        features.iter().map(|f| self.predict(f)).collect()
    }

    pub(crate) fn predict_row(&self, row: &Row) -> Prediction {
        let meta_input = [
            self.forest.predict_proba(row),
            self.boosting.predict_proba(row),
        ];
        let malicious = self.meta.predict_proba(&meta_input);
        let label = if malicious > 0.5 {
            Label::Malicious
        } else {
            Label::Benign
        };
        Prediction {
            label,
            probabilities: ClassProbabilities {
                benign: 1.0 - malicious,
                malicious,
            },
        }
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn forest(&self) -> &RandomForest {
        &self.forest
    }

    pub fn boosting(&self) -> &GradientBoosting {
        &self.boosting
    }

    pub fn meta(&self) -> &LogisticRegression {
        &self.meta
    }
}
