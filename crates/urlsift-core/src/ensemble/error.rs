//! Training precondition and model validation errors.

use thiserror::Error;

use crate::label::Label;

/// Training refused to start. No partial model is ever produced.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrainError {
    #[error("training set is empty")]
    Empty,
    #[error("{features} feature rows but {labels} labels")]
    LengthMismatch { features: usize, labels: usize },
    #[error("training set only contains {present} samples; both classes are required")]
    SingleClass { present: Label },
    #[error(
        "minority class has {found} samples in the training partition; {folds}-fold stacking needs at least {folds}"
    )]
    TooFewMinority { found: usize, folds: usize },
    #[error("invalid training config: {0}")]
    InvalidConfig(String),
}

/// A deserialized model that cannot be used safely.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("model format version {found} is not supported (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
    #[error("model feature schema {found:?} does not match {expected:?}")]
    SchemaMismatch {
        found: Vec<String>,
        expected: Vec<String>,
    },
    #[error("{learner} contains a malformed tree")]
    MalformedTree { learner: &'static str },
    #[error("{learner} has no trees")]
    NoTrees { learner: &'static str },
    #[error("meta-learner parameters are not finite")]
    NonFiniteMeta,
}
