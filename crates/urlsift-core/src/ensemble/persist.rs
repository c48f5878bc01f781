//! Save and load a trained model as JSON, with a structural check on load.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use super::{GradientBoosting, LogisticRegression, Model, ModelError, RandomForest};
use crate::features::FEATURE_NAMES;

/// Bumped whenever the serialized layout changes.
pub const MODEL_FORMAT_VERSION: u32 = 1;

/// Serialized model fields before validation.
#[derive(Deserialize)]
pub(super) struct ModelRepr {
    format_version: u32,
    feature_names: Vec<String>,
    forest: RandomForest,
    boosting: GradientBoosting,
    meta: LogisticRegression,
}

impl TryFrom<ModelRepr> for Model {
    type Error = ModelError;

    fn try_from(repr: ModelRepr) -> Result<Self, Self::Error> {
        let model = Model {
            format_version: repr.format_version,
            feature_names: repr.feature_names,
            forest: repr.forest,
            boosting: repr.boosting,
            meta: repr.meta,
        };
        model.validate()?;
        Ok(model)
    }
}

impl Model {
    /// Write the model to `path`, creating parent directories if needed.
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create dir: {}", parent.display()))?;
        }
        let json = serde_json::to_string(self).context("serialize model")?;
        std::fs::write(path, json).with_context(|| format!("write model: {}", path.display()))?;
        tracing::info!(path = %path.display(), "model saved");
        Ok(())
    }

    /// Read and validate a model. A missing file is an error: there is no untrained fallback.
    pub fn load_from_path(path: &Path) -> Result<Model> {
        let bytes =
            std::fs::read(path).with_context(|| format!("read model: {}", path.display()))?;
        let model: Model = serde_json::from_slice(&bytes)
            .with_context(|| format!("parse model: {}", path.display()))?;
        tracing::debug!(
            path = %path.display(),
            forest_trees = model.forest.trees().len(),
            boosting_rounds = model.boosting.trees().len(),
            "model loaded"
        );
        Ok(model)
    }

    /// Reject models written by another format version or feature schema, and models whose
    /// trees or meta parameters could not have come out of training.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.format_version != MODEL_FORMAT_VERSION {
            return Err(ModelError::UnsupportedVersion {
                found: self.format_version,
                expected: MODEL_FORMAT_VERSION,
            });
        }
        if !self.feature_names.iter().map(String::as_str).eq(FEATURE_NAMES) {
            return Err(ModelError::SchemaMismatch {
                found: self.feature_names.clone(),
                expected: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
            });
        }
        for (learner, trees) in [
            ("random forest", self.forest.trees()),
            ("gradient boosting", self.boosting.trees()),
        ] {
            if trees.is_empty() {
                return Err(ModelError::NoTrees { learner });
            }
            if !trees.iter().all(|t| t.is_well_formed()) {
                return Err(ModelError::MalformedTree { learner });
            }
        }
        let meta_finite = self.meta.intercept().is_finite()
            && self.meta.weights().iter().all(|w| w.is_finite())
            && self.boosting.base_margin().is_finite();
        if !meta_finite {
            return Err(ModelError::NonFiniteMeta);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BoostingConfig, ForestConfig, TrainingConfig};
    use crate::ensemble::train;
    use crate::features::FeatureVector;
    use crate::label::Label;

    fn small_model() -> Model {
        let mut features = Vec::new();
        let mut labels = Vec::new();
        for i in 0..20 {
            features.push(FeatureVector {
                url_length: 10 + i,
                ..FeatureVector::default()
            });
            labels.push(Label::Benign);
            features.push(FeatureVector {
                url_length: 80 + i,
                has_ip: 1,
                ..FeatureVector::default()
            });
            labels.push(Label::Malicious);
        }
        let cfg = TrainingConfig {
            forest: ForestConfig {
                n_trees: 5,
                ..ForestConfig::default()
            },
            boosting: BoostingConfig {
                n_rounds: 5,
                ..BoostingConfig::default()
            },
            ..TrainingConfig::default()
        };
        train(&features, &labels, &cfg).unwrap().model
    }

    fn tampered(model: &Model, edit: impl FnOnce(&mut serde_json::Value)) -> serde_json::Value {
        let mut value = serde_json::to_value(model).unwrap();
        edit(&mut value);
        value
    }

    /// Validation outcome of an edited model, bypassing serde's error wrapping.
    fn tamper(model: &Model, edit: impl FnOnce(&mut serde_json::Value)) -> Result<Model, ModelError> {
        let repr: ModelRepr = serde_json::from_value(tampered(model, edit)).unwrap();
        Model::try_from(repr)
    }

    #[test]
    fn save_then_load_is_identical() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("model.json");
        let model = small_model();
        model.save_to_path(&path).unwrap();
        let loaded = Model::load_from_path(&path).unwrap();
        assert_eq!(loaded, model);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Model::load_from_path(&dir.path().join("absent.json")).unwrap_err();
        assert!(format!("{err:#}").contains("read model"));
    }

    #[test]
    fn garbage_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(&path, b"{not json").unwrap();
        let err = Model::load_from_path(&path).unwrap_err();
        assert!(format!("{err:#}").contains("parse model"));
    }

    #[test]
    fn wrong_version_is_rejected() {
        assert_eq!(
            tamper(&small_model(), |v| v["format_version"] = 99.into()),
            Err(ModelError::UnsupportedVersion {
                found: 99,
                expected: MODEL_FORMAT_VERSION
            })
        );
    }

    #[test]
    fn schema_mismatch_is_rejected() {
        let renamed = tamper(&small_model(), |v| {
            v["feature_names"][0] = "length".into();
        });
        assert!(matches!(
            renamed,
            Err(ModelError::SchemaMismatch { .. })
        ));

        let short = tamper(&small_model(), |v| {
            if let Some(names) = v["feature_names"].as_array_mut() {
                names.pop();
            }
        });
        assert!(matches!(
            short,
            Err(ModelError::SchemaMismatch { .. })
        ));
    }

    #[test]
    fn broken_trees_are_rejected() {
        let empty = tamper(&small_model(), |v| {
            v["forest"]["trees"] = serde_json::json!([]);
        });
        assert_eq!(
            empty,
            Err(ModelError::NoTrees {
                learner: "random forest"
            })
        );

        let cyclic = tamper(&small_model(), |v| {
            v["boosting"]["trees"][0]["nodes"] = serde_json::json!([
                {"kind": "split", "feature": 0, "threshold": 1.0, "left": 0, "right": 0}
            ]);
        });
        assert_eq!(
            cyclic,
            Err(ModelError::MalformedTree {
                learner: "gradient boosting"
            })
        );
    }

    #[test]
    fn deserializing_a_broken_model_fails() {
        let value = tampered(&small_model(), |v| {
            v["forest"]["trees"][0]["nodes"] = serde_json::json!([
                {"kind": "split", "feature": 0, "threshold": 1.0, "left": 7, "right": 9}
            ]);
        });
        let err = serde_json::from_value::<Model>(value).unwrap_err();
        assert!(err.to_string().contains("random forest contains a malformed tree"));
    }

    #[test]
    fn loading_a_broken_model_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        let value = tampered(&small_model(), |v| v["format_version"] = 2.into());
        std::fs::write(&path, value.to_string()).unwrap();
        let err = Model::load_from_path(&path).unwrap_err();
        assert!(format!("{err:#}").contains("model format version 2 is not supported"));
    }

    #[test]
    fn deserializing_a_valid_model_succeeds() {
        let model = small_model();
        let value = serde_json::to_value(&model).unwrap();
        assert_eq!(serde_json::from_value::<Model>(value).unwrap(), model);
    }
}
