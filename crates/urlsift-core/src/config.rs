use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::ensemble::TrainError;
use crate::features::FEATURE_COUNT;

/// Random forest (bagging) base learner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestConfig {
    pub n_trees: usize,
    /// Maximum tree depth; unlimited when absent.
    pub max_depth: Option<usize>,
    /// A node needs at least this many samples to be split.
    pub min_samples_split: usize,
    /// Each child of a split keeps at least this many samples.
    pub min_samples_leaf: usize,
    /// Features considered per split; `sqrt(feature count)` when absent.
    pub max_features: Option<usize>,
    /// Base seed for bootstrap sampling and feature subsets.
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            seed: 1,
        }
    }
}

impl ForestConfig {
    pub fn features_per_split(&self) -> usize {
        self.max_features
            .unwrap_or_else(|| (FEATURE_COUNT as f64).sqrt() as usize)
            .clamp(1, FEATURE_COUNT)
    }
}

/// Gradient-boosted trees (logistic loss) base learner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoostingConfig {
    pub n_rounds: usize,
    /// Shrinkage applied to every leaf weight.
    pub learning_rate: f64,
    pub max_depth: usize,
    /// L2 penalty on leaf weights.
    pub lambda: f64,
    /// Minimum loss reduction required to split.
    pub gamma: f64,
    /// Minimum hessian sum per child.
    pub min_child_weight: f64,
}

impl Default for BoostingConfig {
    fn default() -> Self {
        Self {
            n_rounds: 100,
            learning_rate: 0.3,
            max_depth: 6,
            lambda: 1.0,
            gamma: 0.0,
            min_child_weight: 1.0,
        }
    }
}

/// Logistic-regression meta-learner over the two base probabilities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetaConfig {
    /// Inverse L2 regularization strength (the intercept is not penalized).
    pub c: f64,
    pub max_iter: usize,
    /// Newton iterations stop once the largest parameter step falls below this.
    pub tol: f64,
}

impl Default for MetaConfig {
    fn default() -> Self {
        Self {
            c: 1.0,
            max_iter: 1000,
            tol: 1e-8,
        }
    }
}

/// Stacking protocol parameters (optional `[training]` section in config.toml).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Fraction of each class held out for evaluation.
    pub test_fraction: f64,
    /// Folds used to produce out-of-fold base predictions for the meta-learner.
    pub cv_folds: usize,
    /// Seed for the stratified train/evaluation shuffle.
    pub seed: u64,
    pub forest: ForestConfig,
    pub boosting: BoostingConfig,
    pub meta: MetaConfig,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            test_fraction: 0.3,
            cv_folds: 5,
            seed: 42,
            forest: ForestConfig::default(),
            boosting: BoostingConfig::default(),
            meta: MetaConfig::default(),
        }
    }
}

impl TrainingConfig {
    /// Reject hyperparameters the learners cannot work with.
    pub fn validate(&self) -> Result<(), TrainError> {
        let invalid = |msg: &str| Err(TrainError::InvalidConfig(msg.to_string()));
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return invalid("test_fraction must be in (0, 1)");
        }
        if self.cv_folds < 2 {
            return invalid("cv_folds must be at least 2");
        }
        if self.forest.n_trees == 0 {
            return invalid("forest.n_trees must be at least 1");
        }
        if self.forest.min_samples_split < 2 {
            return invalid("forest.min_samples_split must be at least 2");
        }
        if self.forest.min_samples_leaf == 0 {
            return invalid("forest.min_samples_leaf must be at least 1");
        }
        if matches!(self.forest.max_features, Some(n) if n == 0 || n > FEATURE_COUNT) {
            return invalid("forest.max_features must be between 1 and the feature count");
        }
        if self.boosting.n_rounds == 0 {
            return invalid("boosting.n_rounds must be at least 1");
        }
        if !(self.boosting.learning_rate > 0.0) {
            return invalid("boosting.learning_rate must be positive");
        }
        if self.boosting.max_depth == 0 {
            return invalid("boosting.max_depth must be at least 1");
        }
        if !(self.boosting.lambda >= 0.0 && self.boosting.gamma >= 0.0) {
            return invalid("boosting.lambda and boosting.gamma must be non-negative");
        }
        if !(self.boosting.min_child_weight >= 0.0) {
            return invalid("boosting.min_child_weight must be non-negative");
        }
        if !(self.meta.c > 0.0) {
            return invalid("meta.c must be positive");
        }
        if self.meta.max_iter == 0 {
            return invalid("meta.max_iter must be at least 1");
        }
        Ok(())
    }
}

/// HTTP prediction endpoint settings (optional `[server]` section).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    /// Allow any origin (mobile and browser clients call the endpoint directly).
    pub cors_permissive: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:5000".to_string(),
            cors_permissive: true,
        }
    }
}

/// Global configuration loaded from `~/.config/urlsift/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UrlsiftConfig {
    /// Where `train` writes and `predict`/`serve` read the model; XDG data dir when absent.
    #[serde(default)]
    pub model_path: Option<PathBuf>,
    #[serde(default)]
    pub training: TrainingConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

impl UrlsiftConfig {
    /// Configured model path, or `~/.local/share/urlsift/model.json`.
    pub fn resolved_model_path(&self) -> Result<PathBuf> {
        match &self.model_path {
            Some(p) => Ok(p.clone()),
            None => default_model_path(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("urlsift")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

pub fn default_model_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("urlsift")?;
    Ok(xdg_dirs.get_data_home().join("urlsift").join("model.json"))
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<UrlsiftConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = UrlsiftConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: UrlsiftConfig = toml::from_str(&data)?;
    Ok(cfg)
}
