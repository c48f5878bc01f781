//! Gradient-boosted trees on logistic loss.
//!
//! Each round fits a tree to the loss gradient and hessian at the current margins using the
//! second-order gain `G_L²/(H_L+λ) + G_R²/(H_R+λ) - G²/(H+λ)`, and adds shrunken leaf weights
//! `-η·G/(H+λ)` to the margins.

use serde::{Deserialize, Serialize};

use super::math::{sigmoid, softplus};
use super::tree::{self, DecisionTree, GrowParams, SplitCriterion};
use super::Row;
use crate::config::BoostingConfig;
use crate::features::FEATURE_COUNT;

/// Keeps leaf weights finite when every sample in a node is already fit perfectly.
const MIN_HESSIAN: f64 = 1e-16;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientBoosting {
    base_margin: f64,
    trees: Vec<DecisionTree>,
}

struct SecondOrder<'a> {
    grad: &'a [f64],
    hess: &'a [f64],
    config: &'a BoostingConfig,
}

impl SecondOrder<'_> {
    fn score(&self, (g, h): &(f64, f64)) -> f64 {
        g * g / (h + self.config.lambda)
    }
}

impl SplitCriterion for SecondOrder<'_> {
    type Stats = (f64, f64);

    fn sample_stats(&self, sample: usize) -> Self::Stats {
        (self.grad[sample], self.hess[sample])
    }

    fn add(a: Self::Stats, b: Self::Stats) -> Self::Stats {
        (a.0 + b.0, a.1 + b.1)
    }

    fn sub(a: Self::Stats, b: Self::Stats) -> Self::Stats {
        (a.0 - b.0, a.1 - b.1)
    }

    fn leaf_value(&self, (g, h): &Self::Stats) -> f64 {
        let denom = h + self.config.lambda;
        if denom <= 0.0 {
            return 0.0;
        }
        -self.config.learning_rate * g / denom
    }

    fn is_pure(&self, _stats: &Self::Stats) -> bool {
        false
    }

    fn admissible(&self, left: &Self::Stats, right: &Self::Stats) -> bool {
        left.1 >= self.config.min_child_weight && right.1 >= self.config.min_child_weight
    }

    fn gain(&self, parent: &Self::Stats, left: &Self::Stats, right: &Self::Stats) -> f64 {
        0.5 * (self.score(left) + self.score(right) - self.score(parent)) - self.config.gamma
    }

    /// Ignore splits whose gain is rounding noise.
    fn min_gain(&self) -> f64 {
        1e-6
    }
}

impl GradientBoosting {
    pub fn fit(rows: &[Row], targets: &[f64], config: &BoostingConfig) -> Self {
        let n = rows.len();
        let base_margin = 0.0;
        let mut margins = vec![base_margin; n];
        let mut grad = vec![0.0; n];
        let mut hess = vec![0.0; n];
        let mut trees = Vec::with_capacity(config.n_rounds);
        let params = GrowParams {
            max_depth: Some(config.max_depth),
            min_samples_split: 2,
            features_per_split: FEATURE_COUNT,
        };

        for round in 0..config.n_rounds {
            for i in 0..n {
                let p = sigmoid(margins[i]);
                grad[i] = p - targets[i];
                hess[i] = (p * (1.0 - p)).max(MIN_HESSIAN);
            }
            let criterion = SecondOrder {
                grad: &grad,
                hess: &hess,
                config,
            };
            let tree = tree::grow(&criterion, rows, (0..n).collect(), params, None);
            for (margin, row) in margins.iter_mut().zip(rows) {
                *margin += tree.predict(row);
            }
            trees.push(tree);

            if tracing::enabled!(tracing::Level::TRACE) {
                let loss = log_loss(&margins, targets);
                tracing::trace!(round, loss, "boosting round");
            }
        }

        tracing::debug!(
            rounds = trees.len(),
            samples = n,
            train_log_loss = log_loss(&margins, targets),
            "gradient boosting fitted"
        );
        Self { base_margin, trees }
    }

    pub fn margin(&self, row: &Row) -> f64 {
        self.base_margin + self.trees.iter().map(|t| t.predict(row)).sum::<f64>()
    }

    /// Probability of the malicious class.
    pub fn predict_proba(&self, row: &Row) -> f64 {
        sigmoid(self.margin(row))
    }

    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    pub(crate) fn base_margin(&self) -> f64 {
        self.base_margin
    }
}

/// Mean logistic loss of raw margins.
fn log_loss(margins: &[f64], targets: &[f64]) -> f64 {
    if margins.is_empty() {
        return 0.0;
    }
    let total: f64 = margins
        .iter()
        .zip(targets)
        .map(|(&m, &y)| softplus(m) - y * m)
        .sum();
    total / margins.len() as f64
}
