//! Random forest: Gini trees on bootstrap samples with per-split feature subsampling.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::tree::{self, DecisionTree, GrowParams, SplitCriterion};
use super::Row;
use crate::config::ForestConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
}

/// Gini impurity over (sample count, malicious count).
struct Gini<'a> {
    targets: &'a [f64],
    min_samples_leaf: f64,
}

impl SplitCriterion for Gini<'_> {
    type Stats = (f64, f64);

    fn sample_stats(&self, sample: usize) -> Self::Stats {
        (1.0, self.targets[sample])
    }

    fn add(a: Self::Stats, b: Self::Stats) -> Self::Stats {
        (a.0 + b.0, a.1 + b.1)
    }

    fn sub(a: Self::Stats, b: Self::Stats) -> Self::Stats {
        (a.0 - b.0, a.1 - b.1)
    }

    fn leaf_value(&self, (n, pos): &Self::Stats) -> f64 {
        if *n > 0.0 {
            pos / n
        } else {
            0.0
        }
    }

    fn is_pure(&self, (n, pos): &Self::Stats) -> bool {
        *pos == 0.0 || pos == n
    }

    fn admissible(&self, left: &Self::Stats, right: &Self::Stats) -> bool {
        left.0 >= self.min_samples_leaf && right.0 >= self.min_samples_leaf
    }

    /// Weighted impurity decrease.
    fn gain(&self, parent: &Self::Stats, left: &Self::Stats, right: &Self::Stats) -> f64 {
        weighted_gini(parent) - weighted_gini(left) - weighted_gini(right)
    }

    /// Any admissible split is taken; children are always strictly smaller.
    fn min_gain(&self) -> f64 {
        f64::NEG_INFINITY
    }
}

/// `n * gini(node)`.
fn weighted_gini((n, pos): &(f64, f64)) -> f64 {
    if *n <= 0.0 {
        return 0.0;
    }
    let p = pos / n;
    n * 2.0 * p * (1.0 - p)
}

impl RandomForest {
    /// Fit `config.n_trees` trees in parallel. Tree `i` draws from its own rng seeded with
    /// `config.seed + i`, so the forest is identical regardless of thread scheduling.
    pub fn fit(rows: &[Row], targets: &[f64], config: &ForestConfig) -> Self {
        let criterion = Gini {
            targets,
            min_samples_leaf: config.min_samples_leaf as f64,
        };
        let params = GrowParams {
            max_depth: config.max_depth,
            min_samples_split: config.min_samples_split,
            features_per_split: config.features_per_split(),
        };
        let n = rows.len();

        let trees: Vec<DecisionTree> = (0..config.n_trees)
            .into_par_iter()
            .map(|i| {
                let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(i as u64));
                let bootstrap: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
                tree::grow(&criterion, rows, bootstrap, params, Some(&mut rng))
            })
            .collect();

        tracing::debug!(
            trees = trees.len(),
            samples = n,
            mean_depth = trees.iter().map(DecisionTree::depth).sum::<usize>() as f64
                / trees.len().max(1) as f64,
            "random forest fitted"
        );
        Self { trees }
    }

    /// Mean of the trees' leaf malicious fractions.
    pub fn predict_proba(&self, row: &Row) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.trees.iter().map(|t| t.predict(row)).sum();
        sum / self.trees.len() as f64
    }

    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }
}
