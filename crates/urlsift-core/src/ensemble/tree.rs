//! Binary decision trees shared by both base learners.
//!
//! Trees are stored as a flat node array with the root at index 0. A row goes left when
//! `row[feature] <= threshold`. The split objective is pluggable through [`SplitCriterion`]:
//! the forest uses Gini impurity over class counts, boosting uses second-order gain over
//! gradient/hessian sums.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use super::Row;
use crate::features::FEATURE_COUNT;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<Node>,
}

impl DecisionTree {
    pub fn predict(&self, row: &Row) -> f64 {
        let mut idx = 0;
        loop {
            match self.nodes[idx] {
                Node::Leaf { value } => return value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => idx = if row[feature] <= threshold { left } else { right },
            }
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], idx: usize) -> usize {
            match nodes[idx] {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => 1 + walk(nodes, left).max(walk(nodes, right)),
            }
        }
        walk(&self.nodes, 0)
    }

    /// Structural check for trees read from disk: non-empty, children point strictly
    /// forward (no cycles), feature indices in range, finite values.
    pub(crate) fn is_well_formed(&self) -> bool {
        if self.nodes.is_empty() {
            return false;
        }
        self.nodes.iter().enumerate().all(|(idx, node)| match *node {
            Node::Leaf { value } => value.is_finite(),
            Node::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                feature < FEATURE_COUNT
                    && !threshold.is_nan()
                    && left > idx
                    && right > idx
                    && left < self.nodes.len()
                    && right < self.nodes.len()
            }
        })
    }
}

/// Split objective for [`grow`].
pub(crate) trait SplitCriterion {
    /// Additive per-node statistics.
    type Stats: Copy + Default;

    fn sample_stats(&self, sample: usize) -> Self::Stats;
    fn add(a: Self::Stats, b: Self::Stats) -> Self::Stats;
    fn sub(a: Self::Stats, b: Self::Stats) -> Self::Stats;
    fn leaf_value(&self, stats: &Self::Stats) -> f64;
    /// Nothing left to separate at this node.
    fn is_pure(&self, stats: &Self::Stats) -> bool;
    /// Both children satisfy the size/weight constraints.
    fn admissible(&self, left: &Self::Stats, right: &Self::Stats) -> bool;
    /// Improvement of splitting `parent` into `left` and `right`; larger is better.
    fn gain(&self, parent: &Self::Stats, left: &Self::Stats, right: &Self::Stats) -> f64;
    /// Splits must beat this gain.
    fn min_gain(&self) -> f64;
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct GrowParams {
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    /// Features sampled per node; all features when equal to `FEATURE_COUNT`.
    pub features_per_split: usize,
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    feature: usize,
    threshold: f64,
    gain: f64,
}

struct Grower<'a, C: SplitCriterion> {
    criterion: &'a C,
    rows: &'a [Row],
    params: GrowParams,
    rng: Option<&'a mut StdRng>,
    nodes: Vec<Node>,
}

/// Grow a tree over `samples` (indices into `rows`; duplicates allowed for bootstraps).
///
/// `rng` is only consulted when `features_per_split < FEATURE_COUNT`; constant features do
/// not count against that budget.
pub(crate) fn grow<C: SplitCriterion>(
    criterion: &C,
    rows: &[Row],
    samples: Vec<usize>,
    params: GrowParams,
    rng: Option<&mut StdRng>,
) -> DecisionTree {
    let mut grower = Grower {
        criterion,
        rows,
        params,
        rng,
        nodes: Vec::new(),
    };
    grower.grow_node(samples, 0);
    DecisionTree {
        nodes: grower.nodes,
    }
}

impl<C: SplitCriterion> Grower<'_, C> {
    fn grow_node(&mut self, samples: Vec<usize>, depth: usize) -> usize {
        let idx = self.nodes.len();
        let total = samples
            .iter()
            .fold(C::Stats::default(), |acc, &s| C::add(acc, self.criterion.sample_stats(s)));
        self.nodes.push(Node::Leaf {
            value: self.criterion.leaf_value(&total),
        });

        let depth_ok = self.params.max_depth.map_or(true, |max| depth < max);
        if !depth_ok
            || samples.len() < self.params.min_samples_split
            || self.criterion.is_pure(&total)
        {
            return idx;
        }

        let Some(best) = self.best_split(&samples, &total) else {
            return idx;
        };

        let (left, right): (Vec<usize>, Vec<usize>) = samples
            .into_iter()
            .partition(|&s| self.rows[s][best.feature] <= best.threshold);
        let left = self.grow_node(left, depth + 1);
        let right = self.grow_node(right, depth + 1);
        self.nodes[idx] = Node::Split {
            feature: best.feature,
            threshold: best.threshold,
            left,
            right,
        };
        idx
    }

    /// Features in the order they are examined. With an rng and a per-split budget below
    /// `FEATURE_COUNT` this is a random permutation.
    fn feature_order(&mut self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..FEATURE_COUNT).collect();
        if self.params.features_per_split < FEATURE_COUNT {
            if let Some(rng) = self.rng.as_deref_mut() {
                order.shuffle(rng);
            }
        }
        order
    }

    /// Examine features until `features_per_split` non-constant ones have been seen.
    fn best_split(&mut self, samples: &[usize], total: &C::Stats) -> Option<Candidate> {
        let mut best: Option<Candidate> = None;
        let mut order = samples.to_vec();
        let mut examined = 0;
        for feature in self.feature_order() {
            if examined >= self.params.features_per_split {
                break;
            }
            order.sort_by(|&a, &b| self.rows[a][feature].total_cmp(&self.rows[b][feature]));
            let (Some(&first), Some(&last)) = (order.first(), order.last()) else {
                return None;
            };
            if self.rows[first][feature] >= self.rows[last][feature] {
                continue;
            }
            examined += 1;
            let mut left = C::Stats::default();
            for pos in 0..order.len().saturating_sub(1) {
                left = C::add(left, self.criterion.sample_stats(order[pos]));
                let here = self.rows[order[pos]][feature];
                let next = self.rows[order[pos + 1]][feature];
                if here >= next {
                    continue;
                }
                let right = C::sub(*total, left);
                if !self.criterion.admissible(&left, &right) {
                    continue;
                }
                let gain = self.criterion.gain(total, &left, &right);
                let beats_floor = gain > self.criterion.min_gain();
                let beats_best = best.map_or(true, |b| gain > b.gain);
                if beats_floor && beats_best {
                    best = Some(Candidate {
                        feature,
                        threshold: midpoint(here, next),
                        gain,
                    });
                }
            }
        }
        best
    }
}

/// Threshold between two adjacent distinct values; falls back to the lower one when the
/// midpoint rounds up to the upper value.
fn midpoint(lo: f64, hi: f64) -> f64 {
    let mid = lo + (hi - lo) / 2.0;
    if mid >= hi {
        lo
    } else {
        mid
    }
}
