//! Class-stratified partitioning: the held-out evaluation split and the k-fold assignment
//! used for out-of-fold stacking predictions.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::label::Label;

/// Indices into the original rows, both sorted ascending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Shuffle each class with a seeded rng and hold out `round(test_fraction * class_size)` of
/// it. A class with at least two members always keeps one in each partition.
pub fn stratified_split(labels: &[Label], test_fraction: f64, seed: u64) -> Partition {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::new();
    let mut test = Vec::new();

    for class in [Label::Benign, Label::Malicious] {
        let mut members: Vec<usize> = labels
            .iter()
            .enumerate()
            .filter(|&(_, &l)| l == class)
            .map(|(i, _)| i)
            .collect();
        members.shuffle(&mut rng);

        let n = members.len();
        let mut n_test = (test_fraction * n as f64).round() as usize;
        if n >= 2 {
            n_test = n_test.clamp(1, n - 1);
        } else {
            n_test = 0;
        }
        test.extend_from_slice(&members[..n_test]);
        train.extend_from_slice(&members[n_test..]);
    }

    train.sort_unstable();
    test.sort_unstable();
    Partition { train, test }
}

/// Fold id for every row: the j-th row of each class (in input order) goes to fold `j % k`.
/// Every fold therefore sees each class in roughly the original proportion. `k == 0` is
/// treated as a single fold.
pub(crate) fn stratified_folds(labels: &[Label], k: usize) -> Vec<usize> {
    let k = k.max(1);
    let mut seen = [0usize; 2];
    labels
        .iter()
        .map(|label| {
            let slot = &mut seen[usize::from(label.as_index())];
            let fold = *slot % k;
            *slot += 1;
            fold
        })
        .collect()
}
