//! Shannon entropy of a string's character distribution.

use std::collections::BTreeMap;

/// Base-2 Shannon entropy over the characters of `text`.
///
/// Returns exactly `0.0` for the empty string. Symbols are summed in a fixed order so the
/// result is bit-for-bit reproducible.
pub fn shannon_entropy(text: &str) -> f64 {
    let mut counts: BTreeMap<char, usize> = BTreeMap::new();
    let mut total = 0usize;
    for c in text.chars() {
        *counts.entry(c).or_default() += 1;
        total += 1;
    }
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    counts
        .values()
        .map(|&n| {
            let p = n as f64 / total;
            p * (1.0 / p).log2()
        })
        .sum()
}
