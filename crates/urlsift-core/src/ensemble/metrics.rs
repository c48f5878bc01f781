//! Held-out evaluation: accuracy and per-class precision, recall, F1 and support.

use std::fmt;

use serde::Serialize;

use crate::label::Label;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationReport {
    pub accuracy: f64,
    pub benign: ClassMetrics,
    pub malicious: ClassMetrics,
    pub samples: usize,
}

impl EvaluationReport {
    /// Score predictions against truth. Ratios with a zero denominator are reported as 0.
    pub fn from_predictions(truth: &[Label], predicted: &[Label]) -> Self {
        debug_assert_eq!(truth.len(), predicted.len());
        let samples = truth.len().min(predicted.len());
        let correct = truth
            .iter()
            .zip(predicted)
            .filter(|(t, p)| t == p)
            .count();

        Self {
            accuracy: ratio(correct, samples),
            benign: class_metrics(truth, predicted, Label::Benign),
            malicious: class_metrics(truth, predicted, Label::Malicious),
            samples,
        }
    }

    pub fn class(&self, label: Label) -> &ClassMetrics {
        match label {
            Label::Benign => &self.benign,
            Label::Malicious => &self.malicious,
        }
    }
}

fn class_metrics(truth: &[Label], predicted: &[Label], class: Label) -> ClassMetrics {
    let mut tp = 0;
    let mut fp = 0;
    let mut fn_ = 0;
    for (&t, &p) in truth.iter().zip(predicted) {
        match (t == class, p == class) {
            (true, true) => tp += 1,
            (false, true) => fp += 1,
            (true, false) => fn_ += 1,
            (false, false) => {}
        }
    }
    let precision = ratio(tp, tp + fp);
    let recall = ratio(tp, tp + fn_);
    let f1 = if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    };
    ClassMetrics {
        precision,
        recall,
        f1,
        support: tp + fn_,
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:>12} {:>10} {:>10} {:>10} {:>10}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        for label in [Label::Benign, Label::Malicious] {
            let m = self.class(label);
            writeln!(
                f,
                "{:>12} {:>10.4} {:>10.4} {:>10.4} {:>10}",
                label.as_str(),
                m.precision,
                m.recall,
                m.f1,
                m.support
            )?;
        }
        write!(f, "{:>12} {:>10.4} ({} samples)", "accuracy", self.accuracy, self.samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::label::Label::{Benign as B, Malicious as M};

    #[test]
    fn counts_match_hand_computation() {
        let truth = [B, B, B, M, M];
        let predicted = [B, M, B, M, B];
        let r = EvaluationReport::from_predictions(&truth, &predicted);
        assert_eq!(r.samples, 5);
        assert!((r.accuracy - 0.6).abs() < 1e-12);
        assert!((r.benign.precision - 2.0 / 3.0).abs() < 1e-12);
        assert!((r.benign.recall - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(r.benign.support, 3);
        assert!((r.malicious.precision - 0.5).abs() < 1e-12);
        assert!((r.malicious.recall - 0.5).abs() < 1e-12);
        assert!((r.malicious.f1 - 0.5).abs() < 1e-12);
        assert_eq!(r.malicious.support, 2);
    }

    #[test]
    fn zero_division_reports_zero() {
        let r = EvaluationReport::from_predictions(&[B, B], &[B, B]);
        assert_eq!(r.malicious, ClassMetrics::default());
        assert_eq!(r.accuracy, 1.0);

        let empty = EvaluationReport::from_predictions(&[], &[]);
        assert_eq!(empty.accuracy, 0.0);
        assert_eq!(empty.samples, 0);
    }

    #[test]
    fn display_lists_both_classes() {
        let r = EvaluationReport::from_predictions(&[B, M], &[B, M]);
        let text = r.to_string();
        assert!(text.contains("benign"));
        assert!(text.contains("malicious"));
        assert!(text.contains("accuracy"));
        assert!(text.contains("1.0000"));
    }
}
