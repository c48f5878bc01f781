//! L2-regularized logistic regression over the two base-learner probabilities.
//!
//! Minimizes `Σ logloss + ‖w‖² / (2C)` (intercept unpenalized) with damped Newton steps.
//! With three parameters the Hessian is solved directly.

use serde::{Deserialize, Serialize};

use super::math::{sigmoid, softplus, solve3};
use crate::config::MetaConfig;

/// Meta-learner input: `[p_forest, p_boosting]`.
pub type MetaRow = [f64; 2];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    intercept: f64,
    weights: [f64; 2],
}

impl LogisticRegression {
    pub fn fit(inputs: &[MetaRow], targets: &[f64], config: &MetaConfig) -> Self {
        let penalty = 1.0 / config.c;
        // theta = [intercept, w0, w1]
        let mut theta = [0.0f64; 3];
        let mut current = penalized_loss(&theta, inputs, targets, penalty);
        let mut iterations = 0;

        for _ in 0..config.max_iter {
            iterations += 1;
            let mut grad = [0.0, penalty * theta[1], penalty * theta[2]];
            let mut hess = [[0.0; 3], [0.0, penalty, 0.0], [0.0, 0.0, penalty]];
            for (x, &y) in inputs.iter().zip(targets) {
                let z = [1.0, x[0], x[1]];
                let p = sigmoid(linear(&theta, x));
                let w = p * (1.0 - p);
                for i in 0..3 {
                    grad[i] += (p - y) * z[i];
                    for j in 0..3 {
                        hess[i][j] += w * z[i] * z[j];
                    }
                }
            }
            // A tiny ridge keeps the intercept row solvable when every p saturates.
            hess[0][0] += 1e-12;
            let Some(step) = solve3(hess, grad) else {
                tracing::warn!("meta-learner Hessian is singular; stopping early");
                break;
            };

            let mut scale = 1.0;
            let mut candidate = theta;
            let mut candidate_loss = current;
            while scale > 1e-10 {
                for i in 0..3 {
                    candidate[i] = theta[i] - scale * step[i];
                }
                candidate_loss = penalized_loss(&candidate, inputs, targets, penalty);
                if candidate_loss <= current {
                    break;
                }
                scale *= 0.5;
            }
            if candidate_loss > current {
                break;
            }

            let max_step = step.iter().map(|s| (s * scale).abs()).fold(0.0, f64::max);
            theta = candidate;
            current = candidate_loss;
            if max_step < config.tol {
                break;
            }
        }

        tracing::debug!(
            iterations,
            intercept = theta[0],
            w_forest = theta[1],
            w_boosting = theta[2],
            "meta-learner fitted"
        );
        Self {
            intercept: theta[0],
            weights: [theta[1], theta[2]],
        }
    }

    /// Probability of the malicious class.
    pub fn predict_proba(&self, x: &MetaRow) -> f64 {
        sigmoid(self.intercept + self.weights[0] * x[0] + self.weights[1] * x[1])
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn weights(&self) -> [f64; 2] {
        self.weights
    }
}

fn linear(theta: &[f64; 3], x: &MetaRow) -> f64 {
    theta[0] + theta[1] * x[0] + theta[2] * x[1]
}

fn penalized_loss(theta: &[f64; 3], inputs: &[MetaRow], targets: &[f64], penalty: f64) -> f64 {
    let loss: f64 = inputs
        .iter()
        .zip(targets)
        .map(|(x, &y)| {
            let z = linear(theta, x);
            softplus(z) - y * z
        })
        .sum();
    loss + 0.5 * penalty * (theta[1] * theta[1] + theta[2] * theta[2])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overlapping_data() -> (Vec<MetaRow>, Vec<f64>) {
        let mut inputs = Vec::new();
        let mut targets = Vec::new();
        for i in 0..50 {
            let p = i as f64 / 49.0;
            // First input is informative, second is noise.
            inputs.push([p, ((i * 17) % 11) as f64 / 10.0]);
            // Labels flip a few times near the middle so the data is not separable.
            let y = if (20..30).contains(&i) { (i % 2) as f64 } else if p > 0.5 { 1.0 } else { 0.0 };
            targets.push(y);
        }
        (inputs, targets)
    }

    #[test]
    fn learns_positive_weight_on_informative_input() {
        let (inputs, targets) = overlapping_data();
        let model = LogisticRegression::fit(&inputs, &targets, &MetaConfig::default());
        assert!(model.weights()[0] > 1.0);
        assert!(model.weights()[0].abs() > model.weights()[1].abs());
        assert!(model.predict_proba(&[0.0, 0.5]) < 0.5);
        assert!(model.predict_proba(&[1.0, 0.5]) > 0.5);
    }

    #[test]
    fn converges_to_stationary_point() {
        let (inputs, targets) = overlapping_data();
        let cfg = MetaConfig::default();
        let model = LogisticRegression::fit(&inputs, &targets, &cfg);
        let theta = [model.intercept(), model.weights()[0], model.weights()[1]];
        let mut grad = [0.0, theta[1] / cfg.c, theta[2] / cfg.c];
        for (x, &y) in inputs.iter().zip(&targets) {
            let r = sigmoid(linear(&theta, x)) - y;
            grad[0] += r;
            grad[1] += r * x[0];
            grad[2] += r * x[1];
        }
        for g in grad {
            assert!(g.abs() < 1e-6, "gradient component {g}");
        }
    }

    #[test]
    fn separable_data_stays_finite() {
        let inputs: Vec<MetaRow> = vec![[0.0, 0.0], [0.1, 0.0], [0.9, 1.0], [1.0, 1.0]];
        let targets = vec![0.0, 0.0, 1.0, 1.0];
        let model = LogisticRegression::fit(&inputs, &targets, &MetaConfig::default());
        assert!(model.intercept().is_finite());
        assert!(model.weights().iter().all(|w| w.is_finite()));
        assert!(model.predict_proba(&[1.0, 1.0]) > 0.5);
    }

    #[test]
    fn stronger_regularization_shrinks_weights() {
        let (inputs, targets) = overlapping_data();
        let loose = LogisticRegression::fit(&inputs, &targets, &MetaConfig::default());
        let tight = LogisticRegression::fit(
            &inputs,
            &targets,
            &MetaConfig {
                c: 0.01,
                ..MetaConfig::default()
            },
        );
        assert!(tight.weights()[0].abs() < loose.weights()[0].abs());
    }
}
