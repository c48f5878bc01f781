//! JSON shape shared by `urlsift predict --json` and `POST /predict`.

use serde::{Deserialize, Serialize};
use urlsift_core::ensemble::{ClassProbabilities, Prediction};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub url: String,
    /// 0 = benign, 1 = malicious.
    pub prediction: u8,
    pub probabilities: ClassProbabilities,
}

impl PredictionResponse {
    pub fn new(url: String, prediction: &Prediction) -> Self {
        Self {
            url,
            prediction: prediction.label.as_index(),
            probabilities: prediction.probabilities,
        }
    }
}
