//! Binary class labels and raw-label normalization.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Benign (0) or malicious (1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Benign,
    Malicious,
}

impl Label {
    /// Numeric class index used on the wire (0 = benign, 1 = malicious).
    pub fn as_index(self) -> u8 {
        match self {
            Label::Benign => 0,
            Label::Malicious => 1,
        }
    }

    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Label::Benign),
            1 => Some(Label::Malicious),
            _ => None,
        }
    }

    pub(crate) fn target(self) -> f64 {
        f64::from(self.as_index())
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Label::Benign => "benign",
            Label::Malicious => "malicious",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a raw dataset label to a class.
///
/// Only the exact strings `"benign"` and `"malicious"` are recognized; anything else,
/// including other threat categories like `"phishing"`, is `None` and the row is dropped.
pub fn normalize_label(raw: Option<&str>) -> Option<Label> {
    match raw? {
        "benign" => Some(Label::Benign),
        "malicious" => Some(Label::Malicious),
        _ => None,
    }
}
