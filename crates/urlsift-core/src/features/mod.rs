//! Lexical URL features.
//!
//! [`extract`] turns a raw URL into a fixed nine-column [`FeatureVector`]. It never fails: a URL
//! the splitter rejects yields [`FeatureVector::zero`], so batch extraction over noisy
//! datasets always produces one row per input.
//!
//! Column order is part of every trained model. Reordering [`FEATURE_NAMES`] or changing a
//! feature definition invalidates existing model files.

mod entropy;
mod ip;
mod split;

pub use entropy::shannon_entropy;
pub use ip::contains_ipv4_literal;
pub use split::{split_url, SplitError, UrlParts};

use std::sync::LazyLock;

use rayon::prelude::*;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Number of model input columns.
pub const FEATURE_COUNT: usize = 9;

/// Model input columns, in order.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "url_length",
    "num_digits",
    "num_special_chars",
    "has_https",
    "domain_entropy",
    "num_subdomains",
    "path_depth",
    "num_query_params",
    "has_ip",
];

/// Bracketed dot used to defang URLs in threat feeds (`evil[.]com`).
const OBFUSCATED_DOT: &str = "[.]";
const WWW_PREFIX: &str = "www.";

static DECIMAL_DIGIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d").expect("digit pattern compiles"));

/// One URL's features. Field order matches [`FEATURE_NAMES`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FeatureVector {
    pub url_length: usize,
    pub num_digits: usize,
    pub num_special_chars: usize,
    pub has_https: u8,
    pub domain_entropy: f64,
    pub num_subdomains: usize,
    pub path_depth: usize,
    pub num_query_params: usize,
    pub has_ip: u8,
}

impl FeatureVector {
    /// All-zero vector used when a URL cannot be split.
    pub fn zero() -> Self {
        Self::default()
    }

    /// Model input row in [`FEATURE_NAMES`] order.
    pub fn to_array(&self) -> [f64; FEATURE_COUNT] {
        [
            self.url_length as f64,
            self.num_digits as f64,
            self.num_special_chars as f64,
            f64::from(self.has_https),
            self.domain_entropy,
            self.num_subdomains as f64,
            self.path_depth as f64,
            self.num_query_params as f64,
            f64::from(self.has_ip),
        ]
    }
}

/// Undo `[.]` defanging. Applied once, before anything else looks at the URL.
pub fn normalize_url(url: &str) -> String {
    url.replace(OBFUSCATED_DOT, ".")
}

/// Extract features from a raw URL.
pub fn extract(url: &str) -> FeatureVector {
    let url = normalize_url(url);
    match split_url(&url) {
        Ok(parts) => features_from_parts(&url, &parts),
        Err(err) => {
            tracing::debug!(error = %err, "url not splittable, using zero feature vector");
            FeatureVector::zero()
        }
    }
}

/// Extract features for many URLs in parallel. Output order follows input order.
pub fn extract_batch<S>(urls: &[S]) -> Vec<FeatureVector>
where
    S: AsRef<str> + Sync,
{
    urls.par_iter().map(|u| extract(u.as_ref())).collect()
}

fn features_from_parts(url: &str, parts: &UrlParts) -> FeatureVector {
    let domain = parts
        .netloc
        .strip_prefix(WWW_PREFIX)
        .unwrap_or(&parts.netloc);

    FeatureVector {
        url_length: url.chars().count(),
        num_digits: DECIMAL_DIGIT.find_iter(url).count(),
        num_special_chars: url.chars().filter(|c| !c.is_ascii_alphanumeric()).count(),
        has_https: u8::from(parts.scheme == "https"),
        domain_entropy: shannon_entropy(domain),
        num_subdomains: domain.matches('.').count().saturating_sub(1),
        path_depth: parts.path.split('/').filter(|s| !s.is_empty()).count(),
        num_query_params: if parts.query.is_empty() {
            0
        } else {
            parts.query.split('&').count()
        },
        has_ip: u8::from(contains_ipv4_literal(url)),
    }
}
