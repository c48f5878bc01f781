//! Dotted-quad detection.
//!
//! The matcher is deliberately loose: any run of four dot-separated 1-3 digit groups counts,
//! including `999.999.999.999` and groups embedded in longer numbers. Trained models depend on
//! this exact definition.

use std::sync::LazyLock;

use regex::Regex;

static IPV4_LITERAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{1,3}\.){3}\d{1,3}").expect("IPv4 literal pattern compiles")
});

/// True if `text` contains a dotted-quad-looking substring anywhere.
pub fn contains_ipv4_literal(text: &str) -> bool {
    IPV4_LITERAL.is_match(text)
}
