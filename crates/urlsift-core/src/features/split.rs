//! Generic `scheme://netloc/path;params?query#fragment` splitting.
//!
//! No DNS, no percent-decoding, no host canonicalization. The only inputs that are
//! rejected are authorities with broken IPv6 brackets.

use std::net::Ipv6Addr;

use thiserror::Error;

/// Schemes whose last path segment may carry `;params`.
const SCHEMES_WITH_PARAMS: &[&str] = &[
    "", "ftp", "hdl", "prospero", "http", "imap", "https", "shttp", "rtsp", "rtsps", "rtspu",
    "sip", "sips", "mms", "sftp", "tel",
];

/// Components of a split URL. All fields may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlParts {
    /// Lowercased scheme, without the trailing `:`.
    pub scheme: String,
    /// Authority (`user@host:port`), without the leading `//`.
    pub netloc: String,
    pub path: String,
    pub params: String,
    pub query: String,
    pub fragment: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SplitError {
    #[error("authority {0:?} has an unbalanced '[' or ']'")]
    UnbalancedBrackets(String),
    #[error("bracketed host {0:?} is not an IPv6 or IPvFuture literal")]
    InvalidBracketedHost(String),
}

/// Split `url` into its generic components.
pub fn split_url(url: &str) -> Result<UrlParts, SplitError> {
    let cleaned: String = url
        .trim_start_matches(|c: char| c <= ' ')
        .chars()
        .filter(|c| !matches!(c, '\t' | '\r' | '\n'))
        .collect();
    let mut rest = cleaned.as_str();

    let mut scheme = String::new();
    if let Some((candidate, tail)) = rest.split_once(':') {
        if is_scheme(candidate) {
            scheme = candidate.to_ascii_lowercase();
            rest = tail;
        }
    }

    let mut netloc = "";
    if let Some(after) = rest.strip_prefix("//") {
        let end = after.find(['/', '?', '#']).unwrap_or(after.len());
        netloc = &after[..end];
        rest = &after[end..];
        check_brackets(netloc)?;
    }

    let (rest, fragment) = rest.split_once('#').unwrap_or((rest, ""));
    let (path, query) = rest.split_once('?').unwrap_or((rest, ""));
    let (path, params) = if SCHEMES_WITH_PARAMS.contains(&scheme.as_str()) {
        split_params(path)
    } else {
        (path, "")
    };

    Ok(UrlParts {
        scheme,
        netloc: netloc.to_string(),
        path: path.to_string(),
        params: params.to_string(),
        query: query.to_string(),
        fragment: fragment.to_string(),
    })
}

fn is_scheme(candidate: &str) -> bool {
    let mut chars = candidate.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// `;params` only ever attach to the last path segment.
fn split_params(path: &str) -> (&str, &str) {
    let search_from = path.rfind('/').unwrap_or(0);
    match path[search_from..].find(';') {
        Some(offset) => {
            let at = search_from + offset;
            (&path[..at], &path[at + 1..])
        }
        None => (path, ""),
    }
}

fn check_brackets(netloc: &str) -> Result<(), SplitError> {
    let open = netloc.contains('[');
    let close = netloc.contains(']');
    if open != close {
        return Err(SplitError::UnbalancedBrackets(netloc.to_string()));
    }
    if !open {
        return Ok(());
    }
    let (_, after_open) = netloc.split_once('[').unwrap_or(("", netloc));
    let host = after_open.split_once(']').map_or(after_open, |(host, _)| host);
    if is_ipvfuture(host) || is_ipv6_literal(host) {
        Ok(())
    } else {
        Err(SplitError::InvalidBracketedHost(host.to_string()))
    }
}

/// IPv6 address with an optional non-empty `%zone` suffix.
fn is_ipv6_literal(host: &str) -> bool {
    let addr = match host.split_once('%') {
        Some((addr, zone)) if !zone.is_empty() && !zone.contains('%') => addr,
        Some(_) => return false,
        None => host,
    };
    addr.parse::<Ipv6Addr>().is_ok()
}

/// `v<hex>.<anything>` per RFC 3986.
fn is_ipvfuture(host: &str) -> bool {
    let Some(rest) = host.strip_prefix('v') else {
        return false;
    };
    match rest.split_once('.') {
        Some((version, tail)) => {
            !version.is_empty() && version.chars().all(|c| c.is_ascii_hexdigit()) && !tail.is_empty()
        }
        None => false,
    }
}
