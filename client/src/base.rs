//! API base resolution.
//!
//! The origin every request is sent to comes from one of two places: the
//! `api_base` override in the local store (honoured only in debug mode) or the
//! build default. Whatever wins is normalised into `scheme://host[/prefix]`
//! form without a trailing slash.

use std::sync::LazyLock;

use rabbit_types::has_http_scheme;
use regex::Regex;

static SINGLE_SLASH_SCHEME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?i)(https?):/([^/])").expect("valid scheme regex"));

static SCHEME_ONLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?i)https?:/*$").expect("valid scheme regex"));

/// Normalise a configured origin.
///
/// Applied in order after trimming whitespace:
/// 1. `http:/host` or `https:/host` becomes `http://host` or `https://host`.
///    Other `word:/` prefixes are left alone, so `localhost:/x` is treated
///    as a host.
/// 2. A value without an `http://` or `https://` prefix gets `http://`.
/// 3. Trailing slashes are removed.
///
/// Blank input, or a bare scheme with no host such as `http:/`, yields an
/// empty string.
#[must_use]
pub fn normalize_api_base(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() || SCHEME_ONLY.is_match(trimmed) {
        return String::new();
    }

    let repaired = SINGLE_SLASH_SCHEME.replace(trimmed, "${1}://${2}");
    let mut base = if has_http_scheme(&repaired) {
        repaired.into_owned()
    } else {
        format!("http://{repaired}")
    };

    let keep = base.trim_end_matches('/').len();
    base.truncate(keep);
    base
}

/// Pick the effective origin for a request.
///
/// `local_override` is consulted only when `debug` is on and it is non-blank.
#[must_use]
pub fn resolve_api_base(debug: bool, local_override: Option<&str>, build_default: &str) -> String {
    let chosen = local_override
        .filter(|_| debug)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(build_default);
    normalize_api_base(chosen)
}
