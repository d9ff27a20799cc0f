//! # URL Normalizer
//!
//! Strips marketing/tracking query parameters so that two links pointing at
//! the same article compare equal once normalized.
//!
//! - The denylist is a value (`TrackingParams`), not a global: exact names plus
//!   name prefixes (`utm_` by default).
//! - Surviving query segments keep their original bytes and order.
//! - Input that does not parse as an absolute URL is returned unchanged.

use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::BTreeSet;
use url::Url;

/// Click identifiers and mailing-list tags dropped by default.
const DEFAULT_EXACT: &[&str] = &[
    "fbclid",
    "gclid",
    "dclid",
    "gbraid",
    "wbraid",
    "msclkid",
    "yclid",
    "twclid",
    "ttclid",
    "igshid",
    "li_fat_id",
    "mc_cid",
    "mc_eid",
    "_hsenc",
    "_hsmi",
];

const DEFAULT_PREFIXES: &[&str] = &["utm_"];

static DEFAULT_PARAMS: Lazy<TrackingParams> = Lazy::new(TrackingParams::default);

/// Set of query-parameter predicates considered tracking noise.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TrackingParams {
    /// Exact parameter names (matched ASCII case-insensitively).
    #[serde(default)]
    pub exact: BTreeSet<String>,
    /// Parameter name prefixes, e.g. `utm_`.
    #[serde(default)]
    pub prefixes: Vec<String>,
}

impl Default for TrackingParams {
    fn default() -> Self {
        Self::new(DEFAULT_EXACT.iter().copied(), DEFAULT_PREFIXES.iter().copied())
    }
}

impl TrackingParams {
    /// Build a denylist; names and prefixes are trimmed and lowercased, empty ones dropped.
    pub fn new<E, P>(exact: E, prefixes: P) -> Self
    where
        E: IntoIterator,
        E::Item: AsRef<str>,
        P: IntoIterator,
        P::Item: AsRef<str>,
    {
        let exact = exact
            .into_iter()
            .map(|s| s.as_ref().trim().to_ascii_lowercase())
            .filter(|s| !s.is_empty())
            .collect();
        let mut prefixes: Vec<String> = prefixes
            .into_iter()
            .map(|s| s.as_ref().trim().to_ascii_lowercase())
            .filter(|s| !s.is_empty())
            .collect();
        prefixes.sort();
        prefixes.dedup();
        Self { exact, prefixes }
    }

    /// Lowercase and clean a deserialized config in place.
    pub fn sanitized(self) -> Self {
        Self::new(self.exact, self.prefixes)
    }

    /// True if `name` (already percent-decoded) is a tracking parameter.
    pub fn is_tracking(&self, name: &str) -> bool {
        let n = name.to_ascii_lowercase();
        self.exact.contains(&n) || self.prefixes.iter().any(|p| n.starts_with(p.as_str()))
    }

    /// Remove tracking parameters from `url`.
    ///
    /// Never fails: unparseable input comes back as-is. When no query
    /// parameters survive, the `?` is dropped as well.
    pub fn normalize_url(&self, url: &str) -> String {
        let Ok(mut parsed) = Url::parse(url) else {
            return url.to_string();
        };

        let Some(query) = parsed.query().map(str::to_owned) else {
            return parsed.into();
        };

        let kept: Vec<&str> = query
            .split('&')
            .filter(|seg| !seg.is_empty())
            .filter(|seg| !self.is_tracking(&segment_name(seg)))
            .collect();

        if kept.is_empty() {
            parsed.set_query(None);
        } else {
            let rebuilt = kept.join("&");
            parsed.set_query(Some(&rebuilt));
        }
        parsed.into()
    }
}

/// Percent-decoded name part of a raw `name=value` query segment.
fn segment_name(seg: &str) -> String {
    let raw = seg.split_once('=').map_or(seg, |(k, _)| k);
    url::form_urlencoded::parse(raw.as_bytes())
        .next()
        .map(|(k, _)| k.into_owned())
        .unwrap_or_default()
}

/// Normalize with the built-in denylist.
pub fn normalize_url(url: &str) -> String {
    DEFAULT_PARAMS.normalize_url(url)
}

/// Shared default denylist.
pub fn default_tracking_params() -> &'static TrackingParams {
    &DEFAULT_PARAMS
}
