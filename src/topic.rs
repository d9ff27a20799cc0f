//! Topic keys: a coarse, exact-match story identifier derived from an
//! article's title and tracking-free link.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

use crate::normalize::{default_tracking_params, TrackingParams};

/// Number of digest bytes kept in a key (hex-encoded → 32 chars).
const KEY_BYTES: usize = 16;

/// Deterministic grouping key for "the same story".
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TopicKey(String);

impl TopicKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TopicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TopicKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Which article fields feed the grouping key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyPolicy {
    /// Normalized title + normalized URL.
    #[default]
    TitleAndUrl,
    /// Normalized title only; same headline from different links groups together.
    TitleOnly,
}

impl KeyPolicy {
    /// Parse `title_and_url` / `title_only` (case-insensitive, `-` allowed).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "title_and_url" | "title_url" | "default" => Some(Self::TitleAndUrl),
            "title_only" | "title" => Some(Self::TitleOnly),
            _ => None,
        }
    }

    pub fn key_for(self, title: &str, url: &str, params: &TrackingParams) -> TopicKey {
        match self {
            Self::TitleAndUrl => generate_topic_key_with(title, url, params),
            Self::TitleOnly => digest_key(&normalize_title(title), ""),
        }
    }
}

/// Trim surrounding whitespace and lowercase (`str::to_lowercase`).
/// This is lowercasing, not full Unicode case folding: "STRASSE" and
/// "straße" stay distinct.
pub fn normalize_title(title: &str) -> String {
    title.trim().to_lowercase()
}

/// Key from title + link, using the built-in tracking denylist.
pub fn generate_topic_key(title: &str, url: &str) -> TopicKey {
    generate_topic_key_with(title, url, default_tracking_params())
}

/// Key from title + link with an explicit denylist.
pub fn generate_topic_key_with(title: &str, url: &str, params: &TrackingParams) -> TopicKey {
    digest_key(&normalize_title(title), &params.normalize_url(url))
}

// Each part is length-prefixed so ("a|b", "c") and ("a", "b|c") cannot collide.
fn digest_key(title: &str, url: &str) -> TopicKey {
    let mut hasher = Sha256::new();
    hasher.update((title.len() as u64).to_be_bytes());
    hasher.update(title.as_bytes());
    hasher.update((url.len() as u64).to_be_bytes());
    hasher.update(url.as_bytes());
    let digest = hasher.finalize();

    let mut out = String::with_capacity(KEY_BYTES * 2);
    for b in digest.iter().take(KEY_BYTES) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    TopicKey(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_inputs_same_key() {
        let a = generate_topic_key("Renewable Energy Growth", "https://example.com/article1");
        let b = generate_topic_key("Renewable Energy Growth", "https://example.com/article1");
        assert_eq!(a, b);
        assert_eq!(a.as_str().len(), 32);
    }

    #[test]
    fn different_inputs_diverge() {
        let a = generate_topic_key("Renewable Energy Growth", "https://example.com/article1");
        let b = generate_topic_key("Solar Panel Innovation", "https://example.com/article2");
        assert_ne!(a, b);
    }

    #[test]
    fn case_and_outer_whitespace_ignored() {
        let a = generate_topic_key("  Solar Energy Growth ", "https://example.com/solar1");
        let b = generate_topic_key("solar energy growth", "https://example.com/solar1");
        assert_eq!(a, b);
    }

    #[test]
    fn lowercasing_is_not_full_case_folding() {
        assert_eq!(normalize_title("STRASSE"), "strasse");
        assert_ne!(
            generate_topic_key("STRASSE", "https://example.com/s"),
            generate_topic_key("straße", "https://example.com/s")
        );
    }

    #[test]
    fn tracking_params_ignored() {
        let a = generate_topic_key("X", "https://example.com/a?utm_source=li&id=1");
        let b = generate_topic_key("X", "https://example.com/a?id=1&fbclid=q");
        assert_eq!(a, b);
    }

    #[test]
    fn separator_ambiguity_does_not_collide() {
        let a = generate_topic_key("a|b", "c");
        let b = generate_topic_key("a", "b|c");
        assert_ne!(a, b);
    }

    #[test]
    fn empty_inputs_still_produce_key() {
        let k = generate_topic_key("", "");
        assert_eq!(k.as_str().len(), 32);
        assert_ne!(k, generate_topic_key("", "https://example.com/"));
    }

    #[test]
    fn title_only_policy_ignores_url() {
        let p = TrackingParams::default();
        let a = KeyPolicy::TitleOnly.key_for("Wind", "https://a.example/1", &p);
        let b = KeyPolicy::TitleOnly.key_for("wind ", "https://b.example/2", &p);
        assert_eq!(a, b);
    }

    #[test]
    fn policy_parse() {
        assert_eq!(KeyPolicy::parse("Title-Only"), Some(KeyPolicy::TitleOnly));
        assert_eq!(KeyPolicy::parse("title_and_url"), Some(KeyPolicy::TitleAndUrl));
        assert_eq!(KeyPolicy::parse("fuzzy"), None);
    }
}
