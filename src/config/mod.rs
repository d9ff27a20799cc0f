//! Runtime configuration: file-backed denylist plus env knobs.

pub mod tracking;

use std::env;
use std::time::Duration;

use crate::topic::KeyPolicy;

pub const ENV_CACHE_TTL_MS: &str = "DISCOVER_CACHE_TTL_MS";
pub const ENV_KEY_POLICY: &str = "DISCOVER_KEY_POLICY";
pub const ENV_REFRESH_SECS: &str = "DISCOVER_REFRESH_SECS";

pub const DEFAULT_CACHE_TTL_MS: u64 = 60 * 60 * 1000;

/// Discovery cache TTL; unparseable values fall back to the default.
pub fn cache_ttl_from_env() -> Duration {
    let ms = env::var(ENV_CACHE_TTL_MS)
        .ok()
        .and_then(|s| s.trim().parse::<u64>().ok())
        .unwrap_or(DEFAULT_CACHE_TTL_MS);
    Duration::from_millis(ms)
}

/// Grouping policy; unknown values fall back to `TitleAndUrl`.
pub fn key_policy_from_env() -> KeyPolicy {
    match env::var(ENV_KEY_POLICY) {
        Ok(v) => KeyPolicy::parse(&v).unwrap_or_else(|| {
            tracing::warn!(value = %v, "unknown {ENV_KEY_POLICY}, using title_and_url");
            KeyPolicy::default()
        }),
        Err(_) => KeyPolicy::default(),
    }
}

/// Background refresh interval; `None` (or 0) disables the refresher.
pub fn refresh_interval_from_env() -> Option<Duration> {
    env::var(ENV_REFRESH_SECS)
        .ok()
        .and_then(|s| s.trim().parse::<u64>().ok())
        .filter(|&s| s > 0)
        .map(Duration::from_secs)
}
