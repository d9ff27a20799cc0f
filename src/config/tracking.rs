// src/config/tracking.rs
use anyhow::{Context, Result};
use std::{env, fs, path::Path, path::PathBuf};
use tracing::info;

use crate::normalize::TrackingParams;

pub const ENV_TRACKING_PARAMS_PATH: &str = "TRACKING_PARAMS_PATH";
pub const DEFAULT_TRACKING_PARAMS_PATH: &str = "config/tracking_params.toml";

/// Load a denylist from `.toml` or `.json`:
///
/// ```toml
/// exact = ["fbclid", "gclid"]
/// prefixes = ["utm_"]
/// ```
pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<TrackingParams> {
    let path = path.as_ref();
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading tracking params from {}", path.display()))?;
    let is_json = path
        .extension()
        .and_then(|s| s.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    let params: TrackingParams = if is_json {
        serde_json::from_str(&data).context("parsing tracking params json")?
    } else {
        toml::from_str(&data).context("parsing tracking params toml")?
    };
    Ok(params.sanitized())
}

/// `$TRACKING_PARAMS_PATH`, else `config/tracking_params.toml`, else built-in defaults.
/// An explicitly configured path that fails to load is an error.
pub fn load_default() -> Result<TrackingParams> {
    if let Ok(p) = env::var(ENV_TRACKING_PARAMS_PATH) {
        return load_from_file(PathBuf::from(p));
    }
    let fallback = PathBuf::from(DEFAULT_TRACKING_PARAMS_PATH);
    if fallback.exists() {
        let params = load_from_file(&fallback)?;
        info!(
            exact = params.exact.len(),
            prefixes = params.prefixes.len(),
            "tracking params loaded from {}",
            fallback.display()
        );
        return Ok(params);
    }
    Ok(TrackingParams::default())
}
