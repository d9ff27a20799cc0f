//! Article discovery service — binary entrypoint.
//! Boots the Axum HTTP server, wiring routes, shared state, metrics and the
//! optional background refresher.

use linkpost_discover::{
    api::{self, AppState},
    config,
    ingest::scheduler::spawn_refresh_scheduler,
    metrics::Metrics,
};
use shuttle_axum::ShuttleAxum;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Compact tracing logs; a subscriber already installed by the runtime wins.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("linkpost_discover=info,warn"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    init_tracing();

    let state = AppState::from_env().map_err(shuttle_runtime::Error::Custom)?;

    if let Some(every) = config::refresh_interval_from_env() {
        info!(secs = every.as_secs(), "background refresh enabled");
        spawn_refresh_scheduler(every, state.clone());
    }

    let mut router = api::router(state.clone());
    match Metrics::init(state.cache.ttl()) {
        Ok(m) => router = router.merge(m.router()),
        Err(e) => warn!(error = ?e, "metrics disabled"),
    }

    Ok(router.into())
}
