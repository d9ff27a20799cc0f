use crate::api::AppState;
use metrics::counter;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Spawn a background task that re-runs discovery every `interval`,
/// keeping the cache warm for `/discover`.
pub fn spawn_refresh_scheduler(interval: Duration, state: AppState) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let report = state.refresh().await;
            counter!("discover_refresh_runs_total").increment(1);

            tracing::debug!(
                target: "discover",
                articles = report.articles.len(),
                clusters = report.clusters.len(),
                errors = report.provider_errors,
                "refresh tick"
            );
        }
    })
}
