// src/ingest/mod.rs
pub mod config;
pub mod providers;
pub mod scheduler;
pub mod types;

use crate::cluster::{summarize, ClusterSummary, Clusterer};
use crate::ingest::types::{Article, ArticleProvider};
use chrono::{DateTime, Utc};
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge};
use once_cell::sync::{Lazy, OnceCell};
use regex::Regex;
use serde::Serialize;
use std::cmp::Reverse;

/// Max chars kept in `contentSnippet`.
pub const SNIPPET_MAX_CHARS: usize = 300;

/// One-time metrics registration (so series show up on /metrics).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "discover_articles_total",
            "Articles parsed from feed providers."
        );
        describe_counter!(
            "discover_clusters_total",
            "Topic clusters produced by discovery runs."
        );
        describe_counter!(
            "discover_duplicates_total",
            "Articles folded into an existing topic."
        );
        describe_counter!(
            "discover_provider_errors_total",
            "Provider fetch/parse errors."
        );
        describe_counter!("discover_cache_hits_total", "Discovery cache hits.");
        describe_counter!("discover_cache_misses_total", "Discovery cache misses.");
        describe_counter!(
            "discover_refresh_runs_total",
            "Background refresh ticks completed."
        );
        describe_histogram!("discover_parse_ms", "Feed parse time in milliseconds.");
        describe_gauge!(
            "discover_last_run_ts",
            "Unix ts when discovery last ran."
        );
    });
}

static RE_TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)</?[^>]+>").expect("tag regex"));
static RE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex"));

/// Feed text cleanup: decode entities, strip tags, fold quotes and whitespace.
pub fn normalize_text(s: &str) -> String {
    let out = html_escape::decode_html_entities(s);
    let out = RE_TAGS.replace_all(&out, " ");

    // “ ” ‘ ’ « » → ASCII quotes
    let out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    RE_WS.replace_all(&out, " ").trim().to_string()
}

/// `normalize_text` capped at `max_chars` characters.
pub fn snippet(s: &str, max_chars: usize) -> String {
    let out = normalize_text(s);
    if out.chars().count() > max_chars {
        out.chars().take(max_chars).collect::<String>().trim_end().to_string()
    } else {
        out
    }
}

/// Result of one discovery run.
#[derive(Debug, Clone, Serialize)]
pub struct DiscoverReport {
    pub generated_at: DateTime<Utc>,
    /// Articles fetched before deduplication.
    pub total: usize,
    pub provider_errors: usize,
    pub clusters: Vec<ClusterSummary>,
    /// One article per topic, newest first.
    pub articles: Vec<Article>,
}

/// Cluster and dedupe an already-fetched batch.
pub fn build_report(raw: Vec<Article>, clusterer: &Clusterer, provider_errors: usize) -> DiscoverReport {
    let total = raw.len();
    let clusters = summarize(&clusterer.cluster(raw.iter().cloned()));

    let mut articles = clusterer.dedupe(raw);
    articles.sort_by_key(|a| Reverse(a.published_unix()));

    DiscoverReport {
        generated_at: Utc::now(),
        total,
        provider_errors,
        clusters,
        articles,
    }
}

/// Fetch every provider once, then cluster and dedupe.
/// A failing provider is logged and skipped.
pub async fn run_once(providers: &[Box<dyn ArticleProvider>], clusterer: &Clusterer) -> DiscoverReport {
    ensure_metrics_described();

    let mut raw = Vec::new();
    let mut errors = 0usize;
    for p in providers {
        match p.fetch_latest().await {
            Ok(mut v) => raw.append(&mut v),
            Err(e) => {
                tracing::warn!(error = ?e, provider = p.name(), "provider error");
                counter!("discover_provider_errors_total").increment(1);
                errors += 1;
            }
        }
    }

    let report = build_report(raw, clusterer, errors);

    // Telemetry
    let dups = report.total.saturating_sub(report.articles.len());
    counter!("discover_clusters_total").increment(report.clusters.len() as u64);
    counter!("discover_duplicates_total").increment(dups as u64);
    gauge!("discover_last_run_ts").set(report.generated_at.timestamp() as f64);

    tracing::info!(
        target: "discover",
        providers = providers.len(),
        total = report.total,
        clusters = report.clusters.len(),
        duplicates = dups,
        errors,
        "discovery run"
    );

    report
}
