use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Query, State},
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use metrics::counter;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::cache::DiscoverCache;
use crate::cluster::{ordered, Clusterer};
use crate::config;
use crate::ingest::{self, config::load_feeds_default, types::Article, types::ArticleProvider, DiscoverReport};
use crate::topic::{KeyPolicy, TopicKey};

pub const CACHE_HEADER: &str = "x-discover-cache";

#[derive(Clone)]
pub struct AppState {
    pub clusterer: Arc<Clusterer>,
    pub providers: Arc<Vec<Box<dyn ArticleProvider>>>,
    pub cache: Arc<DiscoverCache>,
    /// Held for the duration of a discovery run; one run at a time.
    refresh_lock: Arc<tokio::sync::Mutex<()>>,
}

impl AppState {
    pub fn new(clusterer: Clusterer, providers: Vec<Box<dyn ArticleProvider>>, cache_ttl: Duration) -> Self {
        Self {
            clusterer: Arc::new(clusterer),
            providers: Arc::new(providers),
            cache: Arc::new(DiscoverCache::new(cache_ttl)),
            refresh_lock: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    /// Build from config files + env (see `config` and `ingest::config`).
    pub fn from_env() -> anyhow::Result<Self> {
        let tracking = config::tracking::load_default()?;
        let policy = config::key_policy_from_env();
        let feeds = load_feeds_default()?;
        let ttl = config::cache_ttl_from_env();
        info!(
            feeds = feeds.len(),
            policy = ?policy,
            ttl_ms = ttl.as_millis() as u64,
            "discover state configured"
        );
        let providers = feeds.iter().map(|f| f.provider()).collect();
        Ok(Self::new(Clusterer::new(tracking, policy), providers, ttl))
    }

    fn cache_key(&self) -> String {
        format!("discover:{:?}", self.clusterer.policy)
    }

    /// Run discovery now and store the result.
    pub async fn refresh(&self) -> DiscoverReport {
        let _guard = self.refresh_lock.lock().await;
        self.run_and_store().await
    }

    async fn run_and_store(&self) -> DiscoverReport {
        let report = ingest::run_once(&self.providers, &self.clusterer).await;
        self.cache.insert(self.cache_key(), report.clone());
        report
    }

    /// Cached report if fresh, else a new run. Second value is `true` on cache hit.
    /// Concurrent misses wait for the in-flight run instead of starting their own.
    pub async fn discover(&self) -> (DiscoverReport, bool) {
        ingest::ensure_metrics_described();
        let key = self.cache_key();
        if let Some(hit) = self.cache.get(&key) {
            counter!("discover_cache_hits_total").increment(1);
            return (hit, true);
        }

        let _guard = self.refresh_lock.lock().await;
        if let Some(hit) = self.cache.get(&key) {
            counter!("discover_cache_hits_total").increment(1);
            return (hit, true);
        }
        counter!("discover_cache_misses_total").increment(1);
        (self.run_and_store().await, false)
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/normalize", post(normalize))
        .route("/topic-key", post(topic_key))
        .route("/cluster", post(cluster))
        .route("/discover", get(discover))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(serde::Deserialize)]
struct NormalizeReq {
    url: String,
}

#[derive(serde::Serialize)]
struct NormalizeResp {
    url: String,
    normalized: String,
}

async fn normalize(State(state): State<AppState>, Json(body): Json<NormalizeReq>) -> Json<NormalizeResp> {
    let normalized = state.clusterer.tracking.normalize_url(&body.url);
    Json(NormalizeResp {
        url: body.url,
        normalized,
    })
}

#[derive(serde::Deserialize)]
struct TopicKeyReq {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
}

#[derive(serde::Serialize)]
struct TopicKeyResp {
    key: TopicKey,
    policy: KeyPolicy,
}

async fn topic_key(State(state): State<AppState>, Json(body): Json<TopicKeyReq>) -> Json<TopicKeyResp> {
    let c = &state.clusterer;
    Json(TopicKeyResp {
        key: c.policy.key_for(&body.title, &body.url, &c.tracking),
        policy: c.policy,
    })
}

#[derive(serde::Deserialize)]
struct ClusterQuery {
    policy: Option<String>,
}

#[derive(serde::Serialize)]
struct ClusterOut {
    key: TopicKey,
    size: usize,
    articles: Vec<Article>,
}

#[derive(serde::Serialize)]
struct ClusterResp {
    total: usize,
    clusters: Vec<ClusterOut>,
}

async fn cluster(
    State(state): State<AppState>,
    Query(q): Query<ClusterQuery>,
    Json(articles): Json<Vec<Article>>,
) -> Result<Json<ClusterResp>, (StatusCode, String)> {
    let clusterer = match q.policy.as_deref() {
        None => state.clusterer.as_ref().clone(),
        Some(p) => {
            let policy = KeyPolicy::parse(p)
                .ok_or_else(|| (StatusCode::BAD_REQUEST, format!("unknown policy '{p}'")))?;
            state.clusterer.as_ref().clone().with_policy(policy)
        }
    };

    let total = articles.len();
    let clusters = ordered(clusterer.cluster(articles))
        .into_iter()
        .map(|(key, articles)| ClusterOut {
            key,
            size: articles.len(),
            articles,
        })
        .collect();
    Ok(Json(ClusterResp { total, clusters }))
}

async fn discover(State(state): State<AppState>) -> Response {
    let (report, hit) = state.discover().await;
    let mut resp = Json(report).into_response();
    resp.headers_mut().insert(
        CACHE_HEADER,
        HeaderValue::from_static(if hit { "HIT" } else { "MISS" }),
    );
    resp
}
