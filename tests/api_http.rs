// tests/api_http.rs
//
// HTTP-level tests for the public API Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use async_trait::async_trait;
use serde_json::{json, Value as Json};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt as _; // for `oneshot`

use linkpost_discover::api::{self, AppState, CACHE_HEADER};
use linkpost_discover::cluster::Clusterer;
use linkpost_discover::ingest::providers::RssFeedProvider;
use linkpost_discover::ingest::types::{Article, ArticleProvider};

const BODY_LIMIT: usize = 1024 * 1024;
const ENERGY_XML: &str = include_str!("fixtures/energy_rss.xml");
const TECH_XML: &str = include_str!("fixtures/tech_rss.xml");

fn test_state(ttl: Duration) -> AppState {
    let providers: Vec<Box<dyn ArticleProvider>> = vec![
        Box::new(RssFeedProvider::from_fixture("Energy Daily", ENERGY_XML)),
        Box::new(RssFeedProvider::from_fixture("Tech Wire", TECH_XML)),
    ];
    AppState::new(Clusterer::default(), providers, ttl)
}

fn test_router() -> Router {
    api::router(test_state(Duration::from_secs(60)))
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
    let resp = app.oneshot(req).await.expect("oneshot");
    let status = resp.status();
    let headers = resp.headers().clone();
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    (status, headers, bytes)
}

fn post_json(uri: &str, v: &Json) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(v.to_string()))
        .expect("build POST")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("build GET")
}

#[tokio::test]
async fn health_returns_ok() {
    let (status, _, body) = send(test_router(), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(String::from_utf8(body).unwrap().trim(), "OK");
}

#[tokio::test]
async fn normalize_strips_tracking() {
    let payload = json!({ "url": "https://example.com/article?category=tech&utm_source=google" });
    let (status, _, body) = send(test_router(), post_json("/normalize", &payload)).await;
    assert_eq!(status, StatusCode::OK);
    let v: Json = serde_json::from_slice(&body).unwrap();
    assert_eq!(v["normalized"], "https://example.com/article?category=tech");
    assert_eq!(v["url"], payload["url"]);
}

#[tokio::test]
async fn topic_key_is_stable_between_calls() {
    let payload = json!({ "title": "Renewable Energy Growth", "url": "https://example.com/article1" });
    let (_, _, a) = send(test_router(), post_json("/topic-key", &payload)).await;
    let (_, _, b) = send(test_router(), post_json("/topic-key", &payload)).await;
    let a: Json = serde_json::from_slice(&a).unwrap();
    let b: Json = serde_json::from_slice(&b).unwrap();
    assert_eq!(a["key"], b["key"]);
    assert_eq!(a["policy"], "title_and_url");
}

#[tokio::test]
async fn cluster_endpoint_respects_policy_query() {
    let arts = json!([
        { "title": "Solar Energy Growth", "link": "https://example.com/solar1", "source": "A" },
        { "title": "Solar Energy Growth", "link": "https://example.com/solar2", "source": "B", "contentSnippet": "x" },
        { "title": "Wind Power Innovation", "link": "https://example.com/wind1", "source": "A" }
    ]);

    let (status, _, body) = send(test_router(), post_json("/cluster", &arts)).await;
    assert_eq!(status, StatusCode::OK);
    let v: Json = serde_json::from_slice(&body).unwrap();
    assert_eq!(v["total"], 3);
    assert_eq!(v["clusters"].as_array().unwrap().len(), 3);

    let (status, _, body) =
        send(test_router(), post_json("/cluster?policy=title_only", &arts)).await;
    assert_eq!(status, StatusCode::OK);
    let v: Json = serde_json::from_slice(&body).unwrap();
    let clusters = v["clusters"].as_array().unwrap();
    assert_eq!(clusters.len(), 2);
    assert_eq!(clusters[0]["size"], 2);
    assert_eq!(clusters[0]["articles"][1]["contentSnippet"], "x");
}

#[tokio::test]
async fn cluster_endpoint_rejects_unknown_policy() {
    let (status, _, _) = send(
        test_router(),
        post_json("/cluster?policy=fuzzy", &json!([])),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn discover_misses_then_hits_cache() {
    let app = api::router(test_state(Duration::from_secs(60)));

    let (status, headers, body) = send(app.clone(), get("/discover")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers.get(CACHE_HEADER).unwrap(), "MISS");
    let v: Json = serde_json::from_slice(&body).unwrap();
    assert_eq!(v["total"], 4);
    assert_eq!(v["articles"].as_array().unwrap().len(), 3);

    let (_, headers, _) = send(app, get("/discover")).await;
    assert_eq!(headers.get(CACHE_HEADER).unwrap(), "HIT");
}

#[tokio::test]
async fn discover_cache_expires() {
    let app = api::router(test_state(Duration::from_millis(20)));

    let (_, headers, _) = send(app.clone(), get("/discover")).await;
    assert_eq!(headers.get(CACHE_HEADER).unwrap(), "MISS");

    tokio::time::sleep(Duration::from_millis(100)).await;
    let (_, headers, _) = send(app, get("/discover")).await;
    assert_eq!(headers.get(CACHE_HEADER).unwrap(), "MISS");
}

struct CountingProvider {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl ArticleProvider for CountingProvider {
    async fn fetch_latest(&self) -> anyhow::Result<Vec<Article>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        // Hold the run open long enough for the other callers to pile up.
        tokio::time::sleep(Duration::from_millis(50)).await;
        Ok(vec![Article::new("Wind", "https://n.test/wind", "Counting")])
    }
    fn name(&self) -> &str {
        "Counting"
    }
}

#[tokio::test]
async fn concurrent_discover_misses_share_one_run() {
    let calls = Arc::new(AtomicUsize::new(0));
    let providers: Vec<Box<dyn ArticleProvider>> = vec![Box::new(CountingProvider {
        calls: calls.clone(),
    })];
    let state = AppState::new(Clusterer::default(), providers, Duration::from_secs(60));

    let (a, b, c, d) = tokio::join!(
        state.discover(),
        state.discover(),
        state.discover(),
        state.discover()
    );

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    let hits = [a.1, b.1, c.1, d.1].iter().filter(|h| **h).count();
    assert_eq!(hits, 3);
    assert_eq!(a.0.total, 1);
    assert_eq!(d.0.total, 1);
}
