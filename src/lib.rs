// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod api;
pub mod cache;
pub mod cluster;
pub mod config;
pub mod ingest;
pub mod metrics;
pub mod normalize;
pub mod topic;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::cluster::{cluster_articles, ClusterMap, Clusterer};
pub use crate::ingest::types::Article;
pub use crate::normalize::{normalize_url, TrackingParams};
pub use crate::topic::{generate_topic_key, KeyPolicy, TopicKey};

