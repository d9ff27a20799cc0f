//! # Article Clusterer
//! Pure, single-pass grouping of articles by topic key. No I/O.
//!
//! Every input article lands in exactly one cluster; within a cluster the
//! input order is preserved. Iteration order over the map is unspecified.

use serde::Serialize;
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::debug;

use crate::ingest::types::Article;
use crate::normalize::TrackingParams;
use crate::topic::{KeyPolicy, TopicKey};

pub type ClusterMap = HashMap<TopicKey, Vec<Article>>;

/// Clustering settings: which parameters are tracking noise and which fields form the key.
#[derive(Debug, Clone, Default)]
pub struct Clusterer {
    pub tracking: TrackingParams,
    pub policy: KeyPolicy,
}

impl Clusterer {
    pub fn new(tracking: TrackingParams, policy: KeyPolicy) -> Self {
        Self { tracking, policy }
    }

    pub fn with_policy(mut self, policy: KeyPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn key_for(&self, article: &Article) -> TopicKey {
        self.policy
            .key_for(&article.title, &article.link, &self.tracking)
    }

    /// Group articles by topic key.
    pub fn cluster<I>(&self, articles: I) -> ClusterMap
    where
        I: IntoIterator<Item = Article>,
    {
        let mut out = ClusterMap::new();
        let mut n = 0usize;
        for a in articles {
            n += 1;
            out.entry(self.key_for(&a)).or_default().push(a);
        }
        debug!(articles = n, clusters = out.len(), policy = ?self.policy, "clustered");
        out
    }

    /// First-seen representative per topic, in input order.
    pub fn dedupe<I>(&self, articles: I) -> Vec<Article>
    where
        I: IntoIterator<Item = Article>,
    {
        let mut seen: HashSet<TopicKey> = HashSet::new();
        articles
            .into_iter()
            .filter(|a| seen.insert(self.key_for(a)))
            .collect()
    }
}

/// Cluster with the default denylist and title+URL keys.
pub fn cluster_articles<I>(articles: I) -> ClusterMap
where
    I: IntoIterator<Item = Article>,
{
    Clusterer::default().cluster(articles)
}

/// Compact view of one cluster for API consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClusterSummary {
    pub key: TopicKey,
    pub size: usize,
    pub title: String,
    pub link: String,
    pub sources: Vec<String>,
}

/// Summaries ordered by size (desc), then key, so output is stable.
pub fn summarize(map: &ClusterMap) -> Vec<ClusterSummary> {
    let mut out: Vec<ClusterSummary> = map
        .iter()
        .filter_map(|(key, members)| {
            let first = members.first()?;
            let sources: BTreeSet<&str> = members
                .iter()
                .map(|a| a.source.as_str())
                .filter(|s| !s.is_empty())
                .collect();
            Some(ClusterSummary {
                key: key.clone(),
                size: members.len(),
                title: first.title.clone(),
                link: first.link.clone(),
                sources: sources.into_iter().map(str::to_string).collect(),
            })
        })
        .collect();
    out.sort_by(|a, b| b.size.cmp(&a.size).then_with(|| a.key.cmp(&b.key)));
    out
}

/// Clusters as `(key, members)` pairs, ordered like `summarize`.
pub fn ordered(map: ClusterMap) -> Vec<(TopicKey, Vec<Article>)> {
    let mut v: Vec<_> = map.into_iter().collect();
    v.sort_by(|a, b| b.1.len().cmp(&a.1.len()).then_with(|| a.0.cmp(&b.0)));
    v
}
