// src/ingest/types.rs
use anyhow::Result;
use time::{format_description::well_known::Rfc2822, OffsetDateTime, UtcOffset};

/// One fetched news/RSS item. Never mutated by the pipeline.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub source: String, // feed/publication name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pub_date: Option<String>, // raw, not validated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_snippet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl Article {
    pub fn new(title: impl Into<String>, link: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            source: source.into(),
            pub_date: None,
            content_snippet: None,
            content: None,
        }
    }

    /// Unix seconds from an RFC 2822 `pubDate`; 0 when missing or unparseable.
    pub fn published_unix(&self) -> u64 {
        self.pub_date
            .as_deref()
            .map(parse_rfc2822_to_unix)
            .unwrap_or(0)
    }
}

pub(crate) fn parse_rfc2822_to_unix(ts: &str) -> u64 {
    OffsetDateTime::parse(ts.trim(), &Rfc2822)
        .ok()
        .map(|dt| dt.to_offset(UtcOffset::UTC).unix_timestamp())
        .and_then(|x| u64::try_from(x).ok())
        .unwrap_or(0)
}

#[async_trait::async_trait]
pub trait ArticleProvider: Send + Sync {
    async fn fetch_latest(&self) -> Result<Vec<Article>>;
    fn name(&self) -> &str;
}
