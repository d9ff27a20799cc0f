// src/ingest/providers/rss.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::{counter, histogram};
use quick_xml::de::from_str;
use serde::Deserialize;
use std::time::Duration;

use crate::ingest::types::{Article, ArticleProvider};
use crate::ingest::{normalize_text, snippet, SNIPPET_MAX_CHARS};

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    title: Option<String>,
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
}

/// RSS 2.0 feed, read from an in-memory document or fetched over HTTP.
pub struct RssFeedProvider {
    name: String,
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http { url: String, client: reqwest::Client },
}

impl RssFeedProvider {
    /// Parse a fixed XML document (tests, offline demos).
    pub fn from_fixture(name: impl Into<String>, xml: &str) -> Self {
        Self {
            name: name.into(),
            mode: Mode::Fixture(xml.to_string()),
        }
    }

    pub fn from_url(name: impl Into<String>, url: impl Into<String>) -> Self {
        let client = match reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
        {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(error = ?e, "feed client builder failed, using default client");
                reqwest::Client::new()
            }
        };
        Self {
            name: name.into(),
            mode: Mode::Http {
                url: url.into(),
                client,
            },
        }
    }

    /// Parse an RSS document into articles tagged with `source`.
    /// Items with neither title nor link are dropped.
    pub fn parse_items_from_str(source: &str, s: &str) -> Result<Vec<Article>> {
        let t0 = std::time::Instant::now();
        let xml_clean = scrub_html_entities_for_xml(s);
        let rss: Rss = from_str(&xml_clean).context("parsing rss xml")?;

        let source = if source.trim().is_empty() {
            rss.channel
                .title
                .as_deref()
                .map(normalize_text)
                .unwrap_or_default()
        } else {
            source.trim().to_string()
        };

        let mut out = Vec::with_capacity(rss.channel.item.len());
        for it in rss.channel.item {
            let title = it.title.as_deref().map(normalize_text).unwrap_or_default();
            let link = it
                .link
                .as_deref()
                .map(str::trim)
                .unwrap_or_default()
                .to_string();
            if title.is_empty() && link.is_empty() {
                continue;
            }

            let content_snippet = it
                .description
                .as_deref()
                .map(|d| snippet(d, SNIPPET_MAX_CHARS))
                .filter(|s| !s.is_empty());

            out.push(Article {
                title,
                link,
                source: source.clone(),
                pub_date: it.pub_date.map(|d| d.trim().to_string()),
                content_snippet,
                content: it.description,
            });
        }

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("discover_parse_ms").record(ms);
        counter!("discover_articles_total").increment(out.len() as u64);
        Ok(out)
    }
}

#[async_trait]
impl ArticleProvider for RssFeedProvider {
    async fn fetch_latest(&self) -> Result<Vec<Article>> {
        match &self.mode {
            Mode::Fixture(s) => Self::parse_items_from_str(&self.name, s),
            Mode::Http { url, client } => {
                let body = client
                    .get(url.as_str())
                    .send()
                    .await
                    .and_then(|r| r.error_for_status())
                    .with_context(|| format!("fetching feed {url}"))?
                    .text()
                    .await
                    .with_context(|| format!("reading feed body {url}"))?;
                Self::parse_items_from_str(&self.name, &body)
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

// HTML entities are not valid XML; fold the common ones before parsing.
fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
        .replace("&hellip;", "...")
}
