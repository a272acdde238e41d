// src/services/devto.rs

//! Dev.to articles tagged `ai`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::models::{Config, Paper, Provenance, UNKNOWN_AUTHOR};
use crate::services::{FetchOutcome, Fetcher};
use crate::utils::http::fetch_json;
use crate::utils::parse_timestamp;

const SOURCE: &str = "Dev.to";

#[derive(Debug, Deserialize)]
struct Article {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    published_at: Option<String>,
    /// A list on some endpoints, a comma-separated string on others
    #[serde(default)]
    tag_list: Value,
    #[serde(default)]
    positive_reactions_count: u32,
    #[serde(default)]
    user: Option<Author>,
}

#[derive(Debug, Deserialize)]
struct Author {
    #[serde(default)]
    name: String,
}

fn parse_tags(value: &Value) -> Vec<String> {
    match value {
        Value::Array(tags) => tags
            .iter()
            .filter_map(Value::as_str)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect(),
        Value::String(s) => s
            .split(',')
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect(),
        _ => Vec::new(),
    }
}

impl Article {
    fn into_paper(self, now: DateTime<Utc>) -> Paper {
        let (published, provenance) = match self.published_at.as_deref() {
            Some(raw) => parse_timestamp(raw, now),
            None => (now, Provenance::Fallback),
        };
        let mut paper = Paper::new(self.title.trim(), self.url.trim(), SOURCE, published, provenance);
        let author = self
            .user
            .map(|u| u.name)
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string());
        paper.authors = vec![author];
        paper.summary = self.description.unwrap_or_default();
        paper.keywords = parse_tags(&self.tag_list);
        paper.citation_count = self.positive_reactions_count;
        paper
    }
}

pub struct DevTo {
    client: reqwest::Client,
    url: String,
    max_items: usize,
}

impl DevTo {
    pub fn new(config: &Config, client: reqwest::Client) -> Self {
        Self {
            client,
            url: config.sources.devto_url.clone(),
            max_items: config.sources.max_articles_per_source,
        }
    }
}

#[async_trait]
impl Fetcher for DevTo {
    type Item = Paper;

    fn name(&self) -> &str {
        SOURCE
    }

    async fn fetch(&self) -> FetchOutcome<Paper> {
        let now = Utc::now();
        match fetch_json::<Vec<Article>>(&self.client, SOURCE, &self.url).await {
            Ok(articles) => {
                let papers = articles
                    .into_iter()
                    .filter(|a| !a.title.trim().is_empty())
                    .take(self.max_items)
                    .map(|a| a.into_paper(now))
                    .collect();
                FetchOutcome::ok(SOURCE, papers)
            }
            Err(error) => {
                log::warn!("{} fetch failed: {}", SOURCE, error);
                FetchOutcome::failed(SOURCE, error)
            }
        }
    }
}
