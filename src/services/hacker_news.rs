// src/services/hacker_news.rs

//! Hacker News top stories, filtered to AI-related titles.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::Deserialize;

use crate::models::keywords::is_ai_article;
use crate::models::{Config, Paper, UNKNOWN_AUTHOR};
use crate::services::{FetchOutcome, Fetcher};
use crate::utils::from_unix;
use crate::utils::http::fetch_json;
use crate::utils::join_url;

const SOURCE: &str = "Hacker News";

#[derive(Debug, Deserialize)]
struct Story {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    by: Option<String>,
    #[serde(default)]
    score: u32,
    #[serde(default)]
    time: i64,
    #[serde(default)]
    text: Option<String>,
}

impl Story {
    fn into_paper(self, now: DateTime<Utc>) -> Paper {
        let (published, provenance) = from_unix(self.time, now);
        let mut paper = Paper::new(
            self.title.trim(),
            self.url.unwrap_or_default(),
            SOURCE,
            published,
            provenance,
        );
        let author = self
            .by
            .filter(|b| !b.is_empty())
            .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string());
        paper.authors = vec![author];
        paper.summary = self.text.unwrap_or_default();
        paper.citation_count = self.score;
        paper
    }
}

/// Top stories whose titles look AI-related.
pub struct HackerNews {
    client: reqwest::Client,
    base_url: String,
    story_limit: usize,
    max_items: usize,
    concurrency: usize,
}

impl HackerNews {
    pub fn new(config: &Config, client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: config.sources.hacker_news_base.clone(),
            story_limit: config.sources.hacker_news_story_limit,
            max_items: config.sources.max_articles_per_source,
            concurrency: config.http.max_concurrent.max(1),
        }
    }
}

#[async_trait]
impl Fetcher for HackerNews {
    type Item = Paper;

    fn name(&self) -> &str {
        SOURCE
    }

    async fn fetch(&self) -> FetchOutcome<Paper> {
        if self.max_items == 0 {
            return FetchOutcome::ok(SOURCE, Vec::new());
        }

        let now = Utc::now();
        let top_url = join_url(&self.base_url, "topstories.json");
        let ids: Vec<u64> = match fetch_json(&self.client, SOURCE, &top_url).await {
            Ok(ids) => ids,
            Err(error) => {
                log::warn!("{} top stories failed: {}", SOURCE, error);
                return FetchOutcome::failed(SOURCE, error);
            }
        };

        let mut outcome = FetchOutcome::ok(SOURCE, Vec::new());
        let mut stories = stream::iter(ids.into_iter().take(self.story_limit))
            .map(|id| {
                let url = join_url(&self.base_url, &format!("item/{id}.json"));
                async move { fetch_json::<Story>(&self.client, SOURCE, &url).await }
            })
            .buffered(self.concurrency);

        while let Some(result) = stories.next().await {
            match result {
                Ok(story) if !story.title.is_empty() && is_ai_article(&story.title) => {
                    if outcome.items.len() >= self.max_items {
                        break;
                    }
                    outcome.items.push(story.into_paper(now));
                }
                Ok(_) => {}
                Err(error) => {
                    log::debug!("{} item skipped: {}", SOURCE, error);
                    outcome.errors.push(error);
                }
            }
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Item, Provenance};
    use crate::utils::http::create_async_client;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount_item(server: &MockServer, id: u64, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path(format!("/item/{id}.json")))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_keeps_ai_stories_only() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/topstories.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([1, 2, 3])))
            .mount(&server)
            .await;
        mount_item(
            &server,
            1,
            json!({"title": "Show HN: A tiny LLM runtime", "url": "https://x.dev", "by": "pg", "score": 321, "time": 1714000000}),
        )
        .await;
        mount_item(&server, 2, json!({"title": "Gardening tips", "score": 10, "time": 1714000000})).await;
        mount_item(&server, 3, json!({"title": "Ask HN: Fine-tuning on a laptop?", "score": 5})).await;

        let mut config = Config::default();
        config.sources.hacker_news_base = server.uri();
        let client = create_async_client(&config.http).unwrap();

        let outcome = HackerNews::new(&config, client).fetch().await;
        assert!(outcome.errors.is_empty());
        assert_eq!(outcome.items.len(), 2);

        let first = &outcome.items[0];
        assert_eq!(first.citation_count, 321);
        assert_eq!(first.authors, vec!["pg"]);
        assert_eq!(first.date_provenance, Provenance::Source);

        let second = &outcome.items[1];
        assert!(second.url.is_empty());
        assert_eq!(second.date_provenance, Provenance::Fallback);
        assert_eq!(second.authors, vec![UNKNOWN_AUTHOR]);
        assert!(second.completeness() < first.completeness());
    }

    #[tokio::test]
    async fn test_item_cap() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/topstories.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([1, 2, 3])))
            .mount(&server)
            .await;
        for id in 1..=3 {
            mount_item(&server, id, json!({"title": format!("GPT story {id}"), "time": 1714000000})).await;
        }

        let mut config = Config::default();
        config.sources.hacker_news_base = server.uri();
        config.sources.max_articles_per_source = 2;
        let client = create_async_client(&config.http).unwrap();

        let outcome = HackerNews::new(&config, client).fetch().await;
        assert_eq!(outcome.items.len(), 2);
    }

    #[tokio::test]
    async fn test_zero_cap_makes_no_requests() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/topstories.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([1])))
            .expect(0)
            .mount(&server)
            .await;
        mount_item(&server, 1, json!({"title": "GPT story", "time": 1714000000})).await;

        let mut config = Config::default();
        config.sources.hacker_news_base = server.uri();
        config.sources.max_articles_per_source = 0;
        let client = create_async_client(&config.http).unwrap();

        let outcome = HackerNews::new(&config, client).fetch().await;
        assert!(outcome.items.is_empty());
        assert!(!outcome.is_failure());
    }

    #[tokio::test]
    async fn test_top_stories_failure() {
        let server = MockServer::start().await;
        let mut config = Config::default();
        config.sources.hacker_news_base = server.uri();
        let client = create_async_client(&config.http).unwrap();

        let outcome = HackerNews::new(&config, client).fetch().await;
        assert!(outcome.is_failure());
    }
}
