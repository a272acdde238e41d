// src/services/csdn.rs

//! CSDN AI channel article list.
//!
//! The listing is rendered with inconsistent markup, so titles are pulled
//! out with a regex rather than CSS selectors. The list carries no dates.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use regex::Regex;

use crate::error::{AppError, Result};
use crate::models::keywords::is_ai_article;
use crate::models::{Config, Paper, Provenance, UNKNOWN_AUTHOR};
use crate::services::{FetchOutcome, Fetcher};
use crate::utils::http::fetch_text;

const SOURCE: &str = "CSDN";

pub struct Csdn {
    client: reqwest::Client,
    url: String,
    max_items: usize,
}

impl Csdn {
    pub fn new(config: &Config, client: reqwest::Client) -> Self {
        Self {
            client,
            url: config.sources.csdn_url.clone(),
            max_items: config.sources.max_articles_per_source,
        }
    }
}

#[async_trait]
impl Fetcher for Csdn {
    type Item = Paper;

    fn name(&self) -> &str {
        SOURCE
    }

    async fn fetch(&self) -> FetchOutcome<Paper> {
        let result = match fetch_text(&self.client, SOURCE, &self.url).await {
            Ok(html) => parse_listing(&html, self.max_items, Utc::now()),
            Err(error) => Err(error),
        };
        match result {
            Ok(papers) => FetchOutcome::ok(SOURCE, papers),
            Err(error) => {
                log::warn!("{} fetch failed: {}", SOURCE, error);
                FetchOutcome::failed(SOURCE, error)
            }
        }
    }
}

fn parse_listing(html: &str, max_items: usize, now: DateTime<Utc>) -> Result<Vec<Paper>> {
    let re = Regex::new(r#"<a[^>]*class="title"[^>]*href="([^"]+)"[^>]*>([^<]+)</a>"#)
        .map_err(|e| AppError::decode(SOURCE, e))?;

    let papers = re
        .captures_iter(html)
        .filter_map(|caps| {
            let url = caps.get(1)?.as_str().trim();
            let title = caps.get(2)?.as_str().trim();
            (!title.is_empty() && is_ai_article(title)).then(|| (url, title))
        })
        .take(max_items)
        .map(|(url, title)| {
            let mut paper = Paper::new(title, url, SOURCE, now, Provenance::Fallback);
            paper.authors = vec![UNKNOWN_AUTHOR.to_string()];
            // No citation data on the listing.
            paper.citations_estimated = true;
            paper
        })
        .collect();
    Ok(papers)
}
