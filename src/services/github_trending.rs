// src/services/github_trending.rs

//! GitHub trending page scraper.
//!
//! Selects the repeated `article.Box-row` elements and extracts fields
//! positionally. Missing subfields become zero values.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use scraper::{ElementRef, Html, Selector};

use crate::error::{AppError, Result};
use crate::models::{Config, Repository};
use crate::services::{FetchOutcome, Fetcher};
use crate::utils::http::fetch_text;
use crate::utils::{join_url, normalize_whitespace, parse_count};

const SOURCE: &str = "GitHub Trending";

/// Time window a trending page covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TrendWindow {
    Daily,
    Weekly,
    Monthly,
}

impl TrendWindow {
    fn from_path(path: &str) -> Self {
        if path.contains("since=monthly") {
            TrendWindow::Monthly
        } else if path.contains("since=weekly") {
            TrendWindow::Weekly
        } else {
            TrendWindow::Daily
        }
    }

    fn days(self) -> u32 {
        match self {
            TrendWindow::Daily => 1,
            TrendWindow::Weekly => 7,
            TrendWindow::Monthly => 30,
        }
    }
}

/// Fetcher for the trending pages listed in `sources.trending_paths`.
pub struct GithubTrending {
    client: reqwest::Client,
    base_url: String,
    paths: Vec<String>,
    concurrency: usize,
}

impl GithubTrending {
    pub fn new(config: &Config, client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: config.sources.github_base.clone(),
            paths: config.sources.trending_paths.clone(),
            concurrency: config.http.max_concurrent.max(1),
        }
    }

    async fn fetch_page(&self, path: &str, now: DateTime<Utc>) -> Result<Vec<Repository>> {
        let url = join_url(&self.base_url, path);
        let html = fetch_text(&self.client, SOURCE, &url).await?;
        parse_trending_page(&html, TrendWindow::from_path(path), now)
    }
}

#[async_trait]
impl Fetcher for GithubTrending {
    type Item = Repository;

    fn name(&self) -> &str {
        SOURCE
    }

    async fn fetch(&self) -> FetchOutcome<Repository> {
        let now = Utc::now();
        let mut outcome = FetchOutcome::ok(SOURCE, Vec::new());
        let mut seen = HashSet::new();

        // `buffered` keeps page order, so the daily page wins over weekly/monthly.
        let mut pages = stream::iter(self.paths.clone())
            .map(|path: String| async move {
                let result = self.fetch_page(&path, now).await;
                (path, result)
            })
            .buffered(self.concurrency);

        while let Some((path, result)) = pages.next().await {
            match result {
                Ok(repos) => {
                    log::debug!("{}: {} rows from {}", SOURCE, repos.len(), path);
                    for repo in repos {
                        if seen.insert(repo.name.clone()) {
                            outcome.items.push(repo);
                        }
                    }
                }
                Err(error) => {
                    log::warn!("Failed to fetch trending page {}: {}", path, error);
                    outcome.errors.push(error);
                }
            }
        }

        outcome
    }
}

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

fn first_text(row: &ElementRef, selector: &Selector) -> String {
    row.select(selector)
        .next()
        .map(|el| normalize_whitespace(&el.text().collect::<String>()))
        .unwrap_or_default()
}

/// Parse one trending page into repositories.
fn parse_trending_page(html: &str, window: TrendWindow, now: DateTime<Utc>) -> Result<Vec<Repository>> {
    let document = Html::parse_document(html);

    let row_sel = parse_selector("article.Box-row")?;
    let name_sel = parse_selector("h2 a")?;
    let desc_sel = parse_selector("p")?;
    let lang_sel = parse_selector("span[itemprop='programmingLanguage']")?;
    let stars_sel = parse_selector("a.Link--muted[href$='stargazers']")?;
    let forks_sel = parse_selector("a.Link--muted[href$='forks']")?;
    let gained_sel = parse_selector("span.d-inline-block.float-sm-right")?;

    let mut repos = Vec::new();
    for row in document.select(&row_sel) {
        let raw_name = first_text(&row, &name_sel);
        let parts: Vec<&str> = raw_name.split('/').map(str::trim).collect();
        if parts.len() < 2 || parts[0].is_empty() || parts[1].is_empty() {
            continue;
        }

        let mut repo = Repository::new(format!("{}/{}", parts[0], parts[1]), SOURCE, now);
        repo.description = first_text(&row, &desc_sel);
        repo.language = first_text(&row, &lang_sel);
        repo.stars = parse_count(&first_text(&row, &stars_sel));
        repo.forks = parse_count(&first_text(&row, &forks_sel));
        repo.gained_stars = parse_count(&first_text(&row, &gained_sel));
        repo.trend_metrics.stars_24h = repo.gained_stars / window.days();

        repos.push(repo);
    }

    Ok(repos)
}
