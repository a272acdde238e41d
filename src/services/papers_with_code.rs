// src/services/papers_with_code.rs

//! Papers with Code API: paper metadata and the code repositories attached
//! to each paper.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use crate::error::Result;
use crate::models::{Config, Paper, Provenance, Repository};
use crate::services::{FetchOutcome, Fetcher};
use crate::utils::http::fetch_json;
use crate::utils::{normalize_authors, parse_timestamp, truncate_text};

const PAPERS_SOURCE: &str = "Papers with Code";
const REPOS_SOURCE: &str = "Papers with Code Repos";
const DESCRIPTION_LIMIT: usize = 200;

#[derive(Debug, Deserialize)]
struct PapersResponse {
    #[serde(default)]
    results: Vec<PaperEntry>,
}

#[derive(Debug, Deserialize)]
struct PaperEntry {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    published: Value,
    #[serde(default)]
    authors: Value,
    #[serde(default, rename = "abstract")]
    summary: Option<String>,
    #[serde(default)]
    tasks: Vec<Task>,
    #[serde(default)]
    repositories: Vec<CodeRepository>,
}

#[derive(Debug, Deserialize)]
struct Task {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct CodeRepository {
    #[serde(default)]
    url: String,
    #[serde(default)]
    framework: Option<String>,
    #[serde(default)]
    stars: u32,
}

impl PaperEntry {
    fn published_at(&self, now: DateTime<Utc>) -> (DateTime<Utc>, Provenance) {
        match &self.published {
            Value::String(raw) => parse_timestamp(raw, now),
            _ => (now, Provenance::Fallback),
        }
    }

    fn into_paper(self, now: DateTime<Utc>) -> Paper {
        let (published, provenance) = self.published_at(now);
        let mut paper = Paper::new(self.title.trim(), self.url.trim(), PAPERS_SOURCE, published, provenance);
        paper.authors = normalize_authors(&self.authors);
        paper.summary = self.summary.unwrap_or_default().trim().to_string();
        paper.keywords = self
            .tasks
            .into_iter()
            .map(|t| t.name)
            .filter(|n| !n.is_empty())
            .collect();
        // The API carries no citation counts.
        paper.citations_estimated = true;
        paper
    }
}

async fn fetch_entries(client: &reqwest::Client, source: &str, url: &str) -> Result<Vec<PaperEntry>> {
    let response: PapersResponse = fetch_json(client, source, url).await?;
    Ok(response.results)
}

/// Paper metadata from Papers with Code.
pub struct PapersWithCode {
    client: reqwest::Client,
    url: String,
}

impl PapersWithCode {
    pub fn new(config: &Config, client: reqwest::Client) -> Self {
        Self {
            client,
            url: config.sources.papers_with_code_url.clone(),
        }
    }
}

#[async_trait]
impl Fetcher for PapersWithCode {
    type Item = Paper;

    fn name(&self) -> &str {
        PAPERS_SOURCE
    }

    async fn fetch(&self) -> FetchOutcome<Paper> {
        let now = Utc::now();
        match fetch_entries(&self.client, PAPERS_SOURCE, &self.url).await {
            Ok(entries) => {
                let papers = entries
                    .into_iter()
                    .filter(|e| !e.title.trim().is_empty())
                    .map(|e| e.into_paper(now))
                    .collect();
                FetchOutcome::ok(PAPERS_SOURCE, papers)
            }
            Err(error) => {
                log::warn!("{} fetch failed: {}", PAPERS_SOURCE, error);
                FetchOutcome::failed(PAPERS_SOURCE, error)
            }
        }
    }
}

/// GitHub repositories linked from Papers with Code papers.
pub struct PapersWithCodeRepos {
    client: reqwest::Client,
    url: String,
}

impl PapersWithCodeRepos {
    pub fn new(config: &Config, client: reqwest::Client) -> Self {
        Self {
            client,
            url: config.sources.papers_with_code_url.clone(),
        }
    }
}

#[async_trait]
impl Fetcher for PapersWithCodeRepos {
    type Item = Repository;

    fn name(&self) -> &str {
        REPOS_SOURCE
    }

    async fn fetch(&self) -> FetchOutcome<Repository> {
        let now = Utc::now();
        match fetch_entries(&self.client, REPOS_SOURCE, &self.url).await {
            Ok(entries) => FetchOutcome::ok(REPOS_SOURCE, linked_repositories(entries, now)),
            Err(error) => {
                log::warn!("{} fetch failed: {}", REPOS_SOURCE, error);
                FetchOutcome::failed(REPOS_SOURCE, error)
            }
        }
    }
}

/// Extract `owner/name` from a GitHub URL, skipping fork links.
fn github_name(re: &Regex, url: &str) -> Option<String> {
    if url.contains("/fork") {
        return None;
    }
    let caps = re.captures(url)?;
    let name = caps.get(1)?.as_str().trim_end_matches(".git");
    Some(name.to_string())
}

fn linked_repositories(entries: Vec<PaperEntry>, now: DateTime<Utc>) -> Vec<Repository> {
    let Ok(re) = Regex::new(r"github\.com/([^/\s?#]+/[^/\s?#]+)") else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut repos = Vec::new();
    for entry in entries {
        let authors = normalize_authors(&entry.authors);
        let summary = entry.summary.as_deref().unwrap_or_default();
        for code in &entry.repositories {
            let Some(name) = github_name(&re, &code.url) else {
                continue;
            };
            if !seen.insert(name.clone()) {
                continue;
            }

            let mut repo = Repository::new(name, REPOS_SOURCE, now);
            repo.description = truncate_text(summary.trim(), DESCRIPTION_LIMIT);
            repo.stars = code.stars;
            repo.paper_url = entry.url.clone();
            repo.paper_title = entry.title.trim().to_string();
            repo.authors = authors.clone();
            if let Some(framework) = code.framework.as_deref().filter(|f| !f.is_empty() && *f != "none") {
                repo.tech_stack.push(framework.to_string());
            }
            repos.push(repo);
        }
    }
    repos
}
