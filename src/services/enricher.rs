// src/services/enricher.rs

//! Best-effort GitHub metadata lookup for repositories missing key fields.

use chrono::Utc;
use futures::stream::{self, StreamExt};
use serde::Deserialize;

use crate::error::Result;
use crate::models::{Config, Provenance, Repository};
use crate::utils::http::{exists, fetch_json};
use crate::utils::{join_url, parse_timestamp};

const SOURCE: &str = "GitHub API";

#[derive(Debug, Deserialize)]
struct RepoMetadata {
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    stargazers_count: u32,
    #[serde(default)]
    forks_count: u32,
    #[serde(default)]
    pushed_at: Option<String>,
    #[serde(default)]
    topics: Vec<String>,
    #[serde(default)]
    has_wiki: bool,
    #[serde(default)]
    has_pages: bool,
}

/// Fills description, counters, last push, topics and documentation flags.
pub struct GithubEnricher {
    client: reqwest::Client,
    api_base: String,
    concurrency: usize,
}

impl GithubEnricher {
    pub fn new(config: &Config, client: reqwest::Client) -> Self {
        Self {
            client,
            api_base: config.sources.github_api_base.clone(),
            concurrency: config.http.max_concurrent.max(1),
        }
    }

    /// Enrich every repository that needs it, preserving order.
    pub async fn enrich_all(&self, repos: Vec<Repository>) -> Vec<Repository> {
        stream::iter(repos)
            .map(|repo| self.enrich(repo))
            .buffered(self.concurrency)
            .collect()
            .await
    }

    /// Enrich one repository. Any failure returns it unchanged.
    pub async fn enrich(&self, repo: Repository) -> Repository {
        if !repo.needs_enrichment() {
            return repo;
        }
        let Some(endpoint) = repo
            .owner_and_name()
            .map(|(owner, name)| join_url(&self.api_base, &format!("repos/{owner}/{name}")))
        else {
            return repo;
        };

        let metadata: Result<RepoMetadata> = fetch_json(&self.client, SOURCE, &endpoint).await;
        let readme = exists(&self.client, SOURCE, &format!("{endpoint}/readme")).await;

        match (metadata, readme) {
            (Ok(metadata), Ok(has_readme)) => apply(repo, metadata, has_readme),
            (Err(error), _) | (_, Err(error)) => {
                log::debug!("Enrichment skipped for {}: {}", repo.name, error);
                repo
            }
        }
    }
}

fn apply(mut repo: Repository, metadata: RepoMetadata, has_readme: bool) -> Repository {
    if let Some(description) = metadata.description.filter(|d| !d.is_empty()) {
        repo.description = description;
    }
    if let Some(language) = metadata.language.filter(|l| !l.is_empty()) {
        repo.language = language;
    }
    repo.stars = repo.stars.max(metadata.stargazers_count);
    repo.forks = repo.forks.max(metadata.forks_count);

    if let Some(raw) = metadata.pushed_at {
        let (at, provenance) = parse_timestamp(&raw, Utc::now());
        if provenance == Provenance::Source {
            repo.last_commit = Some(at);
            repo.last_commit_provenance = provenance;
        }
    }

    if !metadata.topics.is_empty() {
        repo.tech_stack = metadata.topics;
    } else if repo.tech_stack.is_empty() && !repo.language.is_empty() {
        repo.tech_stack = vec![repo.language.clone()];
    }

    repo.has_wiki = metadata.has_wiki;
    repo.has_docs = metadata.has_wiki || metadata.has_pages;
    if metadata.has_wiki && repo.docs_url.is_empty() {
        repo.docs_url = format!("https://github.com/{}/wiki", repo.name);
    }

    if has_readme {
        repo.has_readme = true;
        repo.has_docs = true;
        if repo.docs_url.is_empty() {
            repo.docs_url = format!("https://github.com/{}#readme", repo.name);
        }
    }

    if repo.stars > 0 {
        let estimate = u64::from(repo.gained_stars) * u64::from(repo.forks) / u64::from(repo.stars);
        repo.gained_forks = u32::try_from(estimate).unwrap_or(u32::MAX);
    }

    repo
}
