// src/services/github_search.rs

//! GitHub repository search API.
//!
//! Used both as a periodic repository source and for the on-demand model
//! search.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::Result;
use crate::models::keywords::model_search_terms;
use crate::models::{Config, Repository};
use crate::services::{FetchOutcome, Fetcher};
use crate::utils::http::fetch_json;
use crate::utils::{join_url, parse_timestamp};

const SOURCE: &str = "GitHub Search";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    full_name: String,
    #[serde(default)]
    html_url: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    stargazers_count: u32,
    #[serde(default)]
    forks_count: u32,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    topics: Vec<String>,
    #[serde(default)]
    pushed_at: Option<String>,
    #[serde(default)]
    updated_at: Option<String>,
}

impl SearchItem {
    fn into_repository(self, now: DateTime<Utc>) -> Repository {
        let mut repo = Repository::new(self.full_name, SOURCE, now);
        if !self.html_url.is_empty() {
            repo.url = self.html_url;
        }
        repo.description = self.description.unwrap_or_default();
        repo.language = self.language.unwrap_or_default();
        repo.stars = self.stargazers_count;
        repo.forks = self.forks_count;
        // Rough growth estimate; search results carry no trend data.
        repo.trend_metrics.stars_24h = self.stargazers_count / 1000;
        repo.tech_stack = self.topics;

        if let Some(raw) = self.pushed_at.or(self.updated_at) {
            let (at, provenance) = parse_timestamp(&raw, now);
            repo.last_commit = Some(at);
            repo.last_commit_provenance = provenance;
        }
        repo
    }
}

fn search_url(api_base: &str, query: &str, extra: &str) -> String {
    let q: String = url::form_urlencoded::byte_serialize(query.as_bytes()).collect();
    join_url(api_base, &format!("search/repositories?q={q}{extra}"))
}

async fn search(
    client: &reqwest::Client,
    api_base: &str,
    query: &str,
    extra: &str,
    now: DateTime<Utc>,
) -> Result<Vec<Repository>> {
    let url = search_url(api_base, query, extra);
    let response: SearchResponse = fetch_json(client, SOURCE, &url).await?;
    Ok(response
        .items
        .into_iter()
        .filter(|item| item.full_name.contains('/'))
        .map(|item| item.into_repository(now))
        .collect())
}

/// Periodic search over the configured topic queries.
pub struct GithubSearch {
    client: reqwest::Client,
    api_base: String,
    queries: Vec<String>,
    limit: usize,
}

impl GithubSearch {
    pub fn new(config: &Config, client: reqwest::Client) -> Self {
        Self {
            client,
            api_base: config.sources.github_api_base.clone(),
            queries: config.sources.search_queries.clone(),
            limit: config.sources.search_limit,
        }
    }
}

#[async_trait]
impl Fetcher for GithubSearch {
    type Item = Repository;

    fn name(&self) -> &str {
        SOURCE
    }

    async fn fetch(&self) -> FetchOutcome<Repository> {
        let now = Utc::now();
        let mut outcome = FetchOutcome::ok(SOURCE, Vec::new());
        if self.queries.is_empty() || self.limit == 0 {
            return outcome;
        }
        let per_query = self.limit / self.queries.len() + 1;

        // Sequential on purpose: the search API has a tight per-minute quota.
        for query in &self.queries {
            if outcome.items.len() >= self.limit {
                break;
            }
            let extra = format!("&per_page={per_query}");
            match search(&self.client, &self.api_base, query, &extra, now).await {
                Ok(repos) => outcome.items.extend(repos),
                Err(error) => {
                    log::warn!("GitHub search '{}' failed: {}", query, error);
                    outcome.errors.push(error);
                }
            }
        }

        outcome.items.truncate(self.limit);
        outcome
    }
}

/// Whether a search hit is about the requested model.
fn is_model_relevant(repo: &Repository, model: &str, terms: &[String]) -> bool {
    let name = repo.name.to_lowercase();
    let desc = repo.description.to_lowercase();
    terms.iter().any(|term| {
        let term = term.to_lowercase();
        name.contains(&term) || desc.contains(&term)
    }) || name.contains(&model.to_lowercase())
}

/// Synchronous search for one model's repositories.
///
/// Returns the relevant hits sorted by stars, as GitHub ranks them.
pub async fn search_model_repos(
    client: &reqwest::Client,
    api_base: &str,
    model: &str,
) -> Result<Vec<Repository>> {
    let terms = model_search_terms(model);
    let query = format!("{} AI language model", terms.join(" OR "));
    let repos = search(client, api_base, &query, "&sort=stars&order=desc", Utc::now()).await?;

    Ok(repos
        .into_iter()
        .filter(|repo| is_model_relevant(repo, model, &terms))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Provenance;
    use crate::utils::http::create_github_client;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn body() -> serde_json::Value {
        serde_json::json!({
            "items": [
                {
                    "full_name": "meta-llama/llama3",
                    "html_url": "https://github.com/meta-llama/llama3",
                    "description": "The official Meta Llama 3 GitHub site",
                    "stargazers_count": 27000,
                    "forks_count": 3000,
                    "language": "Python",
                    "topics": ["llm"],
                    "pushed_at": "2024-05-01T12:00:00Z"
                },
                {
                    "full_name": "someone/unrelated",
                    "description": null,
                    "stargazers_count": 5,
                    "pushed_at": "garbage"
                }
            ]
        })
    }

    #[tokio::test]
    async fn test_fetch_maps_items() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/repositories"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body()))
            .mount(&server)
            .await;

        let mut config = Config::default();
        config.sources.github_api_base = server.uri();
        config.sources.search_queries = vec!["topic:llm sort:stars".into()];
        config.sources.search_limit = 10;
        let client = create_github_client(&config.http).unwrap();

        let outcome = GithubSearch::new(&config, client).fetch().await;
        assert!(outcome.errors.is_empty());
        assert_eq!(outcome.items.len(), 2);

        let llama = &outcome.items[0];
        assert_eq!(llama.stars, 27000);
        assert_eq!(llama.trend_metrics.stars_24h, 27);
        assert_eq!(llama.last_commit_provenance, Provenance::Source);
        assert_eq!(llama.tech_stack, vec!["llm"]);

        let unrelated = &outcome.items[1];
        assert!(unrelated.description.is_empty());
        assert_eq!(unrelated.last_commit_provenance, Provenance::Fallback);
    }

    #[tokio::test]
    async fn test_model_search_filters_irrelevant_hits() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/repositories"))
            .and(query_param("sort", "stars"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body()))
            .mount(&server)
            .await;

        let config = Config::default();
        let client = create_github_client(&config.http).unwrap();
        let repos = search_model_repos(&client, &server.uri(), "llama").await.unwrap();
        assert_eq!(repos.len(), 1);
        assert_eq!(repos[0].name, "meta-llama/llama3");
    }

    #[tokio::test]
    async fn test_search_error_status_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let mut config = Config::default();
        config.sources.github_api_base = server.uri();
        let client = create_github_client(&config.http).unwrap();

        let outcome = GithubSearch::new(&config, client).fetch().await;
        assert!(outcome.is_failure());
        assert_eq!(outcome.errors.len(), config.sources.search_queries.len());
    }
}
