// src/pipeline/collect.rs

//! One collection run per content type: fetch, merge, enrich, score, filter.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use futures::future::join_all;

use crate::error::{AppError, Result};
use crate::models::keywords::is_ai_repository;
use crate::models::{Config, ContentKind, FilterConfig, Item, KeywordTable, Paper, Repository};
use crate::pipeline::aggregate::{merge, retain_fresh, sort_by_relevance};
use crate::pipeline::placeholder::Placeholders;
use crate::pipeline::score::{score_paper, score_repository};
use crate::services::{
    Csdn, DevTo, Fetcher, GithubEnricher, GithubSearch, GithubTrending, HackerNews,
    PapersWithCode, PapersWithCodeRepos,
};
use crate::utils::http::{create_async_client, create_github_client};

pub type BoxedFetcher<T> = Box<dyn Fetcher<Item = T>>;

/// A complete collection run producing the next snapshot's items.
#[async_trait]
pub trait Pipeline: Send + Sync {
    type Item: Item;

    fn kind(&self) -> ContentKind;

    async fn run(&self) -> Result<Vec<Self::Item>>;
}

/// Run every fetcher concurrently and collect the non-empty batches.
///
/// Fails only when no fetcher produced anything and at least one reported
/// an error.
async fn fetch_all<T: Send>(kind: ContentKind, fetchers: &[BoxedFetcher<T>]) -> Result<Vec<Vec<T>>> {
    let outcomes = join_all(fetchers.iter().map(|f| {
        log::debug!("Fetching {} from {}", kind, f.name());
        f.fetch()
    }))
    .await;

    let mut batches = Vec::new();
    let mut errors = Vec::new();
    for outcome in outcomes {
        if outcome.is_failure() {
            log::warn!("{} failed: {} error(s)", outcome.source, outcome.errors.len());
        } else {
            log::info!(
                "{}: {} {} ({} error(s))",
                outcome.source,
                outcome.items.len(),
                kind,
                outcome.errors.len()
            );
        }
        errors.extend(outcome.errors);
        if !outcome.items.is_empty() {
            batches.push(outcome.items);
        }
    }

    if batches.is_empty() && !errors.is_empty() {
        return Err(AppError::all_sources_failed(kind, &errors));
    }
    Ok(batches)
}

/// Repository collection run.
pub struct RepoPipeline {
    fetchers: Vec<BoxedFetcher<Repository>>,
    enricher: Option<GithubEnricher>,
    keywords: KeywordTable,
    filter: FilterConfig,
}

impl RepoPipeline {
    pub fn new(
        fetchers: Vec<BoxedFetcher<Repository>>,
        enricher: Option<GithubEnricher>,
        keywords: KeywordTable,
        filter: FilterConfig,
    ) -> Self {
        Self {
            fetchers,
            enricher,
            keywords,
            filter,
        }
    }

    /// Wire the production fetchers from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let pages = create_async_client(&config.http)?;
        let github = create_github_client(&config.http)?;

        let fetchers: Vec<BoxedFetcher<Repository>> = vec![
            Box::new(GithubTrending::new(config, pages.clone())),
            Box::new(GithubSearch::new(config, github.clone())),
            Box::new(PapersWithCodeRepos::new(config, pages)),
        ];
        let enricher = GithubEnricher::new(config, github);

        Ok(Self::new(
            fetchers,
            Some(enricher),
            KeywordTable::default(),
            config.filter.clone(),
        ))
    }
}

#[async_trait]
impl Pipeline for RepoPipeline {
    type Item = Repository;

    fn kind(&self) -> ContentKind {
        ContentKind::Repositories
    }

    async fn run(&self) -> Result<Vec<Repository>> {
        let batches = fetch_all(self.kind(), &self.fetchers).await?;
        let merged = merge(batches);
        let total = merged.len();

        let relevant: Vec<Repository> = merged
            .into_iter()
            .filter(|r| is_ai_repository(&r.name, &r.description))
            .collect();
        log::debug!("AI relevance gate kept {} of {} repositories", relevant.len(), total);

        let mut repos = match &self.enricher {
            Some(enricher) => enricher.enrich_all(relevant).await,
            None => relevant,
        };

        let now = Utc::now();
        for repo in &mut repos {
            score_repository(repo, &self.keywords, now);
        }
        Ok(retain_fresh(repos, &self.filter, now))
    }
}

/// Paper and article collection run.
pub struct PaperPipeline {
    fetchers: Vec<BoxedFetcher<Paper>>,
    placeholders: Mutex<Placeholders>,
    keywords: KeywordTable,
}

impl PaperPipeline {
    pub fn new(fetchers: Vec<BoxedFetcher<Paper>>, placeholders: Placeholders, keywords: KeywordTable) -> Self {
        Self {
            fetchers,
            placeholders: Mutex::new(placeholders),
            keywords,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let client = create_async_client(&config.http)?;

        let fetchers: Vec<BoxedFetcher<Paper>> = vec![
            Box::new(PapersWithCode::new(config, client.clone())),
            Box::new(HackerNews::new(config, client.clone())),
            Box::new(DevTo::new(config, client.clone())),
            Box::new(Csdn::new(config, client)),
        ];

        Ok(Self::new(
            fetchers,
            Placeholders::new(config.scoring.placeholder_seed),
            KeywordTable::default(),
        ))
    }
}

#[async_trait]
impl Pipeline for PaperPipeline {
    type Item = Paper;

    fn kind(&self) -> ContentKind {
        ContentKind::Papers
    }

    async fn run(&self) -> Result<Vec<Paper>> {
        let batches = fetch_all(self.kind(), &self.fetchers).await?;
        let mut papers = merge(batches);

        self.placeholders
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .fill_citations(&mut papers);

        let now = Utc::now();
        for paper in &mut papers {
            score_paper(paper, &self.keywords, now);
        }
        sort_by_relevance(&mut papers);
        Ok(papers)
    }
}
