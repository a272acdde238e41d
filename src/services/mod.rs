//! Source fetchers and the repository enricher.
//!
//! Every source implements [`Fetcher`]; pipelines are written once against
//! the trait:
//! - GitHub trending pages (`GithubTrending`)
//! - GitHub search API (`GithubSearch`)
//! - Papers with Code papers and their repositories
//! - Hacker News, Dev.to and CSDN article lists

mod csdn;
mod devto;
mod enricher;
mod github_search;
mod github_trending;
mod hacker_news;
mod papers_with_code;

use async_trait::async_trait;

use crate::error::AppError;

pub use csdn::Csdn;
pub use devto::DevTo;
pub use enricher::GithubEnricher;
pub use github_search::{GithubSearch, search_model_repos};
pub use github_trending::GithubTrending;
pub use hacker_news::HackerNews;
pub use papers_with_code::{PapersWithCode, PapersWithCodeRepos};

/// Items and errors produced by one fetch.
///
/// Multi-page sources may return both: the pages that worked and one
/// error per page that did not.
#[derive(Debug)]
pub struct FetchOutcome<T> {
    pub source: String,
    pub items: Vec<T>,
    pub errors: Vec<AppError>,
}

impl<T> FetchOutcome<T> {
    pub fn ok(source: impl Into<String>, items: Vec<T>) -> Self {
        Self {
            source: source.into(),
            items,
            errors: Vec::new(),
        }
    }

    pub fn failed(source: impl Into<String>, error: AppError) -> Self {
        Self {
            source: source.into(),
            items: Vec::new(),
            errors: vec![error],
        }
    }

    /// Whether the fetch produced nothing but errors.
    pub fn is_failure(&self) -> bool {
        self.items.is_empty() && !self.errors.is_empty()
    }
}

/// A source-specific retriever.
///
/// Implementations never return an error past this boundary: transport,
/// status and decode failures end up in [`FetchOutcome::errors`].
#[async_trait]
pub trait Fetcher: Send + Sync {
    type Item: Send;

    /// Source tag stored on produced items.
    fn name(&self) -> &str;

    async fn fetch(&self) -> FetchOutcome<Self::Item>;
}
