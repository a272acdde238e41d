//! Repository data structure.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Item, Provenance};

/// Short-window engagement figures.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrendMetrics {
    /// Estimated stars gained per day
    pub stars_24h: u32,
    /// Estimated forks gained per day
    pub forks_24h: u32,
    pub views_7d: u32,
}

/// A code repository discovered by one of the repository sources.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Repository {
    /// `owner/name`, the identity key
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub stars: u32,
    #[serde(default)]
    pub forks: u32,
    /// Stars gained over the source's window (day, week or month)
    #[serde(default)]
    pub gained_stars: u32,
    #[serde(default)]
    pub gained_forks: u32,
    #[serde(default)]
    pub trend_metrics: TrendMetrics,
    /// When this run observed the repository
    pub observed_at: DateTime<Utc>,
    /// Last push, when known
    #[serde(default)]
    pub last_commit: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_commit_provenance: Provenance,
    #[serde(default)]
    pub tech_stack: Vec<String>,
    #[serde(default)]
    pub relevance_score: f64,
    #[serde(default)]
    pub has_docs: bool,
    #[serde(default)]
    pub has_wiki: bool,
    #[serde(default)]
    pub has_readme: bool,
    #[serde(default)]
    pub docs_url: String,
    #[serde(default)]
    pub model_categories: Vec<String>,
    /// Source tag, e.g. "GitHub Trending"
    pub source: String,
    #[serde(default)]
    pub paper_url: String,
    #[serde(default)]
    pub paper_title: String,
    #[serde(default)]
    pub authors: Vec<String>,
}

impl Repository {
    /// A bare record with only the identity fields set.
    pub fn new(name: impl Into<String>, source: impl Into<String>, observed_at: DateTime<Utc>) -> Self {
        let name = name.into();
        Self {
            url: format!("https://github.com/{name}"),
            name,
            description: String::new(),
            language: String::new(),
            stars: 0,
            forks: 0,
            gained_stars: 0,
            gained_forks: 0,
            trend_metrics: TrendMetrics::default(),
            observed_at,
            last_commit: None,
            last_commit_provenance: Provenance::default(),
            tech_stack: Vec::new(),
            relevance_score: 0.0,
            has_docs: false,
            has_wiki: false,
            has_readme: false,
            docs_url: String::new(),
            model_categories: Vec::new(),
            source: source.into(),
            paper_url: String::new(),
            paper_title: String::new(),
            authors: Vec::new(),
        }
    }

    /// Split `owner/name` into its parts.
    pub fn owner_and_name(&self) -> Option<(&str, &str)> {
        let (owner, repo) = self.name.split_once('/')?;
        if owner.is_empty() || repo.is_empty() || repo.contains('/') {
            return None;
        }
        Some((owner, repo))
    }

    /// Whether the enricher has something to fill in.
    pub fn needs_enrichment(&self) -> bool {
        self.last_commit.is_none() || self.tech_stack.is_empty()
    }

    /// Text used for keyword matching.
    pub fn search_text(&self) -> String {
        format!("{} {}", self.name, self.description)
    }
}

impl Item for Repository {
    fn identity_key(&self) -> String {
        self.name.clone()
    }

    fn completeness(&self) -> usize {
        [
            !self.url.is_empty(),
            !self.description.is_empty(),
            !self.language.is_empty(),
            self.stars > 0,
            self.forks > 0,
            self.gained_stars > 0,
            self.trend_metrics.stars_24h > 0,
            self.last_commit.is_some(),
            !self.tech_stack.is_empty(),
            self.has_docs,
            !self.docs_url.is_empty(),
            !self.paper_url.is_empty(),
            !self.authors.is_empty(),
        ]
        .iter()
        .filter(|set| **set)
        .count()
    }

    fn relevance(&self) -> f64 {
        self.relevance_score
    }
}
