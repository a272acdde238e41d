//! Paper / article data structure.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Item, Provenance};

/// Search page used when an article has no URL of its own.
pub const FALLBACK_SEARCH_URL: &str = "https://arxiv.org/search/?query=";

/// A research paper or technical article.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Paper {
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub authors: Vec<String>,
    pub published_date: DateTime<Utc>,
    #[serde(default)]
    pub date_provenance: Provenance,
    /// Source tag, e.g. "Papers with Code"
    pub source: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub citation_count: u32,
    /// The citation count is a placeholder, not source data
    #[serde(default)]
    pub citations_estimated: bool,
    #[serde(default)]
    pub citation_velocity: f64,
    /// 0-5
    #[serde(default)]
    pub novelty_score: f64,
    /// 0-5
    #[serde(default)]
    pub reproducibility_score: f64,
    /// 0-5
    #[serde(default)]
    pub relevance_score: f64,
    #[serde(default)]
    pub core_contributions: Vec<String>,
    #[serde(default)]
    pub key_techniques: Vec<String>,
    #[serde(default)]
    pub categories: Vec<String>,
}

impl Paper {
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        source: impl Into<String>,
        published_date: DateTime<Utc>,
        date_provenance: Provenance,
    ) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            authors: Vec::new(),
            published_date,
            date_provenance,
            source: source.into(),
            summary: String::new(),
            keywords: Vec::new(),
            citation_count: 0,
            citations_estimated: false,
            citation_velocity: 0.0,
            novelty_score: 0.0,
            reproducibility_score: 0.0,
            relevance_score: 0.0,
            core_contributions: Vec::new(),
            key_techniques: Vec::new(),
            categories: Vec::new(),
        }
    }

    /// Copy with a search URL built from the title when the URL is empty.
    pub fn with_fallback_url(mut self) -> Self {
        if self.url.trim().is_empty() {
            let query: String = url::form_urlencoded::byte_serialize(self.title.as_bytes()).collect();
            self.url = format!("{FALLBACK_SEARCH_URL}{query}");
        }
        self
    }

    /// Text used for keyword matching.
    pub fn search_text(&self) -> String {
        format!("{} {}", self.title, self.summary)
    }
}

impl Item for Paper {
    fn identity_key(&self) -> String {
        let url = self.url.trim();
        if url.is_empty() {
            format!("title:{}", self.title.trim().to_lowercase())
        } else {
            url.to_string()
        }
    }

    fn completeness(&self) -> usize {
        [
            !self.url.is_empty(),
            !self.summary.is_empty(),
            !self.keywords.is_empty(),
            self.date_provenance == Provenance::Source,
            self.citation_count > 0 && !self.citations_estimated,
            self.authors.iter().any(|a| a != super::UNKNOWN_AUTHOR),
        ]
        .iter()
        .filter(|set| **set)
        .count()
    }

    fn relevance(&self) -> f64 {
        self.relevance_score
    }
}
