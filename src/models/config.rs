//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Environment variable holding an optional GitHub API token.
pub const GITHUB_TOKEN_ENV: &str = "GITHUB_API_TOKEN";

/// Accepted range for outbound request timeouts, in seconds.
pub const TIMEOUT_RANGE_SECS: std::ops::RangeInclusive<u64> = 10..=30;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// HTTP client behavior
    #[serde(default)]
    pub http: HttpConfig,

    /// Pipeline intervals
    #[serde(default)]
    pub schedule: ScheduleConfig,

    /// Listener settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Post-merge staleness filter
    #[serde(default)]
    pub filter: FilterConfig,

    /// Upstream endpoints
    #[serde(default)]
    pub sources: SourcesConfig,

    /// Scoring knobs
    #[serde(default)]
    pub scoring: ScoringConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Pick up the GitHub token from the environment unless the file set one.
    pub fn with_env_token(mut self) -> Self {
        if self.http.github_token.is_none() {
            self.http.github_token = std::env::var(GITHUB_TOKEN_ENV)
                .ok()
                .filter(|t| !t.trim().is_empty());
        }
        self
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.http.user_agent.trim().is_empty() {
            return Err(AppError::validation("http.user_agent is empty"));
        }
        for (name, secs) in [
            ("http.timeout_secs", self.http.timeout_secs),
            ("http.api_timeout_secs", self.http.api_timeout_secs),
        ] {
            if !TIMEOUT_RANGE_SECS.contains(&secs) {
                return Err(AppError::validation(format!(
                    "{} must be within {}..={} seconds",
                    name,
                    TIMEOUT_RANGE_SECS.start(),
                    TIMEOUT_RANGE_SECS.end()
                )));
            }
        }
        if self.http.max_concurrent == 0 {
            return Err(AppError::validation("http.max_concurrent must be > 0"));
        }
        if self.schedule.repos_interval_secs == 0 || self.schedule.papers_interval_secs == 0 {
            return Err(AppError::validation("schedule intervals must be > 0"));
        }
        if self.server.port == 0 {
            return Err(AppError::validation("server.port must be > 0"));
        }
        if self.sources.trending_paths.is_empty() {
            return Err(AppError::validation("No trending paths defined"));
        }
        if self.sources.search_queries.is_empty() {
            return Err(AppError::validation("No search queries defined"));
        }
        if self.sources.search_limit == 0 {
            return Err(AppError::validation("sources.search_limit must be > 0"));
        }
        if self.sources.max_articles_per_source == 0 {
            return Err(AppError::validation("sources.max_articles_per_source must be > 0"));
        }
        for base in [
            &self.sources.github_base,
            &self.sources.github_api_base,
            &self.sources.papers_with_code_url,
            &self.sources.hacker_news_base,
            &self.sources.devto_url,
            &self.sources.csdn_url,
        ] {
            url::Url::parse(base)?;
        }
        if !(0.0..=1.0).contains(&self.filter.min_relevance_score) {
            return Err(AppError::validation(
                "filter.min_relevance_score must be within [0, 1]",
            ));
        }
        Ok(())
    }
}

/// HTTP client settings shared by every fetcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Timeout for page scrapes in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Timeout for JSON API lookups in seconds
    #[serde(default = "defaults::api_timeout")]
    pub api_timeout_secs: u64,

    /// Maximum concurrent requests per source
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,

    /// Optional GitHub token, raises the API rate limit
    #[serde(default, skip_serializing)]
    pub github_token: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            api_timeout_secs: defaults::api_timeout(),
            max_concurrent: defaults::max_concurrent(),
            github_token: None,
        }
    }
}

/// Fixed pipeline intervals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    #[serde(default = "defaults::repos_interval")]
    pub repos_interval_secs: u64,

    #[serde(default = "defaults::papers_interval")]
    pub papers_interval_secs: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            repos_interval_secs: defaults::repos_interval(),
            papers_interval_secs: defaults::papers_interval(),
        }
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Explicit bind host; auto-detected when absent
    #[serde(default)]
    pub host: Option<String>,

    #[serde(default = "defaults::port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: None,
            port: defaults::port(),
        }
    }
}

/// Criteria applied to merged repositories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Minimum estimated stars gained per day
    #[serde(default)]
    pub min_stars_growth: u32,

    /// Staleness window in days
    #[serde(default = "defaults::max_days_since_commit")]
    pub max_days_since_commit: i64,

    #[serde(default)]
    pub requires_documentation: bool,

    #[serde(default = "defaults::min_relevance_score")]
    pub min_relevance_score: f64,

    /// Minimum-size floor; takes precedence over the staleness rule
    #[serde(default = "defaults::min_results")]
    pub min_results: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            min_stars_growth: 0,
            max_days_since_commit: defaults::max_days_since_commit(),
            requires_documentation: false,
            min_relevance_score: defaults::min_relevance_score(),
            min_results: defaults::min_results(),
        }
    }
}

/// Upstream endpoints. Base URLs are configurable so tests can point them
/// at a local mock server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    #[serde(default = "defaults::github_base")]
    pub github_base: String,

    #[serde(default = "defaults::github_api_base")]
    pub github_api_base: String,

    /// Trending pages relative to `github_base`
    #[serde(default = "defaults::trending_paths")]
    pub trending_paths: Vec<String>,

    /// Topic queries for the GitHub search fetcher, which runs alongside trending
    #[serde(default = "defaults::search_queries")]
    pub search_queries: Vec<String>,

    /// Total repositories requested across all search queries
    #[serde(default = "defaults::search_limit")]
    pub search_limit: usize,

    #[serde(default = "defaults::papers_with_code_url")]
    pub papers_with_code_url: String,

    #[serde(default = "defaults::hacker_news_base")]
    pub hacker_news_base: String,

    /// How many top stories to inspect
    #[serde(default = "defaults::hacker_news_story_limit")]
    pub hacker_news_story_limit: usize,

    #[serde(default = "defaults::devto_url")]
    pub devto_url: String,

    #[serde(default = "defaults::csdn_url")]
    pub csdn_url: String,

    /// Cap on AI-related articles kept from one list source
    #[serde(default = "defaults::max_articles_per_source")]
    pub max_articles_per_source: usize,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            github_base: defaults::github_base(),
            github_api_base: defaults::github_api_base(),
            trending_paths: defaults::trending_paths(),
            search_queries: defaults::search_queries(),
            search_limit: defaults::search_limit(),
            papers_with_code_url: defaults::papers_with_code_url(),
            hacker_news_base: defaults::hacker_news_base(),
            hacker_news_story_limit: defaults::hacker_news_story_limit(),
            devto_url: defaults::devto_url(),
            csdn_url: defaults::csdn_url(),
            max_articles_per_source: defaults::max_articles_per_source(),
        }
    }
}

/// Scoring settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ScoringConfig {
    /// Fixed seed for placeholder metrics; entropy when absent
    #[serde(default)]
    pub placeholder_seed: Option<u64>,
}

mod defaults {
    // HTTP defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; llm-news/0.1)".into()
    }
    pub fn timeout() -> u64 {
        15
    }
    pub fn api_timeout() -> u64 {
        10
    }
    pub fn max_concurrent() -> usize {
        5
    }

    // Schedule defaults
    pub fn repos_interval() -> u64 {
        60 * 60
    }
    pub fn papers_interval() -> u64 {
        6 * 60 * 60
    }

    pub fn port() -> u16 {
        8081
    }

    // Filter defaults
    pub fn max_days_since_commit() -> i64 {
        180
    }
    pub fn min_relevance_score() -> f64 {
        0.01
    }
    pub fn min_results() -> usize {
        50
    }

    // Source defaults
    pub fn github_base() -> String {
        "https://github.com".into()
    }
    pub fn github_api_base() -> String {
        "https://api.github.com".into()
    }
    pub fn trending_paths() -> Vec<String> {
        vec![
            "/trending".into(),
            "/trending?since=weekly".into(),
            "/trending?since=monthly".into(),
            "/trending/python".into(),
            "/trending/javascript".into(),
            "/trending/typescript".into(),
            "/trending/jupyter-notebook".into(),
            "/trending/cpp".into(),
            "/trending/go".into(),
        ]
    }
    pub fn search_queries() -> Vec<String> {
        vec![
            "topic:artificial-intelligence sort:stars".into(),
            "topic:ai sort:stars".into(),
            "topic:machine-learning sort:stars".into(),
            "topic:deep-learning sort:stars".into(),
            "topic:llm sort:stars".into(),
            "topic:nlp sort:stars".into(),
            "topic:language-model sort:stars".into(),
            "topic:diffusion-models sort:stars".into(),
            "language:cpp topic:ai sort:stars".into(),
            "language:cpp topic:machine-learning sort:stars".into(),
            "language:go topic:ai sort:stars".into(),
            "language:go topic:llm sort:stars".into(),
            "language:go topic:rag sort:stars".into(),
        ]
    }
    pub fn search_limit() -> usize {
        50
    }
    pub fn papers_with_code_url() -> String {
        "https://paperswithcode.com/api/v1/papers/?topics=language-modelling,transformer,nlp,llm,gpt,diffusion-models&page=1".into()
    }
    pub fn hacker_news_base() -> String {
        "https://hacker-news.firebaseio.com/v0".into()
    }
    pub fn hacker_news_story_limit() -> usize {
        30
    }
    pub fn devto_url() -> String {
        "https://dev.to/api/articles?tag=ai&top=5".into()
    }
    pub fn csdn_url() -> String {
        "https://blog.csdn.net/nav/ai".into()
    }
    pub fn max_articles_per_source() -> usize {
        5
    }
}
