// src/models/mod.rs

//! Domain models for the collector.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
pub mod keywords;
mod paper;
mod repository;

use std::fmt;

use serde::{Deserialize, Serialize};

// Re-export all public types
pub use config::{
    Config, FilterConfig, GITHUB_TOKEN_ENV, HttpConfig, ScheduleConfig, ScoringConfig,
    ServerConfig, SourcesConfig,
};
pub use keywords::KeywordTable;
pub use paper::{FALLBACK_SEARCH_URL, Paper};
pub use repository::{Repository, TrendMetrics};

/// Author sentinel used when a payload carries no parsable author.
pub const UNKNOWN_AUTHOR: &str = "unknown";

/// Where a timestamp came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// Parsed from the source payload
    #[default]
    Source,
    /// Source value missing or unparsable; set to fetch time
    Fallback,
}

/// The two content types, one pipeline each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Repositories,
    Papers,
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentKind::Repositories => write!(f, "repositories"),
            ContentKind::Papers => write!(f, "papers"),
        }
    }
}

/// Behavior shared by every collected record.
pub trait Item: Clone + Serialize + Send + Sync + 'static {
    /// Natural key used for deduplication.
    fn identity_key(&self) -> String;

    /// Number of populated optional fields.
    fn completeness(&self) -> usize;

    /// Current relevance score.
    fn relevance(&self) -> f64;
}
