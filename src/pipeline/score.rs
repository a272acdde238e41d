// src/pipeline/score.rs

//! Relevance scoring and category tagging.
//!
//! Pure functions of the item, the keyword table and `now`. Every run
//! recomputes scores from scratch.

use chrono::{DateTime, Utc};

use crate::models::keywords::{EMERGING_TERMS, REPRODUCIBILITY_TERMS, TECHNIQUE_TERMS, count_terms};
use crate::models::{KeywordTable, Paper, Repository};

/// Upper bound of every paper-level score.
pub const PAPER_SCORE_MAX: f64 = 5.0;

const KEYWORD_BASE: f64 = 0.25;
const KEYWORD_CAP: f64 = 0.35;

fn days_between(earlier: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    ((now - earlier).num_seconds() as f64 / 86_400.0).max(0.0)
}

fn ratio(value: f64, full: f64) -> f64 {
    (value / full).min(1.0)
}

/// Score and tag a repository. The result is within `[0, 1]`.
pub fn score_repository(repo: &mut Repository, table: &KeywordTable, now: DateTime<Utc>) {
    let stars = ratio(f64::from(repo.stars), 5000.0) * 0.25;
    let growth = ratio(f64::from(repo.trend_metrics.stars_24h), 50.0) * 0.35;
    let recency = repo
        .last_commit
        .map(|at| (1.0 - ratio(days_between(at, now), 30.0)) * 0.15)
        .unwrap_or(0.0);

    let name_hits = table.count_matches(&repo.name) as f64;
    let desc_hits = table.count_matches(&repo.description) as f64;
    let tag_hits = repo.tech_stack.iter().filter(|tag| table.any_match(tag)).count() as f64;
    let keyword = (KEYWORD_BASE + 0.03 * name_hits + 0.01 * desc_hits + 0.02 * tag_hits).min(KEYWORD_CAP);

    repo.relevance_score = (stars + growth + recency + keyword).clamp(0.0, 1.0);
    repo.model_categories = table.categorize(&repo.search_text());
}

/// First sentences of the summary long enough to say something.
fn core_contributions(summary: &str) -> Vec<String> {
    summary
        .split(['.', '!', '?', '。'])
        .map(str::trim)
        .filter(|s| s.chars().count() > 10)
        .take(3)
        .map(str::to_string)
        .collect()
}

fn key_techniques(paper: &Paper) -> Vec<String> {
    let haystack = format!("{} {}", paper.title, paper.keywords.join(" ")).to_lowercase();
    TECHNIQUE_TERMS
        .iter()
        .filter(|t| haystack.contains(*t))
        .take(3)
        .map(|t| t.to_string())
        .collect()
}

/// Score, tag and fill the derived fields of a paper. Every score is within
/// `[0, 5]`.
pub fn score_paper(paper: &mut Paper, table: &KeywordTable, now: DateTime<Utc>) {
    let text = paper.search_text();
    let days = days_between(paper.published_date, now);
    let citations = f64::from(paper.citation_count);

    paper.citation_velocity = citations / days.max(1.0);
    paper.novelty_score =
        (3.0 + 0.1 * count_terms(&text, EMERGING_TERMS) as f64).min(PAPER_SCORE_MAX);
    paper.reproducibility_score = (2.5
        + 0.3 * count_terms(&paper.title, REPRODUCIBILITY_TERMS) as f64
        + 0.2 * count_terms(&paper.summary, REPRODUCIBILITY_TERMS) as f64)
        .min(PAPER_SCORE_MAX);

    let engagement = ratio(citations, 100.0) * PAPER_SCORE_MAX * 0.25;
    let velocity = ratio(paper.citation_velocity, 5.0) * PAPER_SCORE_MAX * 0.30;
    let recency = (1.0 - ratio(days, 300.0)) * PAPER_SCORE_MAX * 0.15;
    let novelty = paper.novelty_score * 0.30;
    paper.relevance_score = (engagement + velocity + recency + novelty).clamp(0.0, PAPER_SCORE_MAX);

    let lowered = text.to_lowercase();
    for keyword in table.keywords() {
        if lowered.contains(keyword) && !paper.keywords.iter().any(|k| k.eq_ignore_ascii_case(keyword)) {
            paper.keywords.push(keyword.to_string());
        }
    }
    paper.core_contributions = core_contributions(&paper.summary);
    paper.key_techniques = key_techniques(paper);
    paper.categories = table.categorize(&text);
}
