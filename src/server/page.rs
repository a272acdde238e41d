// src/server/page.rs

//! Server-rendered index page.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};

use crate::models::{Paper, Repository};

const LISTED: usize = 20;

/// Escape text for HTML element content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// JSON safe to embed in a `<script>` element.
fn embed_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|_| "[]".to_string())
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026")
}

pub fn render_index(
    repos: &[Repository],
    papers: &[Paper],
    last_updated: Option<DateTime<Utc>>,
) -> String {
    let updated = last_updated
        .map(|at| at.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "not yet".to_string());

    let mut repo_items = String::new();
    for repo in repos.iter().take(LISTED) {
        let _ = write!(
            repo_items,
            "<li><a href=\"{}\">{}</a> ★{} <small>{}</small></li>",
            escape_html(&repo.url),
            escape_html(&repo.name),
            repo.stars,
            escape_html(&repo.description),
        );
    }

    let mut paper_items = String::new();
    for paper in papers.iter().take(LISTED) {
        let _ = write!(
            paper_items,
            "<li><a href=\"{}\">{}</a> <small>{} · {:.2}</small></li>",
            escape_html(&paper.url),
            escape_html(&paper.title),
            escape_html(&paper.source),
            paper.relevance_score,
        );
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>LLM News</title>
</head>
<body>
<h1>LLM News</h1>
<p>Last updated: {updated}</p>
<h2>Trending repositories ({repo_count})</h2>
<ul>{repo_items}</ul>
<h2>Research articles ({paper_count})</h2>
<ul>{paper_items}</ul>
<script id="repos-data" type="application/json">{repos_json}</script>
<script id="papers-data" type="application/json">{papers_json}</script>
</body>
</html>
"#,
        repo_count = repos.len(),
        paper_count = papers.len(),
        repos_json = embed_json(&repos),
        papers_json = embed_json(&papers),
    )
}
