// src/server/handlers.rs

//! Route handlers. All of them read the current snapshots; none blocks on
//! a pipeline run.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse};
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::AppState;
use super::page::render_index;
use crate::models::{Paper, Repository};
use crate::pipeline::score::score_repository;
use crate::services::search_model_repos;

pub const RESEARCH_ARTICLES_PATH: &str = "/api/research-articles";

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let repos = state.snapshots.repos.current();
    let papers = state.snapshots.papers.current();
    let papers: Vec<Paper> = papers.items.iter().cloned().map(Paper::with_fallback_url).collect();
    Html(render_index(&repos.items, &papers, state.snapshots.last_updated()))
}

pub async fn repos(State(state): State<AppState>) -> Json<Vec<Repository>> {
    Json(state.snapshots.repos.current().items.clone())
}

pub async fn research_articles(State(state): State<AppState>) -> Json<Vec<Paper>> {
    let snapshot = state.snapshots.papers.current();
    Json(snapshot.items.iter().cloned().map(Paper::with_fallback_url).collect())
}

/// Old path of the article list.
pub async fn papers_moved() -> impl IntoResponse {
    (
        StatusCode::MOVED_PERMANENTLY,
        [(header::LOCATION, RESEARCH_ARTICLES_PATH)],
    )
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub last_updated: Option<DateTime<Utc>>,
    pub trending_repos_count: usize,
    pub research_papers_count: usize,
}

pub async fn stats(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse {
        last_updated: state.snapshots.last_updated(),
        trending_repos_count: state.snapshots.repos.current().len(),
        research_papers_count: state.snapshots.papers.current().len(),
    })
}

#[derive(Debug, Serialize)]
pub struct ModelReposResponse {
    pub model: String,
    pub repos: Vec<Repository>,
}

/// On-demand search; upstream failures answer with an empty list.
pub async fn model_repos(State(state): State<AppState>, Path(model): Path<String>) -> Json<ModelReposResponse> {
    let mut repos = match search_model_repos(&state.github, &state.github_api_base, &model).await {
        Ok(repos) => repos,
        Err(error) => {
            log::warn!("Model search for '{}' failed: {}", model, error);
            Vec::new()
        }
    };

    let now = Utc::now();
    for repo in &mut repos {
        score_repository(repo, &state.keywords, now);
    }
    Json(ModelReposResponse { model, repos })
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
