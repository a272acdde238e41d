//! HTTP API.
//!
//! Serves the current snapshots as JSON plus an HTML overview page:
//!
//! ```text
//! GET /                          HTML page
//! GET /api/repos                 repositories, sorted by name
//! GET /api/research-articles     papers and articles
//! GET /api/papers                301 -> /api/research-articles
//! GET /api/stats                 counts and last update
//! GET /api/model-repos/{model}   on-demand GitHub search
//! GET /health                    liveness
//! ```

mod handlers;
pub mod page;

use std::net::{IpAddr, UdpSocket};
use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};

use crate::error::Result;
use crate::models::{Config, KeywordTable};
use crate::storage::Snapshots;
use crate::utils::http::create_github_client;

pub use handlers::{HealthResponse, ModelReposResponse, RESEARCH_ARTICLES_PATH, StatsResponse};

const FALLBACK_HOST: &str = "0.0.0.0";

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub snapshots: Snapshots,
    pub github: reqwest::Client,
    pub github_api_base: String,
    pub keywords: Arc<KeywordTable>,
}

impl AppState {
    pub fn from_config(config: &Config, snapshots: Snapshots) -> Result<Self> {
        Ok(Self {
            snapshots,
            github: create_github_client(&config.http)?,
            github_api_base: config.sources.github_api_base.clone(),
            keywords: Arc::new(KeywordTable::default()),
        })
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::index))
        .route("/api/repos", get(handlers::repos))
        .route(RESEARCH_ARTICLES_PATH, get(handlers::research_articles))
        .route("/api/papers", get(handlers::papers_moved))
        .route("/api/stats", get(handlers::stats))
        .route("/api/model-repos/{model}", get(handlers::model_repos))
        .route("/health", get(handlers::health))
        .layer(cors)
        .with_state(state)
}

/// IPv4 address of the interface holding the default route, if any.
///
/// Connecting a UDP socket sends nothing; it only makes the OS pick the
/// outbound interface. A host with LAN interfaces but no default route
/// gets `None` here and binds to [`FALLBACK_HOST`].
fn local_ipv4() -> Option<String> {
    let socket = UdpSocket::bind("0.0.0.0:0").ok()?;
    socket.connect("8.8.8.8:80").ok()?;
    match socket.local_addr().ok()?.ip() {
        IpAddr::V4(ip) if !ip.is_loopback() && !ip.is_unspecified() => Some(ip.to_string()),
        _ => None,
    }
}

/// Configured host, else the default-route address, else all interfaces.
pub fn detect_bind_host(configured: Option<&str>) -> String {
    configured
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .map(str::to_string)
        .or_else(local_ipv4)
        .unwrap_or_else(|| FALLBACK_HOST.to_string())
}

/// Bind and serve until the process ends. Failing to bind is fatal.
pub async fn serve(config: &Config, state: AppState) -> Result<()> {
    let host = detect_bind_host(config.server.host.as_deref());
    let addr = format!("{}:{}", host, config.server.port);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    log::info!("Listening on http://{}", addr);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FALLBACK_SEARCH_URL, Paper, Provenance, Repository};
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use chrono::Utc;
    use serde_json::Value;
    use tower::ServiceExt;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn state(api_base: &str) -> AppState {
        let mut config = Config::default();
        config.sources.github_api_base = api_base.to_string();
        AppState::from_config(&config, Snapshots::new()).unwrap()
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_papers_redirects_permanently() {
        let app = router(state("http://127.0.0.1:1"));
        let response = app
            .oneshot(Request::builder().uri("/api/papers").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/api/research-articles"
        );
    }

    #[tokio::test]
    async fn test_cold_start_stats() {
        let (status, body) = get_json(router(state("http://127.0.0.1:1")), "/api/stats").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["trending_repos_count"], 0);
        assert_eq!(body["research_papers_count"], 0);
        assert!(body["last_updated"].is_null());
    }

    #[tokio::test]
    async fn test_cold_start_collections_are_empty_arrays() {
        let app = router(state("http://127.0.0.1:1"));
        let (_, repos) = get_json(app.clone(), "/api/repos").await;
        let (_, papers) = get_json(app, "/api/research-articles").await;
        assert_eq!(repos, Value::Array(Vec::new()));
        assert_eq!(papers, Value::Array(Vec::new()));
    }

    #[tokio::test]
    async fn test_articles_get_fallback_url() {
        let state = state("http://127.0.0.1:1");
        let paper = Paper::new("Attention & Memory", "", "test", Utc::now(), Provenance::Source);
        state.snapshots.papers.publish(vec![paper]);
        state.snapshots.repos.publish(vec![Repository::new("a/llm", "test", Utc::now())]);

        let app = router(state);
        let (_, body) = get_json(app.clone(), "/api/research-articles").await;
        let url = body[0]["url"].as_str().unwrap();
        assert!(url.starts_with(FALLBACK_SEARCH_URL));
        assert!(url.contains("Attention+%26+Memory"));

        let (_, stats) = get_json(app, "/api/stats").await;
        assert_eq!(stats["trending_repos_count"], 1);
        assert!(stats["last_updated"].is_string());
    }

    #[tokio::test]
    async fn test_model_search_failure_is_empty_list() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let (status, body) = get_json(router(state(&server.uri())), "/api/model-repos/deepseek").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["model"], "deepseek");
        assert_eq!(body["repos"], Value::Array(Vec::new()));
    }

    #[tokio::test]
    async fn test_health_and_index() {
        let app = router(state("http://127.0.0.1:1"));
        let (status, body) = get_json(app.clone(), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(String::from_utf8_lossy(&bytes).contains("LLM News"));
    }

    #[test]
    fn test_configured_host_wins() {
        assert_eq!(detect_bind_host(Some("127.0.0.1")), "127.0.0.1");
        assert!(!detect_bind_host(Some("  ")).is_empty());
    }

    #[test]
    fn test_detected_host_is_routable_or_fallback() {
        let host = detect_bind_host(None);
        let ip: std::net::Ipv4Addr = host.parse().unwrap();
        assert!(!ip.is_loopback());
        if ip.is_unspecified() {
            assert_eq!(host, FALLBACK_HOST);
        }
    }
}
