// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;

use crate::error::{AppError, Result};
use crate::models::HttpConfig;

/// Create the client used for page scrapes.
pub fn create_async_client(config: &HttpConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

/// Create the client used for GitHub API lookups.
///
/// Adds the v3 accept header and, when a token is configured, the
/// authorization header. Without a token calls go out unauthenticated.
pub fn create_github_client(config: &HttpConfig) -> Result<reqwest::Client> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("application/vnd.github.v3+json"),
    );
    if let Some(token) = &config.github_token {
        let mut value = HeaderValue::from_str(&format!("token {token}"))
            .map_err(|e| AppError::config(format!("invalid GitHub token: {e}")))?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    }

    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .default_headers(headers)
        .timeout(Duration::from_secs(config.api_timeout_secs))
        .build()?;
    Ok(client)
}

/// Fetch a URL and return the body, treating non-2xx as an error.
pub async fn fetch_text(client: &reqwest::Client, source: &str, url: &str) -> Result<String> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(AppError::status(source, url, status.as_u16()));
    }
    Ok(response.text().await?)
}

/// Fetch a URL and decode its JSON body.
pub async fn fetch_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    source: &str,
    url: &str,
) -> Result<T> {
    let body = fetch_text(client, source, url).await?;
    serde_json::from_str(&body).map_err(|e| AppError::decode(source, e))
}

/// Whether a URL answers with a success status.
pub async fn exists(client: &reqwest::Client, source: &str, url: &str) -> Result<bool> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if status.is_success() {
        Ok(true)
    } else if status == reqwest::StatusCode::NOT_FOUND {
        Ok(false)
    } else {
        Err(AppError::status(source, url, status.as_u16()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_fetch_text_rejects_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/down"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = create_async_client(&HttpConfig::default()).unwrap();
        let err = fetch_text(&client, "test", &format!("{}/down", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Status { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_github_client_sends_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/a/b"))
            .and(header("authorization", "token secret"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .mount(&server)
            .await;

        let config = HttpConfig {
            github_token: Some("secret".into()),
            ..HttpConfig::default()
        };
        let client = create_github_client(&config).unwrap();
        let value: serde_json::Value =
            fetch_json(&client, "test", &format!("{}/repos/a/b", server.uri()))
                .await
                .unwrap();
        assert!(value.is_object());
    }

    #[tokio::test]
    async fn test_exists_maps_not_found_to_false() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/readme"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = create_async_client(&HttpConfig::default()).unwrap();
        let found = exists(&client, "test", &format!("{}/readme", server.uri()))
            .await
            .unwrap();
        assert!(!found);
    }
}
