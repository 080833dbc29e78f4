use crate::config::RepoConfig;
use crate::languages::language_color;
use crate::models::{Repo, RepoItem, RepoSearchResponse};
use anyhow::Result;
use reqwest::Client;
use reqwest::header::ACCEPT;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("repository search returned HTTP {0}")]
    Status(u16),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("malformed repository payload: {0}")]
    Payload(#[from] serde_json::Error),
}

impl From<RepoItem> for Repo {
    fn from(item: RepoItem) -> Self {
        let language_color = item
            .language
            .as_deref()
            .and_then(language_color)
            .map(str::to_string);

        Self {
            id: item.id,
            name: item.name,
            full_name: item.full_name,
            description: item.description,
            url: item.html_url,
            star_count: item.stargazers_count,
            language: item.language,
            language_color,
        }
    }
}

/// Client for the repository search endpoint.
pub struct HttpClient {
    client: Client,
    config: RepoConfig,
}

impl HttpClient {
    pub fn new(config: RepoConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    /// Fetch the most-starred repositories, highest first.
    pub async fn fetch_top_repos(&self) -> Result<Vec<Repo>, FetchError> {
        let query = format!("stars:>{}", self.config.min_stars);
        let per_page = self.config.per_page.to_string();

        let response = self
            .client
            .get(&self.config.endpoint)
            .query(&[
                ("q", query.as_str()),
                ("sort", "stars"),
                ("order", "desc"),
                ("per_page", per_page.as_str()),
            ])
            .header(ACCEPT, "application/vnd.github+json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        let payload: RepoSearchResponse = serde_json::from_slice(&body)?;
        Ok(payload.items.into_iter().map(Repo::from).collect())
    }

    /// Like [`fetch_top_repos`](Self::fetch_top_repos) but never fails: any
    /// error is logged and replaced by [`fallback_repos`].
    pub async fn top_repos_or_fallback(&self) -> Vec<Repo> {
        match self.fetch_top_repos().await {
            Ok(repos) => {
                tracing::info!(count = repos.len(), "fetched top repositories");
                repos
            }
            Err(err) => {
                tracing::warn!(error = %err, endpoint = %self.config.endpoint, "repository fetch failed, showing fallback list");
                fallback_repos()
            }
        }
    }
}

/// Shown whenever the live search is unavailable.
pub fn fallback_repos() -> Vec<Repo> {
    let repo = |id, owner: &str, name: &str, description: &str, stars, language: &str| Repo {
        id,
        name: name.to_string(),
        full_name: format!("{owner}/{name}"),
        description: Some(description.to_string()),
        url: format!("https://github.com/{owner}/{name}"),
        star_count: stars,
        language: Some(language.to_string()),
        language_color: language_color(language).map(str::to_string),
    };

    vec![
        repo(
            28457823,
            "freeCodeCamp",
            "freeCodeCamp",
            "freeCodeCamp.org's open-source codebase and curriculum. Learn to code for free.",
            400_000,
            "TypeScript",
        ),
        repo(
            21737465,
            "EbookFoundation",
            "free-programming-books",
            "Freely available programming books",
            340_000,
            "Python",
        ),
        repo(
            21540759,
            "sindresorhus",
            "awesome",
            "Awesome lists about all kinds of interesting topics",
            330_000,
            "Markdown",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serves exactly one canned HTTP response and returns the endpoint URL
    /// plus a handle yielding the raw request.
    async fn serve_once(status_line: &str, body: &str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let response = format!(
            "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let n = socket.read(&mut buf).await.unwrap();
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&buf[..n]).to_string()
        });

        (format!("http://{addr}/search/repositories"), handle)
    }

    fn config_for(endpoint: String) -> RepoConfig {
        RepoConfig {
            endpoint,
            timeout_secs: 5,
            ..RepoConfig::default()
        }
    }

    #[tokio::test]
    async fn test_fetch_maps_items_and_colors() {
        let body = r#"{"total_count":2,"items":[
            {"id":1,"name":"rust","full_name":"rust-lang/rust","description":"Empowering everyone","html_url":"https://github.com/rust-lang/rust","stargazers_count":100000,"language":"Rust"},
            {"id":2,"name":"odd","full_name":"x/odd","description":null,"html_url":"https://github.com/x/odd","stargazers_count":12000,"language":"Zig"}
        ]}"#;
        let (endpoint, request) = serve_once("200 OK", body).await;
        let client = HttpClient::new(config_for(endpoint)).unwrap();

        let repos = client.fetch_top_repos().await.unwrap();
        assert_eq!(repos.len(), 2);
        assert_eq!(repos[0].full_name, "rust-lang/rust");
        assert_eq!(repos[0].url, "https://github.com/rust-lang/rust");
        assert_eq!(repos[0].star_count, 100000);
        assert_eq!(repos[0].language_color.as_deref(), Some("#dea584"));
        assert_eq!(repos[1].description, None);
        assert_eq!(repos[1].language_color, None);

        let request = request.await.unwrap();
        assert!(request.starts_with("GET /search/repositories?"));
        assert!(request.contains("sort=stars"));
        assert!(request.contains("order=desc"));
        assert!(request.contains("per_page=10"));
        assert!(request.contains("q=stars%3A%3E10000"));
    }

    #[tokio::test]
    async fn test_server_error_is_status_error() {
        let (endpoint, _request) = serve_once("500 Internal Server Error", "{}").await;
        let client = HttpClient::new(config_for(endpoint)).unwrap();

        match client.fetch_top_repos().await {
            Err(FetchError::Status(500)) => {}
            other => panic!("expected HTTP 500 error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_server_error_falls_back() {
        let (endpoint, _request) = serve_once("500 Internal Server Error", "{}").await;
        let client = HttpClient::new(config_for(endpoint)).unwrap();

        let repos = client.top_repos_or_fallback().await;
        assert_eq!(repos, fallback_repos());
        assert_eq!(repos.len(), 3);
    }

    #[tokio::test]
    async fn test_malformed_payload_falls_back() {
        let (endpoint, _request) = serve_once("200 OK", r#"{"items": "nope"}"#).await;
        let client = HttpClient::new(config_for(endpoint)).unwrap();

        assert!(matches!(
            client.fetch_top_repos().await,
            Err(FetchError::Payload(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_falls_back() {
        // Bind then drop to get a port nothing listens on
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = HttpClient::new(config_for(format!("http://{addr}/search"))).unwrap();
        assert_eq!(client.top_repos_or_fallback().await, fallback_repos());
    }

    #[test]
    fn test_fallback_list_is_fixed() {
        let names: Vec<_> = fallback_repos().into_iter().map(|r| r.full_name).collect();
        assert_eq!(
            names,
            vec![
                "freeCodeCamp/freeCodeCamp",
                "EbookFoundation/free-programming-books",
                "sindresorhus/awesome",
            ]
        );
    }
}
