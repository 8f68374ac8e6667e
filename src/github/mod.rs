mod reference;
pub mod types;

use crate::config::{GitHubConfig, RetryPolicy};
use crate::error::{DocsError, Result};
use crate::utils::with_backoff;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;
use url::Url;

pub use reference::RepositoryReference;
pub use types::{CommitResponse, ContentFile, RepositoryMetadata, TreeEntry, TreeResponse};

use types::ApiErrorBody;

const GITHUB_API_VERSION: &str = "2022-11-28";

/// Thin client over the GitHub REST endpoints needed for a snapshot
#[derive(Clone)]
pub struct GitHubClient {
    client: Client,
    api_base: Url,
    token: Option<String>,
    retry: RetryPolicy,
}

impl GitHubClient {
    /// Creates a client with GitHub's required headers and the configured timeout
    pub fn new(config: &GitHubConfig, retry: RetryPolicy) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert(
            HeaderName::from_static("x-github-api-version"),
            HeaderValue::from_static(GITHUB_API_VERSION),
        );
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .map_err(|e| DocsError::Config(format!("Invalid user agent: {}", e)))?,
        );

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()?;

        let api_base = Url::parse(&config.api_base)?;
        if api_base.cannot_be_a_base() {
            return Err(DocsError::Config(format!(
                "GitHub API base {} cannot be used as a base URL",
                config.api_base
            )));
        }

        Ok(Self {
            client,
            api_base,
            token: config.token.clone().filter(|t| !t.trim().is_empty()),
            retry,
        })
    }

    /// Repository metadata, used for the default branch
    pub async fn repository(&self, repo: &RepositoryReference) -> Result<RepositoryMetadata> {
        let url = self.endpoint(&["repos", repo.owner.as_str(), repo.name.as_str()], &[]);
        self.get_json(url).await
    }

    /// The repository's README as GitHub resolves it
    pub async fn readme(&self, repo: &RepositoryReference) -> Result<ContentFile> {
        let url = self.endpoint(&["repos", repo.owner.as_str(), repo.name.as_str(), "readme"], &[]);
        self.get_json(url).await
    }

    /// The most recent `count` commits on `branch`
    pub async fn recent_commits(
        &self,
        repo: &RepositoryReference,
        branch: &str,
        count: usize,
    ) -> Result<Vec<CommitResponse>> {
        let per_page = count.to_string();
        let url = self.endpoint(
            &["repos", repo.owner.as_str(), repo.name.as_str(), "commits"],
            &[("sha", branch), ("per_page", per_page.as_str())],
        );
        self.get_json(url).await
    }

    /// The full recursive tree of `branch`
    pub async fn tree(&self, repo: &RepositoryReference, branch: &str) -> Result<TreeResponse> {
        let url = self.endpoint(
            &["repos", repo.owner.as_str(), repo.name.as_str(), "git", "trees", branch],
            &[("recursive", "1")],
        );
        self.get_json(url).await
    }

    /// Decoded text of a single file at `branch`
    pub async fn file_content(&self, repo: &RepositoryReference, path: &str, branch: &str) -> Result<String> {
        let mut segments = vec!["repos", repo.owner.as_str(), repo.name.as_str(), "contents"];
        segments.extend(path.split('/').filter(|s| !s.is_empty()));
        let url = self.endpoint(&segments, &[("ref", branch)]);

        let file: ContentFile = self.get_json(url).await?;
        Ok(file.decoded_text().unwrap_or_default())
    }

    fn endpoint(&self, segments: &[&str], query: &[(&str, &str)]) -> Url {
        let mut url = self.api_base.clone();
        // api_base was checked in new(), so the segments are always available
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        with_backoff(&self.retry, DocsError::is_transient, move || self.send_get(url.clone())).await
    }

    async fn send_get<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        debug!(%url, "GitHub request");
        let mut request = self.client.get(url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ApiErrorBody>()
                .await
                .ok()
                .and_then(|body| body.message)
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| format!("GitHub API request failed: HTTP {}", status));
            return Err(DocsError::GitHubApi {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json::<T>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> GitHubClient {
        let config = GitHubConfig {
            api_base: base.to_string(),
            ..GitHubConfig::default()
        };
        GitHubClient::new(&config, RetryPolicy::none()).unwrap()
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let client = client("https://api.github.com");
        let repo = RepositoryReference::parse("https://github.com/octo/demo").unwrap();
        let url = client.endpoint(
            &["repos", repo.owner.as_str(), repo.name.as_str(), "contents", "docs", "read me.md"],
            &[("ref", "main")],
        );
        assert_eq!(
            url.as_str(),
            "https://api.github.com/repos/octo/demo/contents/docs/read%20me.md?ref=main"
        );
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let client = client("https://ghe.example.com/api/v3/");
        let url = client.endpoint(&["repos", "octo", "demo"], &[]);
        assert_eq!(url.as_str(), "https://ghe.example.com/api/v3/repos/octo/demo");
    }

    #[test]
    fn test_rejects_non_base_url() {
        let config = GitHubConfig {
            api_base: "mailto:octo@example.com".to_string(),
            ..GitHubConfig::default()
        };
        assert!(matches!(
            GitHubClient::new(&config, RetryPolicy::none()),
            Err(DocsError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_error_message_comes_from_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/repos/octo/missing")
            .with_status(404)
            .with_header("content-type", "application/json")
            .with_body(r#"{"message": "Not Found"}"#)
            .create_async()
            .await;

        let repo = RepositoryReference::parse("https://github.com/octo/missing").unwrap();
        let result = client(&server.url()).repository(&repo).await;

        match result {
            Err(DocsError::GitHubApi { status, message }) => {
                assert_eq!(status, 404);
                assert_eq!(message, "Not Found");
            }
            other => panic!("unexpected result: {:?}", other),
        }
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_token_is_sent_as_bearer() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/repos/octo/demo")
            .match_header("authorization", "Bearer ghp_test")
            .match_header("x-github-api-version", GITHUB_API_VERSION)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"full_name": "octo/demo", "default_branch": "trunk"}"#)
            .create_async()
            .await;

        let config = GitHubConfig {
            api_base: server.url(),
            token: Some("ghp_test".into()),
            ..GitHubConfig::default()
        };
        let client = GitHubClient::new(&config, RetryPolicy::none()).unwrap();
        let repo = RepositoryReference::parse("https://github.com/octo/demo").unwrap();

        let metadata = client.repository(&repo).await.unwrap();
        assert_eq!(metadata.default_branch, "trunk");
        mock.assert_async().await;
    }
}
