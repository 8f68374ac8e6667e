#![allow(dead_code)]

use base64::{engine::general_purpose::STANDARD, Engine as _};
use docsdoc::config::{Config, RetryPolicy};
use mockito::{Matcher, Mock, ServerGuard};
use serde_json::{json, Value};

pub mod test_helpers {
    use super::*;

    pub const GEMINI_PATH: &str = "/models/gemini-2.5-flash-lite:generateContent";

    /// Config pointed at a mock GitHub, with no Gemini key and fast retries
    pub fn create_test_config(github_base: &str) -> Config {
        let mut config = Config::default();
        config.github.api_base = github_base.to_string();
        config.github.token = None;
        config.gemini.api_key = None;
        config.retry = RetryPolicy {
            max_retries: 1,
            base_delay_ms: 1,
            max_delay_ms: 2,
        };
        config
    }

    /// Adds a Gemini key and points the model API at `gemini_base`
    pub fn with_gemini(mut config: Config, gemini_base: &str) -> Config {
        config.gemini.api_base = gemini_base.to_string();
        config.gemini.api_key = Some("test-key".to_string());
        config
    }

    pub fn encode(text: &str) -> String {
        STANDARD.encode(text.as_bytes())
    }

    pub fn setup_test_logger() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("docsdoc=debug")
            .with_test_writer()
            .try_init();
    }

    async fn json_mock(server: &mut ServerGuard, path: &str, status: usize, body: Value) -> Mock {
        server
            .mock("GET", path)
            .match_query(Matcher::Any)
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create_async()
            .await
    }

    pub async fn mock_repo(server: &mut ServerGuard, repo: &str, branch: &str) -> Mock {
        let body = json!({"full_name": repo, "default_branch": branch, "description": null});
        json_mock(server, &format!("/repos/{}", repo), 200, body).await
    }

    pub async fn mock_readme(server: &mut ServerGuard, repo: &str, text: &str) -> Mock {
        let body = json!({"name": "README.md", "content": encode(text), "encoding": "base64"});
        json_mock(server, &format!("/repos/{}/readme", repo), 200, body).await
    }

    pub async fn mock_not_found(server: &mut ServerGuard, path: &str) -> Mock {
        let body = json!({"message": "Not Found", "documentation_url": "https://docs.github.com/rest"});
        json_mock(server, path, 404, body).await
    }

    pub async fn mock_commits(server: &mut ServerGuard, repo: &str, commits: Value) -> Mock {
        json_mock(server, &format!("/repos/{}/commits", repo), 200, commits).await
    }

    /// Tree listing with every path as a blob
    pub async fn mock_tree(server: &mut ServerGuard, repo: &str, branch: &str, paths: &[&str]) -> Mock {
        let tree: Vec<Value> = paths
            .iter()
            .map(|path| json!({"path": path, "mode": "100644", "type": "blob", "sha": "abc123"}))
            .collect();
        let body = json!({"sha": branch, "tree": tree, "truncated": false});
        json_mock(server, &format!("/repos/{}/git/trees/{}", repo, branch), 200, body).await
    }

    pub async fn mock_file(server: &mut ServerGuard, repo: &str, path: &str, text: &str) -> Mock {
        let body = json!({"path": path, "content": encode(text), "encoding": "base64"});
        json_mock(server, &format!("/repos/{}/contents/{}", repo, path), 200, body).await
    }

    /// Gemini answer with a single text part
    pub async fn mock_gemini(server: &mut ServerGuard, text: &str) -> Mock {
        server
            .mock("POST", GEMINI_PATH)
            .match_header("x-goog-api-key", "test-key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "candidates": [{"content": {"parts": [{"text": text}], "role": "model"}, "finishReason": "STOP"}]
                })
                .to_string(),
            )
            .create_async()
            .await
    }
}
