use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use docsdoc::api::{create_app, AppState};
use docsdoc::config::Config;
use docsdoc::{DocsService, MISSING_KEY_SENTINEL};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tower::ServiceExt;

mod common;
use common::test_helpers::*;

fn app(config: &Config) -> Router {
    create_app(AppState::new(DocsService::from_config(config).unwrap()))
}

async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn test_fetch_repo_requires_repo_url() {
    let config = create_test_config("http://127.0.0.1:9");
    let (status, body) = post_json(app(&config), "/fetch-repo", json!({})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "repoUrl is required"}));
}

#[tokio::test]
async fn test_fetch_repo_returns_snapshot() {
    let mut github = mockito::Server::new_async().await;
    let _repo = mock_repo(&mut github, "octo/demo", "main").await;
    let _readme = mock_readme(&mut github, "octo/demo", "# Demo").await;
    let _commits = mock_commits(&mut github, "octo/demo", json!([])).await;
    let _tree = mock_tree(&mut github, "octo/demo", "main", &["LICENSE"]).await;

    let config = create_test_config(&github.url());
    let (status, body) = post_json(
        app(&config),
        "/api/fetch-repo",
        json!({"repoUrl": "https://github.com/octo/demo"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"repo": "octo/demo", "defaultBranch": "main", "readmeText": "# Demo", "commits": [], "files": []})
    );
}

#[tokio::test]
async fn test_invalid_repo_url_is_server_error() {
    let config = create_test_config("http://127.0.0.1:9");
    let (status, body) = post_json(app(&config), "/fetch-repo", json!({"repoUrl": "https://example.com/x"})).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Invalid GitHub repo URL"}));
}

#[tokio::test]
async fn test_translate_without_key_makes_no_model_call() {
    let mut gemini = mockito::Server::new_async().await;
    let never = gemini
        .mock("POST", mockito::Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let mut config = create_test_config("http://127.0.0.1:9");
    config.gemini.api_base = gemini.url();
    let (status, body) = post_json(
        app(&config),
        "/translate-docs",
        json!({"text": "Hello world", "language": "French"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"translated": MISSING_KEY_SENTINEL}));
    never.assert_async().await;
}

#[tokio::test]
async fn test_qa_requires_question() {
    let config = create_test_config("http://127.0.0.1:9");
    let (status, body) = post_json(app(&config), "/qa", json!({"context": {"repo": "octo/demo"}})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "question is required"}));
}

#[tokio::test]
async fn test_numeric_question_is_accepted() {
    let config = create_test_config("http://127.0.0.1:9");
    let (status, body) = post_json(app(&config), "/qa", json!({"question": 42, "context": {}})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"answer": MISSING_KEY_SENTINEL}));
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let config = create_test_config("http://127.0.0.1:9");
    let request = Request::builder()
        .method("POST")
        .uri("/summarise-docs")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(app(&config), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().is_some_and(|e| !e.is_empty()));
}

#[tokio::test]
async fn test_summarise_with_key_calls_gemini() {
    let mut gemini = mockito::Server::new_async().await;
    let call = mock_gemini(&mut gemini, "- Demo project\n- MIT licensed").await;

    let config = with_gemini(create_test_config("http://127.0.0.1:9"), &gemini.url());
    let (status, body) = post_json(app(&config), "/summarise-docs", json!({"text": "# Demo"})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"summary": "- Demo project\n- MIT licensed"}));
    call.assert_async().await;
}

#[tokio::test]
async fn test_gemini_error_message_is_returned() {
    let mut gemini = mockito::Server::new_async().await;
    let _call = gemini
        .mock("POST", GEMINI_PATH)
        .with_status(400)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error": {"code": 400, "message": "API key not valid. Please pass a valid API key.", "status": "INVALID_ARGUMENT"}}"#)
        .create_async()
        .await;

    let config = with_gemini(create_test_config("http://127.0.0.1:9"), &gemini.url());
    let (status, body) = post_json(app(&config), "/check-doc-drift", json!({"context": {}})).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "API key not valid. Please pass a valid API key."}));
}

#[tokio::test]
async fn test_analyze_without_readme_skips_summary() {
    let mut github = mockito::Server::new_async().await;
    let _repo = mock_repo(&mut github, "octo/bare", "main").await;
    let _readme = mock_not_found(&mut github, "/repos/octo/bare/readme").await;
    let _commits = mock_commits(&mut github, "octo/bare", json!([])).await;
    let _tree = mock_tree(&mut github, "octo/bare", "main", &["main.go"]).await;
    let _file = mock_file(&mut github, "octo/bare", "main.go", "package main").await;

    let config = create_test_config(&github.url());
    let (status, body) = post_json(
        app(&config),
        "/analyze",
        json!({"repoUrl": "https://github.com/octo/bare", "emoji": false}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["snapshot"]["files"][0]["path"], "main.go");
    assert_eq!(body["summary"]["status"], "skipped");
    assert_eq!(body["docs"], json!({"status": "ok", "text": MISSING_KEY_SENTINEL}));
    assert_eq!(body["drift"], json!({"status": "ok", "text": MISSING_KEY_SENTINEL}));
}

#[tokio::test]
async fn test_health() {
    let config = create_test_config("http://127.0.0.1:9");
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body) = send(app(&config), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["llmConfigured"], false);
}
