//! HTTP API.
//!
//! Every endpoint accepts and returns JSON. Failures are reported as
//! `{"error": "..."}` with status 400 for bad input and 500 otherwise. Routes
//! are served both at the root and under `/api`.

use crate::error::{DocsError, Result};
use crate::service::{DocsService, RepositoryAnalysis};
use crate::snapshot::RepositorySnapshot;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};

/// Target language used when a translate request names none
pub const DEFAULT_LANGUAGE: &str = "Spanish";

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    service: Arc<DocsService>,
    started_at: DateTime<Utc>,
}

impl AppState {
    /// Wraps `service` for sharing across handlers and records the start time
    pub fn new(service: DocsService) -> Self {
        Self {
            service: Arc::new(service),
            started_at: Utc::now(),
        }
    }

    /// The shared service
    pub fn service(&self) -> &DocsService {
        &self.service
    }
}

/// Reads an optional text field, stringifying numbers, booleans and structures
fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) => Some(text),
        Some(other) => Some(other.to_string()),
    })
}

/// Body of `POST /fetch-repo`
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchRepoRequest {
    /// GitHub repository URL
    #[serde(default, deserialize_with = "lenient_string")]
    pub repo_url: Option<String>,
}

/// Body of `POST /summarise-docs`
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SummariseRequest {
    /// Documentation to summarise
    #[serde(default, deserialize_with = "lenient_string")]
    pub text: Option<String>,
}

/// Body of `POST /generate-docs` and `POST /check-doc-drift`
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ContextRequest {
    /// Repository context, usually a snapshot from `/fetch-repo`
    pub context: Option<Value>,
    /// Emoji tone for generated docs, on unless set to false
    pub emoji: Option<bool>,
}

/// Body of `POST /translate-docs`
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TranslateRequest {
    /// Documentation to translate
    #[serde(default, deserialize_with = "lenient_string")]
    pub text: Option<String>,
    /// Target language, [`DEFAULT_LANGUAGE`] when absent
    #[serde(default, deserialize_with = "lenient_string")]
    pub language: Option<String>,
}

/// Body of `POST /qa`
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct QaRequest {
    /// Question about the repository
    #[serde(default, deserialize_with = "lenient_string")]
    pub question: Option<String>,
    /// Repository context the answer is based on
    pub context: Option<Value>,
}

/// Body of `POST /analyze`
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    /// GitHub repository URL
    #[serde(default, deserialize_with = "lenient_string")]
    pub repo_url: Option<String>,
    /// Emoji tone for generated docs, on unless set to false
    pub emoji: Option<bool>,
}

/// Response of `POST /summarise-docs`
#[derive(Debug, Serialize, Deserialize)]
pub struct SummaryResponse {
    /// Bulleted TL;DR
    pub summary: String,
}

/// Response of `POST /generate-docs`
#[derive(Debug, Serialize, Deserialize)]
pub struct DocsResponse {
    /// Generated or updated README
    pub docs: String,
}

/// Response of `POST /check-doc-drift`
#[derive(Debug, Serialize, Deserialize)]
pub struct DriftResponse {
    /// Drift report
    pub drift: String,
}

/// Response of `POST /translate-docs`
#[derive(Debug, Serialize, Deserialize)]
pub struct TranslateResponse {
    /// Translated documentation
    pub translated: String,
}

/// Response of `POST /qa`
#[derive(Debug, Serialize, Deserialize)]
pub struct AnswerResponse {
    /// Model answer
    pub answer: String,
}

/// Error body returned by every endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Always `healthy` while the server answers
    pub status: String,
    /// Service name
    pub service: String,
    /// Crate version
    pub version: String,
    /// Whether a Gemini key is set
    pub llm_configured: bool,
    /// Seconds since the state was created
    pub uptime_seconds: u64,
    /// Time of the check
    pub timestamp: DateTime<Utc>,
}

/// A [`DocsError`] rendered as an HTTP response
#[derive(Debug)]
pub struct ApiError(pub DocsError);

impl From<DocsError> for ApiError {
    fn from(e: DocsError) -> Self {
        Self(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(DocsError::InvalidInput(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.0.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        let mut message = self.0.to_string();
        if message.trim().is_empty() {
            message = "Error".to_string();
        }

        if status.is_server_error() {
            error!(error = %message, "request failed");
        } else {
            warn!(error = %message, "rejected request");
        }
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

type ApiResult<T> = std::result::Result<Json<T>, ApiError>;

fn required(value: Option<String>, field: &str) -> std::result::Result<String, ApiError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ApiError(DocsError::InvalidInput(format!("{} is required", field))))
}

/// Builds the router with all routes, CORS and request tracing
pub fn create_app(state: AppState) -> Router {
    let routes = Router::new()
        .route("/health", get(health_check))
        .route("/fetch-repo", post(fetch_repo))
        .route("/summarise-docs", post(summarise_docs))
        .route("/generate-docs", post(generate_docs))
        .route("/check-doc-drift", post(check_doc_drift))
        .route("/translate-docs", post(translate_docs))
        .route("/qa", post(qa))
        .route("/analyze", post(analyze));

    Router::new()
        .route("/", get(index))
        .merge(routes.clone())
        .nest("/api", routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds `addr` and serves until Ctrl-C
pub async fn serve(state: AppState, addr: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, llm = state.service.llm_configured(), "Docs' Doc server listening");

    axum::serve(listener, create_app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "could not listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}

/// Root endpoint - returns basic service information
async fn index() -> Json<Value> {
    Json(json!({
        "service": "docsdoc",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Summarise, generate, drift-check, translate and answer questions about GitHub repository docs",
        "endpoints": {
            "health": "/health",
            "fetchRepo": "/fetch-repo",
            "summariseDocs": "/summarise-docs",
            "generateDocs": "/generate-docs",
            "checkDocDrift": "/check-doc-drift",
            "translateDocs": "/translate-docs",
            "qa": "/qa",
            "analyze": "/analyze"
        }
    }))
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let now = Utc::now();
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "docsdoc".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        llm_configured: state.service.llm_configured(),
        uptime_seconds: (now - state.started_at).num_seconds().max(0) as u64,
        timestamp: now,
    })
}

async fn fetch_repo(
    State(state): State<AppState>,
    payload: std::result::Result<Json<FetchRepoRequest>, JsonRejection>,
) -> ApiResult<RepositorySnapshot> {
    let Json(request) = payload?;
    let repo_url = required(request.repo_url, "repoUrl")?;
    info!(%repo_url, "fetch-repo");
    Ok(Json(state.service.fetch_repo(&repo_url).await?))
}

async fn summarise_docs(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SummariseRequest>, JsonRejection>,
) -> ApiResult<SummaryResponse> {
    let Json(request) = payload?;
    let text = request.text.unwrap_or_default();
    let summary = state.service.summarise(&text).await?;
    Ok(Json(SummaryResponse { summary }))
}

async fn generate_docs(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ContextRequest>, JsonRejection>,
) -> ApiResult<DocsResponse> {
    let Json(request) = payload?;
    let context = request.context.unwrap_or_default();
    let docs = state
        .service
        .generate_docs(&context, request.emoji.unwrap_or(true))
        .await?;
    Ok(Json(DocsResponse { docs }))
}

async fn check_doc_drift(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ContextRequest>, JsonRejection>,
) -> ApiResult<DriftResponse> {
    let Json(request) = payload?;
    let context = request.context.unwrap_or_default();
    let drift = state.service.check_drift(&context).await?;
    Ok(Json(DriftResponse { drift }))
}

async fn translate_docs(
    State(state): State<AppState>,
    payload: std::result::Result<Json<TranslateRequest>, JsonRejection>,
) -> ApiResult<TranslateResponse> {
    let Json(request) = payload?;
    let text = request.text.unwrap_or_default();
    let language = request
        .language
        .filter(|l| !l.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());
    let translated = state.service.translate(&text, &language).await?;
    Ok(Json(TranslateResponse { translated }))
}

async fn qa(
    State(state): State<AppState>,
    payload: std::result::Result<Json<QaRequest>, JsonRejection>,
) -> ApiResult<AnswerResponse> {
    let Json(request) = payload?;
    let question = required(request.question, "question")?;
    let context = request.context.unwrap_or_default();
    let answer = state.service.answer(&question, &context).await?;
    Ok(Json(AnswerResponse { answer }))
}

async fn analyze(
    State(state): State<AppState>,
    payload: std::result::Result<Json<AnalyzeRequest>, JsonRejection>,
) -> ApiResult<RepositoryAnalysis> {
    let Json(request) = payload?;
    let repo_url = required(request.repo_url, "repoUrl")?;
    info!(%repo_url, "analyze");
    let analysis = state
        .service
        .analyze(&repo_url, request.emoji.unwrap_or(true))
        .await?;
    Ok(Json(analysis))
}
