use crate::capability::CapabilityRequest;
use crate::collector::SourceCollector;
use crate::config::Config;
use crate::context::{readme_present, ContextAssembler, ContextPayload};
use crate::error::{DocsError, Result};
use crate::github::GitHubClient;
use crate::llm::LlmGateway;
use crate::snapshot::RepositorySnapshot;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, instrument};

/// Result of one capability inside an [`analyze`](DocsService::analyze) run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum CapabilityOutcome {
    /// The model produced text (or the missing-key placeholder)
    Ok {
        /// Generated markdown
        text: String,
    },
    /// The call failed; other capabilities are unaffected
    Failed {
        /// Error message
        error: String,
    },
    /// The capability was not attempted
    Skipped {
        /// Why it was not attempted
        reason: String,
    },
}

impl CapabilityOutcome {
    fn from_result(result: Result<String>) -> Self {
        match result {
            Ok(text) => Self::Ok { text },
            Err(e) => Self::Failed { error: e.to_string() },
        }
    }

    /// The generated text, if the capability succeeded
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Ok { text } => Some(text),
            _ => None,
        }
    }

    /// Whether the capability succeeded
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok { .. })
    }
}

/// Snapshot plus the per-capability results produced from it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryAnalysis {
    /// The collected repository material
    pub snapshot: RepositorySnapshot,
    /// TL;DR of the README
    pub summary: CapabilityOutcome,
    /// Starter or improved README
    pub docs: CapabilityOutcome,
    /// Drift report
    pub drift: CapabilityOutcome,
}

/// Collector, context assembler and model gateway wired together
#[derive(Clone)]
pub struct DocsService {
    collector: SourceCollector,
    gateway: LlmGateway,
    assembler: ContextAssembler,
}

impl DocsService {
    /// Wires already-built components together
    pub fn new(collector: SourceCollector, gateway: LlmGateway, assembler: ContextAssembler) -> Self {
        Self {
            collector,
            gateway,
            assembler,
        }
    }

    /// Builds every component from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let github = GitHubClient::new(&config.github, config.retry.clone())?;
        let collector = SourceCollector::new(github, config.collector.clone());
        let gateway = LlmGateway::from_config(config)?;
        let assembler = ContextAssembler::new(config.generation.context_max_chars);
        Ok(Self::new(collector, gateway, assembler))
    }

    /// Whether a Gemini key is set
    pub fn llm_configured(&self) -> bool {
        self.gateway.is_configured()
    }

    /// Collects a snapshot of the repository at `repo_url`
    #[instrument(skip(self))]
    pub async fn fetch_repo(&self, repo_url: &str) -> Result<RepositorySnapshot> {
        self.collector.collect(repo_url).await
    }

    /// Bulleted TL;DR of `text`
    pub async fn summarise(&self, text: &str) -> Result<String> {
        self.gateway
            .run(&CapabilityRequest::Summarize { text: text.to_string() })
            .await
    }

    /// Starter README when the context has no `readmeText`, otherwise an improved one
    pub async fn generate_docs(&self, context: &Value, emoji: bool) -> Result<String> {
        let request = CapabilityRequest::GenerateDocs {
            context: self.context(context)?,
            has_readme: readme_present(context),
            emoji,
        };
        self.gateway.run(&request).await
    }

    /// Report of docs that no longer match the code or recent commits
    pub async fn check_drift(&self, context: &Value) -> Result<String> {
        let request = CapabilityRequest::DetectDrift {
            context: self.context(context)?,
        };
        self.gateway.run(&request).await
    }

    /// Translates `text` into `language`, leaving code blocks alone
    pub async fn translate(&self, text: &str, language: &str) -> Result<String> {
        let request = CapabilityRequest::Translate {
            text: text.to_string(),
            language: language.to_string(),
        };
        self.gateway.run(&request).await
    }

    /// Answers `question` from `context`; a blank question is invalid input
    pub async fn answer(&self, question: &str, context: &Value) -> Result<String> {
        if question.trim().is_empty() {
            return Err(DocsError::InvalidInput("question is required".into()));
        }
        let request = CapabilityRequest::Answer {
            question: question.to_string(),
            context: self.context(context)?,
        };
        self.gateway.run(&request).await
    }

    fn context(&self, value: &Value) -> Result<ContextPayload> {
        let payload = self.assembler.from_value(value)?;
        if payload.is_truncated() {
            debug!(max_chars = self.assembler.max_chars(), "request context truncated");
        }
        Ok(payload)
    }

    /// Fetches the repository, then runs summary, docs and drift concurrently
    ///
    /// Only the fetch can fail the call. Each capability reports its own
    /// outcome, and the summary is skipped when there is no README.
    #[instrument(skip(self))]
    pub async fn analyze(&self, repo_url: &str, emoji: bool) -> Result<RepositoryAnalysis> {
        let snapshot = self.collector.collect(repo_url).await?;
        let context = self.assembler.from_snapshot(&snapshot)?;
        if context.is_truncated() {
            debug!(repo = %snapshot.repo, max_chars = self.assembler.max_chars(), "snapshot context truncated");
        }

        let docs_request = CapabilityRequest::GenerateDocs {
            context: context.clone(),
            has_readme: snapshot.has_readme(),
            emoji,
        };
        let drift_request = CapabilityRequest::DetectDrift { context };
        let summary = async {
            if snapshot.has_readme() {
                let request = CapabilityRequest::Summarize {
                    text: snapshot.readme_text.clone(),
                };
                CapabilityOutcome::from_result(self.gateway.run(&request).await)
            } else {
                CapabilityOutcome::Skipped {
                    reason: "repository has no README".into(),
                }
            }
        };

        let (summary, docs, drift) = tokio::join!(
            summary,
            self.gateway.run(&docs_request),
            self.gateway.run(&drift_request),
        );
        let analysis = RepositoryAnalysis {
            summary,
            docs: CapabilityOutcome::from_result(docs),
            drift: CapabilityOutcome::from_result(drift),
            snapshot,
        };

        info!(
            repo = %analysis.snapshot.repo,
            summary_ok = analysis.summary.is_ok(),
            docs_ok = analysis.docs.is_ok(),
            drift_ok = analysis.drift.is_ok(),
            "analysis finished"
        );
        Ok(analysis)
    }
}
