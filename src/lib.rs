#![doc = include_str!("../README.md")]
#![warn(missing_docs)]
#![warn(clippy::all)]

//! Docs' Doc - documentation assistant for GitHub repositories
//!
//! Fetches a repository's README, a sample of source files and recent commits,
//! then asks Gemini to summarise the docs, write or improve a README, report
//! documentation drift, translate, and answer questions.
//!
//! ## Usage
//! ```rust,no_run
//! use docsdoc::{Config, DocsService};
//!
//! async fn example() -> docsdoc::Result<()> {
//!     let config = Config::load(None)?;
//!     let service = DocsService::from_config(&config)?;
//!
//!     let analysis = service.analyze("https://github.com/octo/demo", true).await?;
//!     println!("{:?}", analysis.docs.text());
//!     Ok(())
//! }
//! ```

/// HTTP API served by the `server` binary and `docsdoc serve`
pub mod api;
/// Capability requests and prompt rendering
pub mod capability;
/// Repository snapshot collection
pub mod collector;
/// Configuration module for the application
pub mod config;
/// Prompt context assembly and size bounding
pub mod context;
/// Error handling types and utilities
pub mod error;
/// GitHub REST API client
pub mod github;
/// Model gateway and backends
pub mod llm;
/// Logging configuration and utilities
pub mod logging;
/// Parallel processing utilities
pub mod parallel;
/// Prompt templates
pub mod prompts;
/// Orchestration of collection and generation
pub mod service;
/// Repository snapshot data model
pub mod snapshot;
/// Utilities (retry helpers)
pub mod utils;

// Re-export common types
pub use capability::{CapabilityKind, CapabilityRequest};
pub use collector::SourceCollector;
pub use config::Config;
pub use context::{ContextAssembler, ContextPayload};
pub use error::{DocsError, Result};
pub use github::{GitHubClient, RepositoryReference};
pub use llm::{GeminiClient, LlmGateway, TextGenerator, MISSING_KEY_SENTINEL};
pub use service::{CapabilityOutcome, DocsService, RepositoryAnalysis};
pub use snapshot::{CommitRecord, RepoFile, RepositorySnapshot};
