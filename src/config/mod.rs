mod env_manager;

use crate::error::{DocsError, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

pub use env_manager::get_env_value;

/// Default GitHub REST endpoint
pub const GITHUB_API_BASE: &str = "https://api.github.com";
/// Default generative language endpoint
pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
/// Model used when none is configured
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-lite";

/// Main configuration struct for the application
///
/// Every section has defaults, so a TOML file only needs the keys it wants
/// to change.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// HTTP listener settings
    pub server: ServerConfig,
    /// GitHub API access
    pub github: GitHubConfig,
    /// Limits applied while collecting a snapshot
    pub collector: CollectorConfig,
    /// Gemini API access
    pub gemini: GeminiConfig,
    /// Prompt sizing and generation concurrency
    pub generation: GenerationConfig,
    /// Backoff policy for transient upstream failures
    pub retry: RetryPolicy,
}

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the HTTP server binds to
    pub bind_addr: String,
    /// Default log level when RUST_LOG is unset
    pub log_level: String,
}

/// GitHub API access settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// REST API base URL
    pub api_base: String,
    /// Optional access token sent as a bearer credential
    #[serde(skip_serializing)]
    pub token: Option<String>,
    /// User agent GitHub requires on every request
    pub user_agent: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

/// Limits applied while collecting a repository snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    /// Maximum number of source files fetched per snapshot
    pub max_files: usize,
    /// Number of recent commits fetched from the default branch
    pub commit_count: usize,
    /// File extensions (without the dot) eligible for collection
    pub extensions: Vec<String>,
    /// Maximum number of file downloads in flight
    pub max_concurrent_fetches: usize,
    /// Wall-clock budget for a whole snapshot in seconds
    pub deadline_secs: u64,
}

/// Gemini API access settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    /// API base URL, up to and including the version segment
    pub api_base: String,
    /// API key; generation returns a placeholder when absent
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Model name
    pub model: String,
    /// HTTP timeout in seconds
    pub timeout_secs: u64,
    /// Sampling temperature
    pub temperature: Option<f32>,
    /// Upper bound on generated tokens
    pub max_output_tokens: Option<u32>,
}

/// Prompt sizing and generation concurrency
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Maximum characters of serialized context included in a prompt
    pub context_max_chars: usize,
    /// Maximum number of generation calls in flight across all requests
    pub max_concurrent: usize,
    /// Deadline for a single generation attempt in seconds
    pub call_timeout_secs: u64,
}

/// Exponential backoff policy for transient failures
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Delay before the first retry in milliseconds
    pub base_delay_ms: u64,
    /// Cap on any single delay in milliseconds
    pub max_delay_ms: u64,
}

impl Config {
    /// Loads configuration from defaults, an optional TOML file and the environment
    ///
    /// The file is `path` when given, otherwise `DOCSDOC_CONFIG`, otherwise
    /// `<config dir>/docsdoc/config.toml` if it exists.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let explicit = path
            .map(Path::to_path_buf)
            .or_else(|| get_env_value("DOCSDOC_CONFIG").map(PathBuf::from));

        let mut config = match explicit {
            Some(path) => Self::from_file(&path)?,
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(path) => Self::from_file(&path)?,
                None => Self::default(),
            },
        };

        config.apply_overrides(get_env_value);
        config.validate()?;
        Ok(config)
    }

    /// Reads a TOML configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            DocsError::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        debug!(path = %path.display(), "loaded configuration file");
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| DocsError::Config(format!("Failed to parse config file: {}", e)))
    }

    /// Default configuration file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("docsdoc").join("config.toml"))
    }

    /// Applies overrides from a variable lookup (normally the process environment)
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup("GITHUB_TOKEN") {
            self.github.token = Some(token);
        }
        if let Some(base) = lookup("GITHUB_API_BASE_URL") {
            self.github.api_base = base;
        }
        if let Some(key) = lookup("GEMINI_API_KEY") {
            self.gemini.api_key = Some(key);
        }
        if let Some(model) = lookup("GEMINI_MODEL") {
            self.gemini.model = model;
        }
        if let Some(base) = lookup("GEMINI_API_BASE_URL") {
            self.gemini.api_base = base;
        }
        if let Some(bind) = lookup("DOCSDOC_BIND") {
            self.server.bind_addr = bind;
        }
        if let Some(level) = lookup("DOCSDOC_LOG") {
            self.server.log_level = level;
        }
    }

    /// Rejects settings the service cannot run with
    pub fn validate(&self) -> Result<()> {
        self.server
            .bind_addr
            .parse::<SocketAddr>()
            .map_err(|e| DocsError::Config(format!("Invalid bind address {}: {}", self.server.bind_addr, e)))?;

        let limits = [
            ("collector.max_files", self.collector.max_files),
            ("collector.max_concurrent_fetches", self.collector.max_concurrent_fetches),
            ("generation.context_max_chars", self.generation.context_max_chars),
            ("generation.max_concurrent", self.generation.max_concurrent),
        ];
        let timeouts = [
            ("collector.deadline_secs", self.collector.deadline_secs),
            ("generation.call_timeout_secs", self.generation.call_timeout_secs),
            ("github.timeout_secs", self.github.timeout_secs),
            ("gemini.timeout_secs", self.gemini.timeout_secs),
        ];
        let zero = limits
            .iter()
            .find(|(_, value)| *value == 0)
            .map(|(name, _)| *name)
            .or_else(|| timeouts.iter().find(|(_, value)| *value == 0).map(|(name, _)| *name));
        if let Some(name) = zero {
            return Err(DocsError::Config(format!("{} must be greater than zero", name)));
        }
        if self.collector.extensions.is_empty() {
            return Err(DocsError::Config("collector.extensions must not be empty".into()));
        }
        Ok(())
    }

    /// The Gemini key, if one is configured and non-blank
    pub fn gemini_api_key(&self) -> Option<&str> {
        self.gemini.api_key.as_deref().filter(|key| !key.trim().is_empty())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8000".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_base: GITHUB_API_BASE.to_string(),
            token: None,
            user_agent: "docsdoc-app".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            max_files: 8,
            commit_count: 5,
            extensions: ["ts", "tsx", "js", "jsx", "py", "go", "rb", "java", "md"]
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            max_concurrent_fetches: 4,
            deadline_secs: 60,
        }
    }
}

impl CollectorConfig {
    /// The snapshot deadline as a duration
    pub fn deadline(&self) -> Duration {
        Duration::from_secs(self.deadline_secs)
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_base: GEMINI_API_BASE.to_string(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: 90,
            temperature: None,
            max_output_tokens: None,
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            context_max_chars: 15_000,
            max_concurrent: 4,
            call_timeout_secs: 120,
        }
    }
}

impl GenerationConfig {
    /// The per-attempt deadline as a duration
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay_ms: 500,
            max_delay_ms: 8_000,
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Delay before retry number `attempt` (zero-based), doubling each time
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u64 << attempt.min(20);
        Duration::from_millis(self.base_delay_ms.saturating_mul(factor).min(self.max_delay_ms))
    }
}
