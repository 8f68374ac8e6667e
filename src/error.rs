use std::io;
use thiserror::Error;

/// Custom result type alias for the application
pub type Result<T> = std::result::Result<T, DocsError>;

/// Errors that can occur while collecting repository material or generating docs
#[derive(Debug, Error)]
pub enum DocsError {
    /// I/O errors
    #[error("IO error: {0}")]
    IO(#[from] io::Error),

    /// HTTP transport errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing/serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing errors
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// General message errors
    #[error("{0}")]
    Message(String),

    /// A required request field was missing or malformed
    #[error("{0}")]
    InvalidInput(String),

    /// The repository URL does not look like a GitHub repository
    #[error("{0}")]
    InvalidReference(String),

    /// GitHub answered with a non-success status; carries GitHub's own message
    #[error("{message}")]
    GitHubApi {
        /// HTTP status returned by GitHub
        status: u16,
        /// Message taken from the response body when present
        message: String,
    },

    /// The Gemini API answered with a non-success status
    #[error("{message}")]
    Gemini {
        /// HTTP status returned by the API
        status: u16,
        /// Message taken from the API error envelope when present
        message: String,
    },

    /// The model produced no usable output
    #[error("LLM error: {0}")]
    Llm(String),

    /// An outbound call or the whole collection exceeded its deadline
    #[error("Timed out: {0}")]
    Timeout(String),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    /// A background task panicked or was cancelled
    #[error("Task error: {0}")]
    Task(String),
}

impl DocsError {
    /// Creates a new error with the specified message
    pub fn new(message: &str) -> Self {
        Self::Message(message.to_string())
    }

    /// Checks if this error is transient and worth retrying
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(e) => {
                e.is_timeout()
                    || e.is_connect()
                    || e.status().map_or(false, |s| s.is_server_error())
            }
            Self::IO(_) | Self::Timeout(_) => true,
            Self::GitHubApi { status, .. } | Self::Gemini { status, .. } => {
                *status == 429 || *status >= 500
            }
            _ => false,
        }
    }

    /// Whether the caller, not an upstream, is at fault
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}
