//! Model gateway shared by every capability.
//!
//! Without an API key the gateway answers every request with
//! [`MISSING_KEY_SENTINEL`] and makes no network call. With a key, calls are
//! bounded by a shared semaphore, each attempt gets a deadline and transient
//! failures are retried with backoff.

pub mod gemini;

pub use gemini::GeminiClient;

use crate::capability::CapabilityRequest;
use crate::config::{Config, GenerationConfig, RetryPolicy};
use crate::error::{DocsError, Result};
use crate::utils::with_backoff;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

/// Returned in place of generated text when no API key is configured
pub const MISSING_KEY_SENTINEL: &str = "[Gemini API key not set]";

/// A backend that turns a prompt into text
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Short backend name for logs
    fn name(&self) -> &'static str;

    /// Generates a completion for `prompt`
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Runs capability requests against the configured generator
#[derive(Clone)]
pub struct LlmGateway {
    generator: Option<Arc<dyn TextGenerator>>,
    permits: Arc<Semaphore>,
    retry: RetryPolicy,
    call_timeout: Duration,
}

impl LlmGateway {
    /// Creates a gateway; `None` means no key is configured
    pub fn new(generator: Option<Arc<dyn TextGenerator>>, config: &GenerationConfig, retry: RetryPolicy) -> Self {
        Self {
            generator,
            permits: Arc::new(Semaphore::new(config.max_concurrent.max(1))),
            retry,
            call_timeout: config.call_timeout(),
        }
    }

    /// Builds a Gemini-backed gateway, or an unconfigured one when no key is set
    pub fn from_config(config: &Config) -> Result<Self> {
        let generator: Option<Arc<dyn TextGenerator>> = match config.gemini_api_key() {
            Some(key) => {
                let client = GeminiClient::new(&config.gemini, key)?;
                info!(model = client.model(), "Gemini generation enabled");
                Some(Arc::new(client))
            }
            None => {
                warn!("GEMINI_API_KEY not set; generation requests will return a placeholder");
                None
            }
        };
        Ok(Self::new(generator, &config.generation, config.retry.clone()))
    }

    /// Whether a generator is available
    pub fn is_configured(&self) -> bool {
        self.generator.is_some()
    }

    /// Renders the request's prompt and returns the model output
    pub async fn run(&self, request: &CapabilityRequest) -> Result<String> {
        let kind = request.kind();
        let generator = match &self.generator {
            Some(generator) => generator.as_ref(),
            None => {
                debug!(capability = %kind, "no generator configured");
                return Ok(MISSING_KEY_SENTINEL.to_string());
            }
        };

        let prompt = request.prompt();
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|e| DocsError::Task(e.to_string()))?;

        let started = Instant::now();
        let call_timeout = self.call_timeout;
        let prompt = prompt.as_str();
        let result = with_backoff(&self.retry, DocsError::is_transient, move || async move {
            tokio::time::timeout(call_timeout, generator.generate(prompt))
                .await
                .map_err(|_| {
                    DocsError::Timeout(format!("{} call exceeded {}s", generator.name(), call_timeout.as_secs()))
                })?
        })
        .await;

        let elapsed_ms = started.elapsed().as_millis() as u64;
        match &result {
            Ok(text) => info!(
                capability = %kind,
                backend = generator.name(),
                prompt_chars = prompt.len(),
                output_chars = text.len(),
                elapsed_ms,
                "generation finished"
            ),
            Err(e) => warn!(capability = %kind, backend = generator.name(), elapsed_ms, error = %e, "generation failed"),
        }
        result
    }
}
