//! Google Generative Language API (Gemini) backend.

use super::TextGenerator;
use crate::config::GeminiConfig;
use crate::error::{DocsError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Gemini `generateContent` client
pub struct GeminiClient {
    client: Client,
    api_base: String,
    model: String,
    api_key: String,
    temperature: Option<f32>,
    max_output_tokens: Option<u32>,
}

impl GeminiClient {
    /// Creates a client for the configured model
    pub fn new(config: &GeminiConfig, api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: api_key.into(),
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
        })
    }

    /// The model requests are sent to
    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_base, self.model)
    }

    fn generation_config(&self) -> Option<GenerationConfig> {
        if self.temperature.is_none() && self.max_output_tokens.is_none() {
            return None;
        }
        Some(GenerationConfig {
            temperature: self.temperature,
            max_output_tokens: self.max_output_tokens,
        })
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
            generation_config: self.generation_config(),
        };

        debug!(model = %self.model, prompt_chars = prompt.len(), "Gemini request");
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let raw = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&raw)
                .map(|envelope| envelope.error.message)
                .ok()
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| format!("Gemini API request failed: HTTP {}", status));
            return Err(DocsError::Gemini {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateContentResponse = response.json().await?;
        extract_text(parsed)
    }
}

fn extract_text(response: GenerateContentResponse) -> Result<String> {
    if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(DocsError::Llm(format!("prompt was blocked: {}", reason)));
    }

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| DocsError::Llm("Gemini returned no candidates".into()))?;

    let text: String = candidate
        .content
        .map(|content| content.parts.into_iter().filter_map(|part| part.text).collect())
        .unwrap_or_default();

    if text.is_empty() {
        let reason = candidate.finish_reason.unwrap_or_else(|| "unknown".into());
        return Err(DocsError::Llm(format!("Gemini returned no text (finish reason: {})", reason)));
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    const PATH: &str = "/models/gemini-2.5-flash-lite:generateContent";

    fn client(base: &str) -> GeminiClient {
        let config = GeminiConfig {
            api_base: base.to_string(),
            ..GeminiConfig::default()
        };
        GeminiClient::new(&config, "test-key").unwrap()
    }

    #[tokio::test]
    async fn test_generate_joins_parts() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", PATH)
            .match_header("x-goog-api-key", "test-key")
            .match_body(Matcher::PartialJson(json!({
                "contents": [{"role": "user", "parts": [{"text": "Say hi"}]}]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "candidates": [{
                        "content": {"parts": [{"text": "Hi"}, {"text": " there"}], "role": "model"},
                        "finishReason": "STOP"
                    }]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let text = client(&server.url()).generate("Say hi").await.unwrap();
        assert_eq!(text, "Hi there");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_api_error_message_is_surfaced() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", PATH)
            .with_status(429)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error": {"code": 429, "message": "Resource has been exhausted", "status": "RESOURCE_EXHAUSTED"}}"#)
            .create_async()
            .await;

        let error = client(&server.url()).generate("Say hi").await.unwrap_err();
        assert!(error.is_transient());
        assert_eq!(error.to_string(), "Resource has been exhausted");
    }

    #[test]
    fn test_blocked_prompt() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "promptFeedback": {"blockReason": "SAFETY"}
        }))
        .unwrap();
        let error = extract_text(response).unwrap_err();
        assert!(matches!(error, DocsError::Llm(ref m) if m.contains("SAFETY")));
    }

    #[test]
    fn test_empty_candidate() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{"finishReason": "MAX_TOKENS"}]
        }))
        .unwrap();
        let error = extract_text(response).unwrap_err();
        assert!(error.to_string().contains("MAX_TOKENS"));
    }

    #[test]
    fn test_generation_config_omitted_by_default() {
        let client = client("https://example.invalid/v1beta/");
        assert!(client.generation_config().is_none());
        assert_eq!(
            client.endpoint(),
            "https://example.invalid/v1beta/models/gemini-2.5-flash-lite:generateContent"
        );
    }
}
