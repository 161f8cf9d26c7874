//! OpenAI-compatible chat completion backend.
//!
//! Works with OpenAI itself and any endpoint exposing `/chat/completions`
//! (OpenRouter, Ollama, vLLM, ...). The rendered prompt is sent as a single
//! user message; the reply is trimmed to fit a chat message.

use async_trait::async_trait;
use serde::Deserialize;
use skychat_core::error::ProviderError;
use skychat_core::provider::{Completion, Provider};
use tracing::{debug, warn};

/// Default cap on reply length, in characters.
pub const DEFAULT_MAX_MESSAGE_LENGTH: usize = 2000;

/// An OpenAI-compatible chat provider.
pub struct OpenAiCompatProvider {
    name: String,
    base_url: String,
    api_key: String,
    model: String,
    max_message_length: usize,
    client: reqwest::Client,
}

impl OpenAiCompatProvider {
    /// Create a provider with the given request timeout.
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: std::time::Duration,
    ) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::NotConfigured(format!("HTTP client: {e}")))?;

        Ok(Self {
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            max_message_length: DEFAULT_MAX_MESSAGE_LENGTH,
            client,
        })
    }

    pub fn with_max_message_length(mut self, max_message_length: usize) -> Self {
        self.max_message_length = max_message_length;
        self
    }

    fn request_body(&self, prompt: &str) -> serde_json::Value {
        serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "user", "content": prompt }
            ],
        })
    }
}

/// Pull the reply text out of a completion payload.
pub(crate) fn extract_content(payload: &serde_json::Value) -> Result<String, ProviderError> {
    let response: ApiResponse = serde_json::from_value(payload.clone())
        .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;

    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| ProviderError::ApiError {
            status_code: 200,
            message: "No message content in response".into(),
        })
}

/// Fit a reply for posting: replies of `max_len` characters or more are cut
/// to `max_len - 4` characters plus `"..."`, then literal `\n` escapes
/// become line breaks.
pub(crate) fn postprocess(content: &str, max_len: usize) -> String {
    let trimmed = if content.chars().count() >= max_len {
        let mut cut: String = content.chars().take(max_len.saturating_sub(4)).collect();
        cut.push_str("...");
        cut
    } else {
        content.to_string()
    };
    trimmed.replace("\\n", "\n")
}

#[async_trait]
impl Provider for OpenAiCompatProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, prompt: &str) -> std::result::Result<Completion, ProviderError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = self.request_body(prompt);

        debug!(provider = %self.name, model = %self.model, payload = %body, "Sending completion request");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status().as_u16();

        if status == 401 || status == 403 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Provider rejected credentials");
            return Err(ProviderError::AuthenticationFailed {
                status_code: status,
                message: "Invalid API key or insufficient permissions".into(),
            });
        }

        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Provider returned error");
            return Err(ProviderError::ApiError {
                status_code: status,
                message: error_body,
            });
        }

        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;
        debug!(provider = %self.name, payload = %payload, "Received completion payload");

        let content = postprocess(&extract_content(&payload)?, self.max_message_length);
        let model = payload["model"]
            .as_str()
            .unwrap_or(&self.model)
            .to_string();

        Ok(Completion {
            content,
            model,
            raw: payload,
        })
    }

    async fn health_check(&self) -> std::result::Result<bool, ProviderError> {
        let url = format!("{}/models", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        Ok(response.status().is_success())
    }
}

// --- API types ---

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    choices: Vec<ApiChoice>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiMessage,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    content: Option<String>,
}
