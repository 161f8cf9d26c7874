//! Provider trait: the abstraction over chat completion backends.
//!
//! The context engine hands a single rendered prompt to a Provider and gets
//! the reply text back. How the prompt travels over the wire is entirely the
//! provider's business.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

/// A complete response from a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Completion {
    /// The reply text, already post-processed for posting
    pub content: String,

    /// Which model actually responded
    pub model: String,

    /// Raw backend payload, kept for diagnostics
    #[serde(default)]
    pub raw: serde_json::Value,
}

impl Completion {
    pub fn text(content: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            model: model.into(),
            raw: serde_json::Value::Null,
        }
    }
}

/// The core Provider trait.
#[async_trait]
pub trait Provider: Send + Sync {
    /// A human-readable name for this provider (e.g., "openai").
    fn name(&self) -> &str;

    /// Send a rendered prompt and get the completion back.
    async fn complete(&self, prompt: &str) -> std::result::Result<Completion, ProviderError>;

    /// Health check: can we reach the provider?
    async fn health_check(&self) -> std::result::Result<bool, ProviderError> {
        Ok(true)
    }
}
