//! Tool provider trait: pluggable sources of auxiliary prompt data.
//!
//! A tool provider looks at the inbound message and contributes zero or more
//! named results (search hits, lookups, etc.) that are appended to the
//! rendered prompt as `[Tool:name] content` lines.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ToolError;
use crate::message::ChannelMessage;

/// One named piece of tool output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResult {
    /// Label shown in the prompt
    pub name: String,

    /// The output content
    pub content: String,
}

impl ToolResult {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// The serialized form used in the prompt.
    pub fn render(&self) -> String {
        format!("[Tool:{}] {}", self.name, self.content)
    }
}

/// The core ToolProvider trait.
///
/// Providers are independent of each other and may be invoked concurrently.
#[async_trait]
pub trait ToolProvider: Send + Sync {
    /// The unique name of this provider, used in diagnostics.
    fn name(&self) -> &str;

    /// Produce results relevant to `message`, in the order they should appear.
    async fn gather(
        &self,
        message: &ChannelMessage,
    ) -> std::result::Result<Vec<ToolResult>, ToolError>;
}
