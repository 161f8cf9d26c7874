//! Prompt assembly.
//!
//! Layout of a rendered prompt:
//!
//! ```text
//! prefix + middle + suffix
//!  \n author: content \n author: content      (history, oldest first)
//!  \n [Tool:name] content \n ...              (tool results)
//! ```
//!
//! Either block is omitted entirely when it has no entries.

use serde::Serialize;
use skychat_core::message::ContextMessage;
use skychat_core::tool::ToolResult;

/// Separator placed before each block and between block entries.
pub const BLOCK_SEPARATOR: &str = " \n ";

/// The fixed text around the caller-supplied middle section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptTemplate {
    pub prefix: String,
    pub suffix: String,
}

impl PromptTemplate {
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            suffix: suffix.into(),
        }
    }

    /// `prefix + middle + suffix`
    pub fn base_prompt(&self, middle_section: &str) -> String {
        let mut base =
            String::with_capacity(self.prefix.len() + middle_section.len() + self.suffix.len());
        base.push_str(&self.prefix);
        base.push_str(middle_section);
        base.push_str(&self.suffix);
        base
    }
}

/// Everything needed to render one prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConversationContext {
    pub prompt_prefix: String,
    pub middle_section: String,
    pub prompt_suffix: String,
    /// Curated history, oldest first.
    pub history: Vec<ContextMessage>,
    /// Tool results in provider registration order.
    pub tool_results: Vec<ToolResult>,
}

impl ConversationContext {
    pub fn base_prompt(&self) -> String {
        format!(
            "{}{}{}",
            self.prompt_prefix, self.middle_section, self.prompt_suffix
        )
    }

    /// Render the final prompt string. History always precedes tool results.
    pub fn render_prompt(&self) -> String {
        let mut prompt = self.base_prompt();

        if !self.history.is_empty() {
            let history: Vec<String> = self.history.iter().map(ContextMessage::render).collect();
            prompt.push_str(BLOCK_SEPARATOR);
            prompt.push_str(&history.join(BLOCK_SEPARATOR));
        }

        if !self.tool_results.is_empty() {
            let tools: Vec<String> = self.tool_results.iter().map(ToolResult::render).collect();
            prompt.push_str(BLOCK_SEPARATOR);
            prompt.push_str(&tools.join(BLOCK_SEPARATOR));
        }

        prompt
    }
}

/// Combines a template with curated history and tool results.
#[derive(Debug, Clone, Default)]
pub struct ContextAssembler {
    template: PromptTemplate,
}

impl ContextAssembler {
    pub fn new(template: PromptTemplate) -> Self {
        Self { template }
    }

    pub fn template(&self) -> &PromptTemplate {
        &self.template
    }

    pub fn assemble(
        &self,
        middle_section: &str,
        history: Vec<ContextMessage>,
        tool_results: Vec<ToolResult>,
    ) -> ConversationContext {
        ConversationContext {
            prompt_prefix: self.template.prefix.clone(),
            middle_section: middle_section.to_string(),
            prompt_suffix: self.template.suffix.clone(),
            history,
            tool_results,
        }
    }
}
