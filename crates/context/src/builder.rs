//! Conversation context builder: one curation + assembly pass per inbound
//! message.
//!
//! ```text
//! Channel::history ──► HistoryCurator ──┐
//!                                       ├──► ContextAssembler ──► ConversationContext
//! ToolResultAggregator::gather ─────────┘
//! ```

use std::sync::{Arc, RwLock};

use skychat_config::AppConfig;
use skychat_core::channel::Channel;
use skychat_core::error::ChannelError;
use skychat_core::message::ChannelMessage;
use skychat_core::tool::ToolProvider;
use tracing::{debug, warn};

use crate::aggregator::ToolResultAggregator;
use crate::assembler::{ContextAssembler, ConversationContext, PromptTemplate};
use crate::curator::HistoryCurator;

/// Errors from building a context.
///
/// Curation and assembly cannot fail; only reading history can.
#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    #[error("Failed to read channel history: {0}")]
    History(#[from] ChannelError),
}

pub struct ConversationContextBuilder {
    assembler: ContextAssembler,
    curator: HistoryCurator,
    context_window: usize,
    aggregator: ToolResultAggregator,
    bot_user: RwLock<Option<String>>,
}

impl ConversationContextBuilder {
    pub fn new(
        template: PromptTemplate,
        curator: HistoryCurator,
        context_window: usize,
    ) -> Self {
        Self {
            assembler: ContextAssembler::new(template),
            curator,
            context_window,
            aggregator: ToolResultAggregator::new(),
            bot_user: RwLock::new(None),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        let builder = Self::new(
            PromptTemplate::new(&config.prompt.prefix, &config.prompt.suffix),
            HistoryCurator::new(
                &config.bot.prefix,
                config.bot.message_limit,
                config.prompt.history_character_limit,
            ),
            config.bot.context_window,
        );
        if let Some(id) = &config.bot.user_id {
            builder.set_bot_user(id.clone());
        }
        builder
    }

    /// Bind the bot's own user ID. Until bound, any bot-flagged author is
    /// treated as self.
    pub fn set_bot_user(&self, id: impl Into<String>) {
        let id = id.into();
        debug!(bot_user = %id, "Bound bot identity");
        *self
            .bot_user
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(id);
    }

    pub fn bot_user(&self) -> Option<String> {
        self.bot_user
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn add_tool_provider(&self, provider: Arc<dyn ToolProvider>) {
        self.aggregator.register(provider);
    }

    pub fn aggregator(&self) -> &ToolResultAggregator {
        &self.aggregator
    }

    pub fn context_window(&self) -> usize {
        self.context_window
    }

    /// Build the context for `message` using the recent history of its channel.
    pub async fn build(
        &self,
        channel: &dyn Channel,
        message: &ChannelMessage,
        middle_section: &str,
    ) -> Result<ConversationContext, ContextError> {
        let mut window = channel
            .history(&message.channel_id, self.context_window)
            .await?;
        if window.len() > self.context_window {
            warn!(
                channel = %message.channel_id,
                fetched = window.len(),
                limit = self.context_window,
                "Channel returned more history than requested, truncating"
            );
            window.truncate(self.context_window);
        }

        let base_len = self
            .assembler
            .template()
            .base_prompt(middle_section)
            .chars()
            .count();
        let bot_user = self.bot_user();
        let curated = self.curator.curate(&window, bot_user.as_deref(), base_len);
        debug!(
            channel = %message.channel_id,
            window = curated.stats.window_size,
            bot_messages = curated.stats.bot_messages,
            commands_dropped = curated.stats.commands_dropped,
            repetition_excluded = curated.stats.repetition_excluded,
            truncated = curated.stats.truncated,
            characters_used = curated.stats.characters_used,
            budget = self.curator.char_budget(),
            "Curated history"
        );

        let tools = self.aggregator.gather(message).await;
        if !tools.failures.is_empty() {
            warn!(
                failed = tools.failures.len(),
                "Some tool providers failed; continuing without their results"
            );
        }

        Ok(self
            .assembler
            .assemble(middle_section, curated.into_entries(), tools.results))
    }
}
