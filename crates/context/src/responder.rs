//! Chat responder: turns a chat command into a posted reply.
//!
//! Failures downstream of the prompt are never retried here; the user gets a
//! short apology instead.

use std::sync::Arc;

use skychat_config::AppConfig;
use skychat_core::channel::Channel;
use skychat_core::error::{ChannelError, ProviderError};
use skychat_core::message::ChannelMessage;
use skychat_core::provider::Provider;
use tracing::{debug, error, info, warn};

use crate::builder::ConversationContextBuilder;
use crate::command::{ChannelAllowlist, ChatCommand};

/// Reply used when the failure carries no status code.
pub const GENERIC_ERROR_REPLY: &str = "Sorry, I encountered an error. Please try again later.";

fn degraded_reply(err: &ProviderError) -> String {
    match err.status_code() {
        Some(status) => format!(
            "Sorry, I encountered an error (status code {status}). Please try again later."
        ),
        None => GENERIC_ERROR_REPLY.to_string(),
    }
}

pub struct ChatResponder {
    builder: ConversationContextBuilder,
    provider: Arc<dyn Provider>,
    prefix: String,
    default_middle_section: String,
    allowlist: ChannelAllowlist,
}

impl ChatResponder {
    pub fn new(
        builder: ConversationContextBuilder,
        provider: Arc<dyn Provider>,
        prefix: impl Into<String>,
        default_middle_section: impl Into<String>,
        allowlist: ChannelAllowlist,
    ) -> Self {
        Self {
            builder,
            provider,
            prefix: prefix.into(),
            default_middle_section: default_middle_section.into(),
            allowlist,
        }
    }

    pub fn from_config(config: &AppConfig, provider: Arc<dyn Provider>) -> Self {
        Self::new(
            ConversationContextBuilder::from_config(config),
            provider,
            &config.bot.prefix,
            &config.bot.default_middle_section,
            ChannelAllowlist::new(&config.bot.channels),
        )
    }

    pub fn set_bot_user(&self, id: impl Into<String>) {
        self.builder.set_bot_user(id);
    }

    pub fn context_builder(&self) -> &ConversationContextBuilder {
        &self.builder
    }

    /// Build the prompt for `message` and ask the provider for a reply.
    ///
    /// Always returns text to post; failures become an apology.
    pub async fn respond(
        &self,
        channel: &dyn Channel,
        message: &ChannelMessage,
        middle_section: &str,
    ) -> String {
        let context = match self.builder.build(channel, message, middle_section).await {
            Ok(context) => context,
            Err(e) => {
                warn!(channel = %message.channel_id, error = %e, "Could not build conversation context");
                return GENERIC_ERROR_REPLY.to_string();
            }
        };

        let prompt = context.render_prompt();
        debug!(chars = prompt.chars().count(), prompt = %prompt, "Rendered prompt");

        match self.provider.complete(&prompt).await {
            Ok(completion) => {
                info!(
                    provider = %self.provider.name(),
                    model = %completion.model,
                    reply_chars = completion.content.chars().count(),
                    "Completion received"
                );
                completion.content
            }
            Err(e) => {
                error!(provider = %self.provider.name(), error = %e, "Chat completion failed");
                degraded_reply(&e)
            }
        }
    }

    /// Handle an inbound message: reply and post if it is a chat command in
    /// an allowed channel. Messages carrying an image are left for the image
    /// pipeline.
    ///
    /// Returns the posted reply, or `None` when the message was ignored.
    pub async fn handle(
        &self,
        channel: &dyn Channel,
        message: &ChannelMessage,
    ) -> Result<Option<String>, ChannelError> {
        let bot_user = self.builder.bot_user();
        if message.is_self_authored(bot_user.as_deref()) {
            return Ok(None);
        }
        if !self.allowlist.allows(message.channel_id.as_str()) {
            debug!(channel = %message.channel_id, "Channel not in allowlist, ignoring");
            return Ok(None);
        }
        if message.first_image().is_some() {
            debug!(message = %message.id, "Image attachment present, deferring to image pipeline");
            return Ok(None);
        }
        let Some(command) =
            ChatCommand::parse(&message.content, &self.prefix, &self.default_middle_section)
        else {
            return Ok(None);
        };

        info!(
            channel = %message.channel_id,
            author = %message.author.name,
            overridden = command.overridden,
            "Handling chat command"
        );
        let reply = self
            .respond(channel, message, &command.middle_section)
            .await;
        channel.send(&message.channel_id, &reply).await?;
        Ok(Some(reply))
    }
}
