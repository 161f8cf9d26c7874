//! Channel trait: the abstraction over chat platforms.
//!
//! A Channel connects SkyChat to a messaging platform (Discord, a replayed
//! transcript, etc.). The context engine only needs two things from it:
//! a bounded, newest-first replay of recent history and a way to post the
//! generated reply (text, or an image with a caption).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ChannelError;
use crate::image::GeneratedImage;
use crate::message::ChannelMessage;

/// Unique identifier (name) of a channel, e.g. `"bot-test"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelId(pub String);

impl ChannelId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ChannelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The core Channel trait.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Human-readable platform name (e.g., "discord", "transcript").
    fn name(&self) -> &str;

    /// Up to `limit` most recent messages in `channel`, newest first.
    ///
    /// The result is finite and bounded by `limit`; implementations must not
    /// return more.
    async fn history(
        &self,
        channel: &ChannelId,
        limit: usize,
    ) -> std::result::Result<Vec<ChannelMessage>, ChannelError>;

    /// Post a message to `channel`.
    async fn send(&self, channel: &ChannelId, content: &str)
    -> std::result::Result<(), ChannelError>;

    /// Post `caption` with `image` attached.
    async fn send_image(
        &self,
        channel: &ChannelId,
        caption: &str,
        image: &GeneratedImage,
    ) -> std::result::Result<(), ChannelError>;

    /// Health check: is the channel connected and operational?
    async fn health_check(&self) -> std::result::Result<bool, ChannelError> {
        Ok(true)
    }
}
