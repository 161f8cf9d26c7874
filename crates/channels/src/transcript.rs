//! Transcript channel.
//!
//! An in-process channel backed by a JSON transcript: an array of
//! [`ChannelMessage`] objects in chronological order. History is replayed
//! from the transcript; sent replies are appended as messages from the bot.
//! Generated images are kept in memory and written next to the transcript on
//! save.

use std::path::Path;

use async_trait::async_trait;
use skychat_core::channel::{Channel, ChannelId};
use skychat_core::error::ChannelError;
use skychat_core::image::GeneratedImage;
use skychat_core::message::{Attachment, Author, ChannelMessage};
use tracing::{debug, info};

pub struct TranscriptChannel {
    bot: Author,
    messages: tokio::sync::Mutex<Vec<ChannelMessage>>,
    images: tokio::sync::Mutex<Vec<GeneratedImage>>,
}

impl TranscriptChannel {
    /// A transcript channel seeded with `messages` (chronological). Replies
    /// are posted as `bot`.
    pub fn from_messages(bot: Author, messages: Vec<ChannelMessage>) -> Self {
        Self {
            bot,
            messages: tokio::sync::Mutex::new(messages),
            images: tokio::sync::Mutex::new(Vec::new()),
        }
    }

    /// Load a transcript file.
    pub async fn load_from(path: &Path, bot: Author) -> Result<Self, ChannelError> {
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            ChannelError::InvalidTranscript(format!("{}: {e}", path.display()))
        })?;
        let messages: Vec<ChannelMessage> = serde_json::from_str(&raw).map_err(|e| {
            ChannelError::InvalidTranscript(format!("{}: {e}", path.display()))
        })?;
        debug!(path = %path.display(), count = messages.len(), "Loaded transcript");
        Ok(Self::from_messages(bot, messages))
    }

    /// Write the transcript, including posted replies, back to disk. Posted
    /// images land in the transcript's directory under their own filenames.
    pub async fn save_to(&self, path: &Path) -> Result<(), ChannelError> {
        let write_failed = |target: &Path, e: std::io::Error| ChannelError::DeliveryFailed {
            channel: target.display().to_string(),
            reason: e.to_string(),
        };

        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        for image in self.images.lock().await.iter() {
            let target = dir.join(&image.filename);
            tokio::fs::write(&target, &image.bytes)
                .await
                .map_err(|e| write_failed(&target, e))?;
            debug!(path = %target.display(), bytes = image.bytes.len(), "Saved image");
        }

        let json = {
            let messages = self.messages.lock().await;
            serde_json::to_string_pretty(&*messages)
                .map_err(|e| ChannelError::InvalidTranscript(e.to_string()))?
        };
        tokio::fs::write(path, json)
            .await
            .map_err(|e| write_failed(path, e))
    }

    /// Append a message as if it arrived on the channel.
    pub async fn push(&self, message: ChannelMessage) {
        self.messages.lock().await.push(message);
    }

    /// A snapshot of every message, chronological.
    pub async fn messages(&self) -> Vec<ChannelMessage> {
        self.messages.lock().await.clone()
    }

    /// Images posted so far, in posting order.
    pub async fn images(&self) -> Vec<GeneratedImage> {
        self.images.lock().await.clone()
    }
}

#[async_trait]
impl Channel for TranscriptChannel {
    fn name(&self) -> &str {
        "transcript"
    }

    async fn history(
        &self,
        channel: &ChannelId,
        limit: usize,
    ) -> Result<Vec<ChannelMessage>, ChannelError> {
        let messages = self.messages.lock().await;
        let mut in_channel: Vec<(usize, &ChannelMessage)> = messages
            .iter()
            .enumerate()
            .filter(|(_, m)| &m.channel_id == channel)
            .collect();
        // Newest first; for equal timestamps the later transcript entry wins.
        in_channel.sort_by(|(ia, a), (ib, b)| b.timestamp.cmp(&a.timestamp).then(ib.cmp(ia)));

        Ok(in_channel
            .into_iter()
            .take(limit)
            .map(|(_, m)| m.clone())
            .collect())
    }

    async fn send(&self, channel: &ChannelId, content: &str) -> Result<(), ChannelError> {
        info!(
            channel = %channel,
            content_len = content.len(),
            "Transcript send"
        );
        let reply = ChannelMessage::new(channel.clone(), self.bot.clone(), content);
        self.messages.lock().await.push(reply);
        Ok(())
    }

    async fn send_image(
        &self,
        channel: &ChannelId,
        caption: &str,
        image: &GeneratedImage,
    ) -> Result<(), ChannelError> {
        info!(
            channel = %channel,
            filename = %image.filename,
            bytes = image.bytes.len(),
            "Transcript image send"
        );
        let reply = ChannelMessage::new(channel.clone(), self.bot.clone(), caption)
            .with_attachment(Attachment::new(&image.filename, &image.filename));
        self.messages.lock().await.push(reply);
        self.images.lock().await.push(image.clone());
        Ok(())
    }
}
