//! Shared test helpers for responder and pipeline tests.

use async_trait::async_trait;
use skychat_core::channel::{Channel, ChannelId};
use skychat_core::error::ChannelError;
use skychat_core::image::GeneratedImage;
use skychat_core::message::ChannelMessage;
use std::sync::Mutex;

/// A channel that replays fixed history and records everything posted to it.
#[derive(Default)]
pub struct RecordingChannel {
    pub history: Vec<ChannelMessage>,
    pub sent: Mutex<Vec<(String, String)>>,
    /// `(channel, caption, filename)` per posted image.
    pub images: Mutex<Vec<(String, String, String)>>,
    pub broken_history: bool,
}

impl RecordingChannel {
    pub fn sent_texts(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(_, text)| text.clone())
            .collect()
    }
}

#[async_trait]
impl Channel for RecordingChannel {
    fn name(&self) -> &str {
        "recording"
    }

    async fn history(
        &self,
        channel: &ChannelId,
        limit: usize,
    ) -> Result<Vec<ChannelMessage>, ChannelError> {
        if self.broken_history {
            return Err(ChannelError::HistoryUnavailable {
                channel: channel.to_string(),
                reason: "timeout".into(),
            });
        }
        Ok(self.history.iter().take(limit).cloned().collect())
    }

    async fn send(&self, channel: &ChannelId, content: &str) -> Result<(), ChannelError> {
        self.sent
            .lock()
            .unwrap()
            .push((channel.to_string(), content.to_string()));
        Ok(())
    }

    async fn send_image(
        &self,
        channel: &ChannelId,
        caption: &str,
        image: &GeneratedImage,
    ) -> Result<(), ChannelError> {
        self.images.lock().unwrap().push((
            channel.to_string(),
            caption.to_string(),
            image.filename.clone(),
        ));
        Ok(())
    }
}
