//! Image pipeline: turns a captioned image upload into a generated image.
//!
//! The message text is the prompt and the first image attachment is passed
//! to the generator as a reference. Generation failures become a short
//! apology in the channel.

use std::sync::Arc;

use skychat_core::channel::Channel;
use skychat_core::error::{ChannelError, ProviderError};
use skychat_core::image::ImageGenerator;
use skychat_core::message::ChannelMessage;
use tracing::{debug, error, info};

/// Prompts shorter than this (after trimming) are rejected.
pub const MIN_PROMPT_CHARS: usize = 3;

pub const PROMPT_TOO_SHORT_REPLY: &str =
    "Please provide a more detailed description for the image generation.";

/// Reply used when the failure carries no status code.
pub const UNEXPECTED_IMAGE_ERROR_REPLY: &str =
    "Sorry, an unexpected error occurred while generating the image.";

fn failure_reply(err: &ProviderError) -> String {
    match err.status_code() {
        Some(status) => {
            format!("Sorry, I encountered an error generating the image (status code {status}).")
        }
        None => UNEXPECTED_IMAGE_ERROR_REPLY.to_string(),
    }
}

/// What the pipeline posted for one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageOutcome {
    /// An image was posted with this caption.
    Posted { caption: String },
    /// A text reply was posted instead (short prompt or failure).
    Replied(String),
}

pub struct ImagePipeline {
    generator: Arc<dyn ImageGenerator>,
}

impl ImagePipeline {
    pub fn new(generator: Arc<dyn ImageGenerator>) -> Self {
        Self { generator }
    }

    /// Handle `message` if it has text and an image attachment.
    ///
    /// Returns `None` when the message is not an image request.
    pub async fn handle(
        &self,
        channel: &dyn Channel,
        message: &ChannelMessage,
    ) -> Result<Option<ImageOutcome>, ChannelError> {
        if message.content.is_empty() {
            return Ok(None);
        }
        let Some(reference) = message.first_image() else {
            return Ok(None);
        };

        let prompt = message.content.trim();
        if prompt.chars().count() < MIN_PROMPT_CHARS {
            debug!(message = %message.id, "Image prompt too short");
            channel
                .send(&message.channel_id, PROMPT_TOO_SHORT_REPLY)
                .await?;
            return Ok(Some(ImageOutcome::Replied(PROMPT_TOO_SHORT_REPLY.into())));
        }

        info!(
            channel = %message.channel_id,
            generator = %self.generator.name(),
            reference = %reference.filename,
            "Generating image"
        );
        let reference_url = (!reference.url.is_empty()).then_some(reference.url.as_str());
        match self.generator.generate(prompt, reference_url).await {
            Ok(image) => {
                let caption = format!("Generated image based on: \"{prompt}\"");
                channel
                    .send_image(&message.channel_id, &caption, &image)
                    .await?;
                info!(bytes = image.bytes.len(), filename = %image.filename, "Image posted");
                Ok(Some(ImageOutcome::Posted { caption }))
            }
            Err(e) => {
                error!(generator = %self.generator.name(), error = %e, "Image generation failed");
                let reply = failure_reply(&e);
                channel.send(&message.channel_id, &reply).await?;
                Ok(Some(ImageOutcome::Replied(reply)))
            }
        }
    }
}
