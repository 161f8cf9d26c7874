//! `skychat chat`: answer a message against a transcript.
//!
//! The inbound message is appended to the transcript first, then routed:
//! messages with an image attachment go to the image pipeline, everything
//! else to the chat responder.

use std::path::Path;

use skychat_channels::TranscriptChannel;
use skychat_context::{ChatResponder, ImageOutcome, ImagePipeline};
use skychat_core::error::ChannelError;
use skychat_core::message::ChannelMessage;

use super::MessageArgs;

/// Record `inbound` on the transcript, then let the matching handler
/// answer it. Returns the text that was posted, if any.
pub async fn dispatch(
    channel: &TranscriptChannel,
    responder: &ChatResponder,
    images: &ImagePipeline,
    inbound: ChannelMessage,
) -> Result<Option<String>, ChannelError> {
    channel.push(inbound.clone()).await;

    if inbound.first_image().is_some() {
        return Ok(images
            .handle(channel, &inbound)
            .await?
            .map(|outcome| match outcome {
                ImageOutcome::Posted { caption } => caption,
                ImageOutcome::Replied(reply) => reply,
            }));
    }
    responder.handle(channel, &inbound).await
}

pub async fn run(
    config_path: Option<&Path>,
    args: MessageArgs,
    save: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;

    if !config.has_api_key() {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set the CHATGPT_API_KEY environment variable, or add it to:");
        eprintln!("    {}", skychat_config::AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    let provider = skychat_providers::build_from_config(&config)?;
    let generator = skychat_providers::build_image_generator_from_config(&config)?;
    let channel = super::open_transcript(&args.transcript, &config).await?;
    let responder = ChatResponder::from_config(&config, provider);
    let images = ImagePipeline::new(generator);

    match dispatch(&channel, &responder, &images, args.inbound()).await? {
        Some(reply) => println!("{reply}"),
        None => {
            eprintln!(
                "Ignored: not a '{}' command or channel '{}' is not enabled",
                config.bot.prefix, args.channel
            );
        }
    }
    if save {
        channel.save_to(&args.transcript).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use skychat_config::AppConfig;
    use skychat_core::channel::{Channel, ChannelId};
    use skychat_core::error::ProviderError;
    use skychat_core::image::{GeneratedImage, ImageGenerator};
    use skychat_core::message::{Attachment, Author};
    use skychat_core::provider::{Completion, Provider};
    use std::sync::{Arc, Mutex};

    struct EchoProvider {
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Provider for EchoProvider {
        fn name(&self) -> &str {
            "echo"
        }

        async fn complete(&self, prompt: &str) -> Result<Completion, ProviderError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok(Completion::text("pong", "echo"))
        }
    }

    struct TinyImage;

    #[async_trait]
    impl ImageGenerator for TinyImage {
        fn name(&self) -> &str {
            "tiny"
        }

        async fn generate(
            &self,
            prompt: &str,
            _reference_url: Option<&str>,
        ) -> Result<GeneratedImage, ProviderError> {
            Ok(GeneratedImage {
                filename: "generated_image.png".into(),
                prompt: prompt.into(),
                bytes: vec![7; 16],
            })
        }
    }

    fn setup() -> (TranscriptChannel, ChatResponder, ImagePipeline, Arc<EchoProvider>) {
        let mut config = AppConfig::default();
        config.bot.user_id = Some("900".into());
        let provider = Arc::new(EchoProvider {
            prompts: Mutex::new(Vec::new()),
        });
        (
            TranscriptChannel::from_messages(Author::bot("900", "SkyChat"), vec![]),
            ChatResponder::from_config(&config, provider.clone()),
            ImagePipeline::new(Arc::new(TinyImage)),
            provider,
        )
    }

    fn from_user(content: &str) -> ChannelMessage {
        ChannelMessage::new(ChannelId("chat".into()), Author::user("cli:user", "user"), content)
    }

    #[tokio::test]
    async fn inbound_recorded_before_reply() {
        let (channel, responder, images, provider) = setup();

        let reply = dispatch(&channel, &responder, &images, from_user("!sky hello"))
            .await
            .unwrap();
        assert_eq!(reply.as_deref(), Some("pong"));
        assert_eq!(provider.prompts.lock().unwrap().len(), 1);

        let messages = channel.messages().await;
        let contents: Vec<&str> = messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["!sky hello", "pong"]);
        assert!(!messages[0].author.bot);
    }

    #[tokio::test]
    async fn ignored_message_is_still_recorded() {
        let (channel, responder, images, _) = setup();

        let reply = dispatch(&channel, &responder, &images, from_user("just chatting"))
            .await
            .unwrap();
        assert!(reply.is_none());
        assert_eq!(channel.messages().await.len(), 1);
    }

    #[tokio::test]
    async fn image_upload_routes_to_pipeline() {
        let (channel, responder, images, provider) = setup();
        let upload = from_user("a lighthouse at dusk")
            .with_attachment(Attachment::new("ref.png", "https://cdn/ref.png"));

        let reply = dispatch(&channel, &responder, &images, upload).await.unwrap();
        assert_eq!(
            reply.as_deref(),
            Some("Generated image based on: \"a lighthouse at dusk\"")
        );
        assert!(provider.prompts.lock().unwrap().is_empty());

        let history = channel.history(&ChannelId("chat".into()), 10).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].attachments[0].filename, "generated_image.png");
        assert_eq!(channel.images().await.len(), 1);
    }
}
