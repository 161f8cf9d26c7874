pub mod chat;
pub mod config_cmd;
pub mod doctor;
pub mod prompt;

use std::path::{Path, PathBuf};

use skychat_channels::TranscriptChannel;
use skychat_config::AppConfig;
use skychat_core::channel::ChannelId;
use skychat_core::message::{Attachment, Author, ChannelMessage};

/// Arguments shared by commands that replay a transcript.
#[derive(clap::Args)]
pub struct MessageArgs {
    /// JSON transcript to use as channel history
    #[arg(short, long)]
    pub transcript: PathBuf,

    /// The inbound message, e.g. "!sky(talk like a pirate) hi"
    #[arg(short, long)]
    pub message: String,

    /// Channel the message is posted in
    #[arg(long, default_value = "chat")]
    pub channel: String,

    /// Display name of the sender
    #[arg(long, default_value = "user")]
    pub author: String,

    /// Attach a file or URL to the message (repeatable). An image
    /// attachment turns the message into an image generation request.
    #[arg(long = "attach", value_name = "PATH_OR_URL")]
    pub attachments: Vec<String>,
}

impl MessageArgs {
    pub fn inbound(&self) -> ChannelMessage {
        self.attachments.iter().fold(
            ChannelMessage::new(
                ChannelId(self.channel.clone()),
                Author::user(format!("cli:{}", self.author), &self.author),
                &self.message,
            ),
            |message, source| message.with_attachment(attachment_for(source)),
        )
    }
}

/// The filename is the last path segment of `source`.
fn attachment_for(source: &str) -> Attachment {
    let filename = source
        .trim_end_matches('/')
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(source);
    Attachment::new(filename, source)
}

pub fn load_config(path: Option<&Path>) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let config = match path {
        Some(path) => AppConfig::load_with_env(path),
        None => AppConfig::load(),
    };
    Ok(config.map_err(|e| format!("Failed to load config: {e}"))?)
}

/// The identity replies are posted under.
pub fn bot_author(config: &AppConfig) -> Author {
    let id = config.bot.user_id.clone().unwrap_or_else(|| "skychat".into());
    Author::bot(id, "SkyChat")
}

pub async fn open_transcript(
    path: &Path,
    config: &AppConfig,
) -> Result<TranscriptChannel, Box<dyn std::error::Error>> {
    Ok(TranscriptChannel::load_from(path, bot_author(config)).await?)
}
