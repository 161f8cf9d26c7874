//! Message domain types.
//!
//! These are the value objects that flow through the engine:
//! a channel replays [`ChannelMessage`]s → the curator keeps some of them as
//! [`ContextMessage`]s → the assembler renders those into the prompt.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::channel::ChannelId;

/// The participant who wrote a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    /// Platform-specific user ID
    pub id: String,

    /// Display name, used verbatim in the rendered history
    pub name: String,

    /// Whether the platform flags this participant as a bot account
    #[serde(default)]
    pub bot: bool,
}

impl Author {
    /// A human participant.
    pub fn user(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            bot: false,
        }
    }

    /// A participant flagged as a bot account.
    pub fn bot(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            bot: true,
        }
    }
}

/// File extensions treated as images, compared case-insensitively.
pub const IMAGE_EXTENSIONS: [&str; 5] = [".png", ".jpg", ".jpeg", ".gif", ".webp"];

/// A file attached to a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub filename: String,

    /// Where the platform serves the file
    #[serde(default)]
    pub url: String,
}

impl Attachment {
    pub fn new(filename: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            url: url.into(),
        }
    }

    /// Whether the filename carries one of [`IMAGE_EXTENSIONS`].
    pub fn is_image(&self) -> bool {
        let filename = self.filename.to_lowercase();
        IMAGE_EXTENSIONS.iter().any(|ext| filename.ends_with(ext))
    }
}

/// A message as fetched from (or received on) a channel.
///
/// Immutable snapshot: the engine never edits a message after it was fetched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelMessage {
    /// Unique message ID
    #[serde(default = "new_message_id")]
    pub id: String,

    /// The channel this message belongs to
    pub channel_id: ChannelId,

    /// Who wrote it
    pub author: Author,

    /// The text content (empty for attachment-only messages)
    #[serde(default)]
    pub content: String,

    /// Files attached to the message
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,

    /// When the platform recorded the message
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

fn new_message_id() -> String {
    Uuid::new_v4().to_string()
}

impl ChannelMessage {
    /// Create a new message stamped with the current time.
    pub fn new(channel_id: ChannelId, author: Author, content: impl Into<String>) -> Self {
        Self {
            id: new_message_id(),
            channel_id,
            author,
            content: content.into(),
            attachments: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    /// The first attachment that looks like an image.
    pub fn first_image(&self) -> Option<&Attachment> {
        self.attachments.iter().find(|a| a.is_image())
    }

    /// Override the timestamp (useful for replayed transcripts).
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Whether this message was written by the assembling bot itself.
    ///
    /// With a bound identity the author ID decides; without one, any
    /// bot-flagged author counts as self.
    pub fn is_self_authored(&self, self_identity: Option<&str>) -> bool {
        match self_identity {
            Some(id) => self.author.id == id,
            None => self.author.bot,
        }
    }
}

/// One curated history entry, rendered as `"author: content"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextMessage {
    pub author: String,
    pub content: String,
}

impl ContextMessage {
    pub fn new(author: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            content: content.into(),
        }
    }

    /// The serialized form used in the prompt.
    pub fn render(&self) -> String {
        format!("{}: {}", self.author, self.content)
    }

    /// Character count of [`render`](Self::render) without allocating.
    pub fn rendered_len(&self) -> usize {
        self.author.chars().count() + self.content.chars().count() + 2
    }
}
