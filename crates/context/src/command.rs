//! Chat command parsing.
//!
//! `!sky` asks for a reply using the configured default middle section;
//! `!sky(talk like a pirate)` supplies the middle section inline.

/// A parsed chat command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatCommand {
    /// Text inserted between the prompt prefix and suffix.
    pub middle_section: String,
    /// Whether the middle section came from the message rather than config.
    pub overridden: bool,
}

impl ChatCommand {
    /// Parse `content` as a chat command, or `None` if it does not start with
    /// `prefix`.
    ///
    /// An inline section runs from the first `(` to the first `)` after it,
    /// or to the end of the message when unclosed.
    pub fn parse(content: &str, prefix: &str, default_middle_section: &str) -> Option<Self> {
        let rest = content.strip_prefix(prefix)?;

        match rest.strip_prefix('(') {
            Some(inline) => {
                let middle = inline
                    .split_once(')')
                    .map_or(inline, |(inside, _)| inside);
                Some(Self {
                    middle_section: middle.to_string(),
                    overridden: true,
                })
            }
            None => Some(Self {
                middle_section: default_middle_section.to_string(),
                overridden: false,
            }),
        }
    }
}

/// Channels the bot answers in. Empty means every channel.
#[derive(Debug, Clone, Default)]
pub struct ChannelAllowlist {
    channels: Vec<String>,
}

impl ChannelAllowlist {
    pub fn new(channels: impl IntoIterator<Item = impl AsRef<str>>) -> Self {
        Self {
            channels: channels
                .into_iter()
                .map(|c| c.as_ref().to_lowercase())
                .collect(),
        }
    }

    /// Case-insensitive membership check.
    pub fn allows(&self, channel: &str) -> bool {
        self.channels.is_empty() || self.channels.contains(&channel.to_lowercase())
    }
}
