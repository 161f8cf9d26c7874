//! SkyChat context engine.
//!
//! Builds the prompt for one inbound chat message: a bounded, de-duplicated
//! slice of recent channel history plus auxiliary tool output, rendered
//! behind a prefix/middle/suffix template.
//!
//! - [`HistoryCurator`] picks history under a character budget
//! - [`RepetitionTracker`] spots lines the bot keeps echoing back
//! - [`ToolResultAggregator`] fans out to tool providers
//! - [`ContextAssembler`] renders the final prompt
//! - [`ChatResponder`] ties it to a channel and a completion backend
//! - [`ImagePipeline`] answers captioned image uploads with a generated image

pub mod aggregator;
pub mod assembler;
pub mod builder;
pub mod command;
pub mod curator;
pub mod image;
pub mod repetition;
pub mod responder;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use aggregator::{ProviderFailure, ToolAggregation, ToolResultAggregator};
pub use assembler::{BLOCK_SEPARATOR, ContextAssembler, ConversationContext, PromptTemplate};
pub use builder::{ContextError, ConversationContextBuilder};
pub use command::{ChannelAllowlist, ChatCommand};
pub use curator::{CuratedHistory, CurationStats, HistoryCurator};
pub use image::{ImageOutcome, ImagePipeline};
pub use repetition::{RepetitionCounts, RepetitionTracker};
pub use responder::ChatResponder;
