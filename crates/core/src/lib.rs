//! # SkyChat Core
//!
//! Domain types, collaborator traits, and error definitions for the SkyChat
//! context engine. This crate has **no transport dependencies**: it defines
//! the shapes that the curation engine consumes and the interfaces that
//! chat platforms, tool providers, and completion backends implement.
//!
//! ## Collaborators
//!
//! - [`Channel`]: a chat platform that can replay recent history and post replies
//! - [`ToolProvider`]: a pluggable source of auxiliary data for a prompt
//! - [`Provider`]: a chat completion backend that turns a prompt into a reply
//! - [`ImageGenerator`]: a text-to-image backend

pub mod channel;
pub mod error;
pub mod image;
pub mod message;
pub mod provider;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use channel::{Channel, ChannelId};
pub use error::{ChannelError, ProviderError, ToolError};
pub use image::{GeneratedImage, ImageGenerator};
pub use message::{Attachment, Author, ChannelMessage, ContextMessage};
pub use provider::{Completion, Provider};
pub use tool::{ToolProvider, ToolResult};
