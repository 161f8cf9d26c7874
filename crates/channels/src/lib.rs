//! Channel implementations for SkyChat.
//!
//! Each channel implements the `skychat_core::Channel` trait.

pub mod transcript;

pub use transcript::TranscriptChannel;
