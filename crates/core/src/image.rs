//! Image generator trait: the abstraction over text-to-image backends.

use async_trait::async_trait;

use crate::error::ProviderError;

/// A generated image, downloaded and ready to attach.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    pub filename: String,
    pub prompt: String,
    pub bytes: Vec<u8>,
}

#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// A human-readable name for this backend (e.g., "openai-images").
    fn name(&self) -> &str;

    /// Generate one image for `prompt`, optionally guided by a reference
    /// image the user attached.
    async fn generate(
        &self,
        prompt: &str,
        reference_url: Option<&str>,
    ) -> Result<GeneratedImage, ProviderError>;
}
