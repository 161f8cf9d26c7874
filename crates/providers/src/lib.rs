//! Chat completion and image generation backends for SkyChat.
//!
//! Chat backends implement `skychat_core::Provider`; image backends
//! implement `skychat_core::ImageGenerator`.

pub mod openai_compat;
pub mod openai_images;

use std::sync::Arc;
use std::time::Duration;

use skychat_config::AppConfig;
use skychat_core::error::ProviderError;
use skychat_core::image::ImageGenerator;
use skychat_core::provider::Provider;

pub use openai_compat::OpenAiCompatProvider;
pub use openai_images::OpenAiImageGenerator;

fn api_key(config: &AppConfig) -> Result<String, ProviderError> {
    config
        .chat
        .api_key
        .clone()
        .filter(|key| !key.is_empty())
        .ok_or_else(|| ProviderError::NotConfigured("no API key set (CHATGPT_API_KEY)".into()))
}

/// Build the configured chat backend.
pub fn build_from_config(config: &AppConfig) -> Result<Arc<dyn Provider>, ProviderError> {
    let api_key = api_key(config)?;

    let provider = OpenAiCompatProvider::new(
        "openai",
        &config.chat.api_url,
        api_key,
        &config.chat.model,
        Duration::from_secs(config.chat.http_timeout_secs),
    )?
    .with_max_message_length(config.chat.max_message_length);

    Ok(Arc::new(provider))
}

/// Build the image backend. It shares the chat endpoint and key.
pub fn build_image_generator_from_config(
    config: &AppConfig,
) -> Result<Arc<dyn ImageGenerator>, ProviderError> {
    let generator = OpenAiImageGenerator::new(
        &config.chat.api_url,
        api_key(config)?,
        &config.chat.image_model,
        &config.chat.image_size,
        Duration::from_secs(config.chat.http_timeout_secs),
    )?;
    Ok(Arc::new(generator))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_api_key_is_not_configured() {
        let err = build_from_config(&AppConfig::default()).err().unwrap();
        assert!(matches!(err, ProviderError::NotConfigured(_)));
    }

    #[test]
    fn builds_with_api_key() {
        let mut config = AppConfig::default();
        config.chat.api_key = Some("sk-test".into());
        let provider = build_from_config(&config).unwrap();
        assert_eq!(provider.name(), "openai");
    }

    #[test]
    fn image_generator_needs_api_key() {
        let err = build_image_generator_from_config(&AppConfig::default())
            .err()
            .unwrap();
        assert!(matches!(err, ProviderError::NotConfigured(_)));

        let mut config = AppConfig::default();
        config.chat.api_key = Some("sk-test".into());
        let generator = build_image_generator_from_config(&config).unwrap();
        assert_eq!(generator.name(), "openai-images");
    }
}
