//! OpenAI image generation backend.
//!
//! Posts the prompt to `/images/generations` asking for a URL, then
//! downloads the image from that URL.

use async_trait::async_trait;
use serde::Deserialize;
use skychat_core::error::ProviderError;
use skychat_core::image::{GeneratedImage, ImageGenerator};
use tracing::{debug, error};

/// Filename given to every generated image.
pub const GENERATED_IMAGE_FILENAME: &str = "generated_image.png";

pub struct OpenAiImageGenerator {
    base_url: String,
    api_key: String,
    model: String,
    size: String,
    client: reqwest::Client,
}

impl OpenAiImageGenerator {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        size: impl Into<String>,
        timeout: std::time::Duration,
    ) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::NotConfigured(format!("HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            size: size.into(),
            client,
        })
    }

    fn request_body(&self, prompt: &str, reference_url: Option<&str>) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": self.model,
            "prompt": prompt,
            "n": 1,
            "size": self.size,
            "response_format": "url",
        });
        if let Some(reference) = reference_url.filter(|url| !url.is_empty()) {
            body["reference_image"] = serde_json::Value::String(reference.to_string());
        }
        body
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, ProviderError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        if status != 200 {
            let body = response.text().await.unwrap_or_default();
            error!(status, body = %body, "Failed to download generated image");
            return Err(ProviderError::DownloadFailed {
                status_code: status,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

/// Pull the image URL out of a generation payload.
pub(crate) fn extract_image_url(payload: &serde_json::Value) -> Result<String, ProviderError> {
    let response: ImagesResponse = serde_json::from_value(payload.clone())
        .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;

    response
        .data
        .into_iter()
        .next()
        .and_then(|image| image.url)
        .ok_or_else(|| ProviderError::ApiError {
            status_code: 200,
            message: "No image URL in response".into(),
        })
}

#[async_trait]
impl ImageGenerator for OpenAiImageGenerator {
    fn name(&self) -> &str {
        "openai-images"
    }

    async fn generate(
        &self,
        prompt: &str,
        reference_url: Option<&str>,
    ) -> Result<GeneratedImage, ProviderError> {
        let url = format!("{}/images/generations", self.base_url);
        let body = self.request_body(prompt, reference_url);

        debug!(model = %self.model, payload = %body, "Submitting image generation request");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status().as_u16();

        if status == 401 || status == 403 {
            let error_body = response.text().await.unwrap_or_default();
            error!(status, body = %error_body, "Image backend rejected credentials");
            return Err(ProviderError::AuthenticationFailed {
                status_code: status,
                message: "Invalid API key or insufficient permissions".into(),
            });
        }

        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            error!(status, body = %error_body, "Image backend returned error");
            return Err(ProviderError::ApiError {
                status_code: status,
                message: error_body,
            });
        }

        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;
        debug!(payload = %payload, "Received image generation payload");

        let image_url = extract_image_url(&payload)?;
        let bytes = self.download(&image_url).await?;

        Ok(GeneratedImage {
            filename: GENERATED_IMAGE_FILENAME.into(),
            prompt: prompt.to_string(),
            bytes,
        })
    }
}

// --- API types ---

#[derive(Debug, Deserialize)]
struct ImagesResponse {
    #[serde(default)]
    data: Vec<ImageData>,
}

#[derive(Debug, Deserialize)]
struct ImageData {
    #[serde(default)]
    url: Option<String>,
}
