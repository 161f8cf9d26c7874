//! Error types for the SkyChat domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each collaborator has its own error enum; curation itself never fails,
//! so there is no crate-wide error type.

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Authentication failed (status: {status_code}): {message}")]
    AuthenticationFailed { status_code: u16, message: String },

    #[error("Malformed backend response: {0}")]
    MalformedResponse(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Image download failed (status: {status_code})")]
    DownloadFailed { status_code: u16 },

    #[error("Network error: {0}")]
    Network(String),
}

impl ProviderError {
    /// HTTP status reported by the backend, when the failure carried one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::ApiError { status_code, .. }
            | Self::AuthenticationFailed { status_code, .. }
            | Self::DownloadFailed { status_code } => Some(*status_code),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("History unavailable for {channel}: {reason}")]
    HistoryUnavailable { channel: String, reason: String },

    #[error("Message delivery failed to {channel}: {reason}")]
    DeliveryFailed { channel: String, reason: String },

    #[error("Invalid transcript: {0}")]
    InvalidTranscript(String),
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool provider {provider} failed: {reason}")]
    GatherFailed { provider: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_displays_correctly() {
        let err = ProviderError::ApiError {
            status_code: 429,
            message: "Too many requests".into(),
        };
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("Too many requests"));
    }

    #[test]
    fn status_code_only_for_http_failures() {
        let api = ProviderError::ApiError {
            status_code: 500,
            message: "boom".into(),
        };
        assert_eq!(api.status_code(), Some(500));

        let auth = ProviderError::AuthenticationFailed {
            status_code: 401,
            message: "bad key".into(),
        };
        assert_eq!(auth.status_code(), Some(401));

        let download = ProviderError::DownloadFailed { status_code: 404 };
        assert_eq!(download.status_code(), Some(404));

        assert_eq!(ProviderError::Network("reset".into()).status_code(), None);
    }

    #[test]
    fn tool_error_displays_correctly() {
        let err = ToolError::GatherFailed {
            provider: "search".into(),
            reason: "index offline".into(),
        };
        assert!(err.to_string().contains("search"));
        assert!(err.to_string().contains("index offline"));
    }
}
