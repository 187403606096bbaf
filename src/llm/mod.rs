pub mod chat;

use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_CHAT_MODEL: &str = "mistralai/mistral-7b-instruct";
pub const DEFAULT_MAX_TOKENS: u32 = 500;
pub const DEFAULT_TEMPERATURE: f32 = 0.3;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Missing API Key")]
    MissingCredential,

    #[error("Invalid API Key")]
    AuthRejected,

    #[error("provider returned {status}: {body}")]
    Status {
        status: StatusCode,
        body: String,
    },

    #[error("malformed provider response: {0}")]
    MalformedResponse(String),

    #[error("failed to reach provider: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ProviderError {
    /// Transport failures, rate limiting and upstream 5xx are worth another attempt.
    /// Credential and request problems are not.
    pub fn is_transient(&self) -> bool {
        match self {
            ProviderError::Transport(_) => true,
            ProviderError::Status { status, .. } =>
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionParams {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for CompletionParams {
    fn default() -> Self {
        Self {
            model: DEFAULT_CHAT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout: Duration,
    pub max_retries: u32,
    pub retry_backoff: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            timeout: Duration::from_secs(60),
            max_retries: 1,
            retry_backoff: Duration::from_millis(500),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_transport_and_upstream_failures_are_transient() {
        assert!(
            (ProviderError::Status {
                status: StatusCode::BAD_GATEWAY,
                body: String::new(),
            }).is_transient()
        );
        assert!(
            (ProviderError::Status {
                status: StatusCode::TOO_MANY_REQUESTS,
                body: String::new(),
            }).is_transient()
        );
        assert!(
            !(ProviderError::Status {
                status: StatusCode::BAD_REQUEST,
                body: String::new(),
            }).is_transient()
        );
        assert!(!ProviderError::AuthRejected.is_transient());
        assert!(!ProviderError::MissingCredential.is_transient());
        assert!(!ProviderError::MalformedResponse("x".into()).is_transient());
    }
}
