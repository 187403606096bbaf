pub mod openrouter;

use async_trait::async_trait;
use log::warn;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use super::{ CompletionParams, LlmConfig, ProviderError };
use crate::models::chat::ChatMessage;
use self::openrouter::OpenRouterChatClient;

#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Sends the full message list and returns the first choice's reply text.
    async fn complete(
        &self,
        messages: &[ChatMessage],
        params: &CompletionParams
    ) -> Result<String, ProviderError>;

    fn get_base_url(&self) -> String;
}

pub fn new_client(config: &LlmConfig) -> Result<Arc<dyn ChatClient>, ProviderError> {
    let api_key = config.api_key
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .ok_or(ProviderError::MissingCredential)?;

    let client = OpenRouterChatClient::new(
        api_key.to_string(),
        config.base_url.clone(),
        config.timeout,
        config.max_retries,
        config.retry_backoff,
    )?;
    Ok(Arc::new(client))
}

pub async fn with_retry<F, Fut>(
    max_retries: u32,
    backoff: Duration,
    mut attempt_fn: F
) -> Result<String, ProviderError>
where
    F: FnMut() -> Fut + Send,
    Fut: Future<Output = Result<String, ProviderError>> + Send,
{
    let mut attempt = 0;
    loop {
        match attempt_fn().await {
            Ok(reply) => {
                return Ok(reply);
            }
            Err(e) if e.is_transient() && attempt < max_retries => {
                attempt += 1;
                warn!("Provider call failed ({}), retrying ({}/{})", e, attempt, max_retries);
                tokio::time::sleep(backoff).await;
            }
            Err(e) => {
                return Err(e);
            }
        }
    }
}
