use async_trait::async_trait;
use log::{ debug, error };
use reqwest::{ Client as HttpClient, StatusCode, header::{ HeaderMap, HeaderValue, CONTENT_TYPE } };
use serde::{ Deserialize, Serialize };
use std::time::Duration;

use super::{ with_retry, ChatClient };
use crate::llm::{ CompletionParams, ProviderError, DEFAULT_BASE_URL };
use crate::models::chat::{ ChatMessage, Role };

pub struct OpenRouterChatClient {
    http: HttpClient,
    api_key: String,
    base_url: String,
    max_retries: u32,
    retry_backoff: Duration,
}

#[derive(Serialize)]
struct OpenRouterMessage<'a> {
    role: Role,
    content: &'a str,
}

#[derive(Serialize)]
struct OpenRouterChatRequest<'a> {
    model: &'a str,
    messages: Vec<OpenRouterMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct OpenRouterResponse {
    choices: Option<Vec<OpenRouterChoice>>,
}

#[derive(Deserialize)]
struct OpenRouterChoice {
    message: Option<OpenRouterReply>,
}

#[derive(Deserialize)]
struct OpenRouterReply {
    content: Option<String>,
}

impl OpenRouterChatClient {
    pub fn new(
        api_key: String,
        base_url: Option<String>,
        timeout: Duration,
        max_retries: u32,
        retry_backoff: Duration,
    ) -> Result<Self, ProviderError> {
        let api_url = base_url
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = HttpClient::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            api_key,
            base_url: api_url,
            max_retries,
            retry_backoff,
        })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    async fn send_once(&self, req: &OpenRouterChatRequest<'_>) -> Result<String, ProviderError> {
        let resp = self.http
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(req)
            .send()
            .await?;

        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED {
            error!("Provider rejected the configured API key");
            return Err(ProviderError::AuthRejected);
        }

        let body = resp.text().await?;
        if !status.is_success() {
            error!("Provider returned {}: {}", status, body);
            return Err(ProviderError::Status { status, body });
        }

        extract_reply(&body)
    }
}

/// Pulls `choices[0].message.content` out of a chat-completions body.
pub fn extract_reply(body: &str) -> Result<String, ProviderError> {
    let parsed: OpenRouterResponse = serde_json
        ::from_str(body)
        .map_err(|e| ProviderError::MalformedResponse(format!("invalid JSON: {}", e)))?;

    parsed.choices
        .and_then(|choices| choices.into_iter().next())
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .ok_or_else(|| ProviderError::MalformedResponse("missing choices[0].message.content".into()))
}

#[async_trait]
impl ChatClient for OpenRouterChatClient {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        params: &CompletionParams
    ) -> Result<String, ProviderError> {
        let req = OpenRouterChatRequest {
            model: &params.model,
            messages: messages
                .iter()
                .map(|m| OpenRouterMessage { role: m.role, content: &m.content })
                .collect(),
            max_tokens: params.max_tokens,
            temperature: params.temperature,
        };
        debug!(
            "Sending {} messages to {} (model={})",
            req.messages.len(),
            self.completions_url(),
            params.model
        );

        let req = &req;
        with_retry(self.max_retries, self.retry_backoff, move || self.send_once(req)).await
    }

    fn get_base_url(&self) -> String {
        self.base_url.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;
    use std::sync::Arc;
    use std::sync::atomic::{ AtomicUsize, Ordering };

    fn client_for(server: &mockito::ServerGuard, max_retries: u32) -> OpenRouterChatClient {
        OpenRouterChatClient::new(
            "test-key".to_string(),
            Some(server.url()),
            Duration::from_secs(5),
            max_retries,
            Duration::from_millis(1),
        ).unwrap()
    }

    fn history() -> Vec<ChatMessage> {
        vec![ChatMessage::system("be helpful"), ChatMessage::user("What is a monad?")]
    }

    #[test]
    fn default_base_url_is_openrouter() {
        let client = OpenRouterChatClient::new(
            "k".into(),
            None,
            Duration::from_secs(1),
            0,
            Duration::ZERO,
        ).unwrap();
        assert_eq!(client.get_base_url(), DEFAULT_BASE_URL);
        assert_eq!(client.completions_url(), "https://openrouter.ai/api/v1/chat/completions");
    }

    #[test]
    fn reply_is_first_choice_content() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"first"}},{"message":{"content":"second"}}]}"#;
        assert_eq!(extract_reply(body).unwrap(), "first");
    }

    #[test]
    fn reply_missing_fields_is_malformed() {
        for body in [r#"{}"#, r#"{"choices":[]}"#, r#"{"choices":[{}]}"#, r#"{"error":{"message":"x"}}"#, "not json"] {
            assert!(
                matches!(extract_reply(body), Err(ProviderError::MalformedResponse(_))),
                "body {} should be malformed",
                body
            );
        }
    }

    #[tokio::test]
    async fn sends_payload_and_returns_reply() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer test-key")
            .match_body(
                Matcher::PartialJson(
                    json!({
                    "model": "mistralai/mistral-7b-instruct",
                    "max_tokens": 500,
                    "messages": [
                        {"role": "system", "content": "be helpful"},
                        {"role": "user", "content": "What is a monad?"}
                    ]
                })
                )
            )
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[{"message":{"role":"assistant","content":"A monoid in the category of endofunctors."}}]}"#)
            .expect(1)
            .create_async().await;

        let reply = client_for(&server, 1)
            .complete(&history(), &CompletionParams::default()).await
            .unwrap();

        assert_eq!(reply, "A monoid in the category of endofunctors.");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn unauthorized_maps_to_auth_rejected_without_retry() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .with_status(401)
            .with_body(r#"{"error":{"message":"No auth credentials found"}}"#)
            .expect(1)
            .create_async().await;

        let err = client_for(&server, 3)
            .complete(&history(), &CompletionParams::default()).await
            .unwrap_err();

        assert!(matches!(err, ProviderError::AuthRejected));
        assert_eq!(err.to_string(), "Invalid API Key");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn server_error_is_retried_once_then_surfaced() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .with_status(503)
            .with_body("upstream unavailable")
            .expect(2)
            .create_async().await;

        let err = client_for(&server, 1)
            .complete(&history(), &CompletionParams::default()).await
            .unwrap_err();

        match err {
            ProviderError::Status { status, body } => {
                assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
                assert_eq!(body, "upstream unavailable");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn bad_request_is_not_retried() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .with_status(400)
            .with_body("bad model")
            .expect(1)
            .create_async().await;

        let err = client_for(&server, 2)
            .complete(&history(), &CompletionParams::default()).await
            .unwrap_err();

        assert!(matches!(err, ProviderError::Status { .. }));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn stalled_provider_times_out_and_is_retried() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let accepted = Arc::new(AtomicUsize::new(0));
        let counter = accepted.clone();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                counter.fetch_add(1, Ordering::SeqCst);
                held.push(socket);
            }
        });

        let client = OpenRouterChatClient::new(
            "test-key".to_string(),
            Some(format!("http://{}", addr)),
            Duration::from_millis(50),
            1,
            Duration::from_millis(1),
        ).unwrap();
        let err = client.complete(&history(), &CompletionParams::default()).await.unwrap_err();

        match err {
            ProviderError::Transport(e) => assert!(e.is_timeout(), "expected a timeout, got {}", e),
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(accepted.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn success_without_reply_field_is_malformed() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(r#"{"id":"gen-1","choices":[]}"#)
            .expect(1)
            .create_async().await;

        let err = client_for(&server, 1)
            .complete(&history(), &CompletionParams::default()).await
            .unwrap_err();

        assert!(matches!(err, ProviderError::MalformedResponse(_)));
        mock.assert_async().await;
    }
}
