use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::http_client::HttpClientTrait;
use crate::domain::llm::{FinishReason, Usage};
use crate::domain::{DomainError, LlmProvider, LlmRequest, LlmResponse, Message, MessageRole};

/// OpenRouter exposes the OpenAI chat-completions API under this prefix
pub const DEFAULT_OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

const APP_TITLE: &str = "qa-rag-chatbot";

/// Provider for any OpenAI-compatible chat-completions endpoint
///
/// `base_url` includes the version prefix, e.g. `https://openrouter.ai/api/v1`
/// or `https://api.openai.com/v1`.
#[derive(Debug)]
pub struct OpenAiProvider<C: HttpClientTrait> {
    client: C,
    auth_header: String,
    base_url: String,
}

impl<C: HttpClientTrait> OpenAiProvider<C> {
    pub fn new(client: C, api_key: impl Into<String>) -> Self {
        Self::with_base_url(client, api_key, DEFAULT_OPENROUTER_BASE_URL)
    }

    pub fn with_base_url(
        client: C,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        let auth_header = format!("Bearer {}", api_key.into());
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Self {
            client,
            auth_header,
            base_url,
        }
    }

    fn chat_completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn build_request(&self, model: &str, request: &LlmRequest) -> serde_json::Value {
        let messages: Vec<OpenAiMessage> =
            request.messages.iter().map(OpenAiMessage::from_domain).collect();

        let mut body = serde_json::json!({
            "model": model,
            "messages": messages,
            "stream": false,
        });

        if let Some(temp) = request.temperature {
            body["temperature"] = serde_json::json!(temp);
        }

        if let Some(max_tokens) = request.max_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }

        body
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        vec![
            ("Authorization", self.auth_header.as_str()),
            ("Content-Type", "application/json"),
            ("X-Title", APP_TITLE),
        ]
    }

    fn parse_response(&self, json: serde_json::Value) -> Result<LlmResponse, DomainError> {
        // Upstream failures are sometimes reported with a 200 status
        if let Some(error) = json.get("error") {
            let message = error
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("unknown upstream error");
            return Err(DomainError::provider("openai", message));
        }

        let response: OpenAiResponse = serde_json::from_value(json).map_err(|e| {
            DomainError::provider("openai", format!("Failed to parse response: {}", e))
        })?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::provider("openai", "No choices in response"))?;

        let message = Message::assistant(choice.message.content.unwrap_or_default());

        let mut llm_response = LlmResponse::new(response.id, response.model, message);

        if let Some(reason) = choice.finish_reason {
            llm_response = llm_response.with_finish_reason(parse_finish_reason(&reason));
        }

        if let Some(usage) = response.usage {
            llm_response =
                llm_response.with_usage(Usage::new(usage.prompt_tokens, usage.completion_tokens));
        }

        Ok(llm_response)
    }
}

#[async_trait]
impl<C: HttpClientTrait> LlmProvider for OpenAiProvider<C> {
    async fn chat(&self, model: &str, request: LlmRequest) -> Result<LlmResponse, DomainError> {
        let url = self.chat_completions_url();
        let body = self.build_request(model, &request);

        debug!(model, messages = request.messages.len(), "Sending chat completion");

        let response = self.client.post_json(&url, self.headers(), &body).await?;

        self.parse_response(response)
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }
}

fn parse_finish_reason(reason: &str) -> FinishReason {
    match reason {
        "length" => FinishReason::Length,
        "content_filter" => FinishReason::ContentFilter,
        "error" => FinishReason::Error,
        _ => FinishReason::Stop,
    }
}

// OpenAI API types

#[derive(Debug, Serialize)]
struct OpenAiMessage<'a> {
    role: &'static str,
    content: &'a str,
}

impl<'a> OpenAiMessage<'a> {
    fn from_domain(message: &'a Message) -> Self {
        let role = match message.role {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        };

        Self {
            role,
            content: message.content(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    #[serde(default)]
    id: String,
    #[serde(default)]
    model: String,
    choices: Vec<OpenAiChoice>,
    usage: Option<OpenAiUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::llm::http_client::mock::MockHttpClient;

    const TEST_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

    fn completion(content: &str) -> serde_json::Value {
        serde_json::json!({
            "id": "gen-123",
            "model": "moonshotai/kimi-k2:free",
            "choices": [{
                "message": {"role": "assistant", "content": content},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 10, "completion_tokens": 8, "total_tokens": 18}
        })
    }

    #[tokio::test]
    async fn test_chat() {
        let client = MockHttpClient::new().with_response(TEST_URL, completion("可以出國。"));
        let provider = OpenAiProvider::new(client, "test-api-key");

        let request = LlmRequest::builder().user("役男可以出國嗎？").build();
        let response = provider.chat("moonshotai/kimi-k2:free", request).await.unwrap();

        assert_eq!(response.id, "gen-123");
        assert_eq!(response.content(), "可以出國。");
        assert_eq!(response.finish_reason, Some(FinishReason::Stop));
        assert_eq!(response.usage.unwrap().total_tokens, 18);
    }

    #[tokio::test]
    async fn test_request_body() {
        let client = MockHttpClient::new().with_response(TEST_URL, completion("ok"));
        let provider = OpenAiProvider::new(client, "k");

        let request = LlmRequest::builder()
            .system("sys")
            .user("hi")
            .temperature(0.1)
            .build();
        provider.chat("m", request).await.unwrap();

        let (url, body) = provider.client.requests().remove(0);
        assert_eq!(url, TEST_URL);
        assert_eq!(body["model"], "m");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "hi");
        assert!((body["temperature"].as_f64().unwrap() - 0.1).abs() < 1e-6);
        assert!(body.get("max_tokens").is_none());
    }

    #[tokio::test]
    async fn test_error_in_success_body() {
        let client = MockHttpClient::new().with_response(
            TEST_URL,
            serde_json::json!({"error": {"message": "Rate limit exceeded", "code": 429}}),
        );
        let provider = OpenAiProvider::new(client, "k");

        let err = provider
            .chat("m", LlmRequest::builder().user("x").build())
            .await
            .unwrap_err();

        assert!(err.to_string().contains("Rate limit exceeded"));
    }

    #[tokio::test]
    async fn test_transport_error() {
        let client = MockHttpClient::new().with_error(TEST_URL, "API key invalid");
        let provider = OpenAiProvider::new(client, "invalid-key");

        let result = provider.chat("m", LlmRequest::builder().user("x").build()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_custom_base_url_and_null_content() {
        let url = "http://localhost:8080/v1/chat/completions";
        let client = MockHttpClient::new().with_response(
            url,
            serde_json::json!({
                "id": "x",
                "model": "deepseek/deepseek-r1:free",
                "choices": [{"message": {"role": "assistant", "content": null}, "finish_reason": "length"}]
            }),
        );
        let provider = OpenAiProvider::with_base_url(client, "k", "http://localhost:8080/v1/");

        let response = provider
            .chat("deepseek/deepseek-r1:free", LlmRequest::builder().user("x").build())
            .await
            .unwrap();

        assert_eq!(response.content(), "");
        assert_eq!(response.finish_reason, Some(FinishReason::Length));
    }
}
