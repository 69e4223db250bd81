use std::sync::Arc;
use std::time::Duration;

use super::http_client::HttpClient;
use super::OpenAiProvider;
use crate::config::LlmSettings;
use crate::domain::{DomainError, LlmProvider};

/// Factory for creating chat-completion providers
#[derive(Debug)]
pub struct LlmProviderFactory;

impl LlmProviderFactory {
    /// Create the provider described by the `llm` config section
    pub fn create(settings: &LlmSettings) -> Result<Arc<dyn LlmProvider>, DomainError> {
        let api_key = settings.resolved_api_key().ok_or_else(|| {
            DomainError::configuration(
                "No LLM API key: set llm.api_key, APP__LLM__API_KEY or OPENROUTER_API_KEY",
            )
        })?;

        let http_client = HttpClient::with_timeout(Duration::from_secs(settings.timeout_secs))?;

        Ok(Self::create_with_base_url(
            http_client,
            api_key,
            &settings.base_url,
        ))
    }

    /// Create an OpenAI-compatible provider against a custom base URL
    pub fn create_with_base_url(
        http_client: HttpClient,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Arc<dyn LlmProvider> {
        Arc::new(OpenAiProvider::with_base_url(http_client, api_key, base_url))
    }
}
