//! Resolves an embedding model id to a backend

use std::sync::Arc;
use std::time::Duration;

use super::{HashingEmbeddingProvider, HttpClient, OpenAiEmbeddingProvider, HASH_MODEL_PREFIX};
use crate::config::{EmbeddingSettings, LlmSettings};
use crate::domain::{DomainError, Embedder};

#[derive(Debug, Clone)]
pub struct EmbedderFactory {
    settings: EmbeddingSettings,
    api_key: Option<String>,
    timeout: Duration,
}

impl EmbedderFactory {
    pub fn new(settings: &EmbeddingSettings, llm: &LlmSettings) -> Self {
        Self {
            settings: settings.clone(),
            api_key: settings.resolved_api_key(llm),
            timeout: Duration::from_secs(llm.timeout_secs),
        }
    }

    /// Build an [`Embedder`] for `model`
    ///
    /// `hash:*` ids are served locally; anything else goes to the hosted
    /// endpoint and needs an API key.
    pub fn for_model(&self, model: &str) -> Result<Embedder, DomainError> {
        if model.starts_with(HASH_MODEL_PREFIX) {
            let provider = HashingEmbeddingProvider::from_model_id(model)?;
            return Ok(Embedder::new(Arc::new(provider), model));
        }

        let api_key = self.api_key.clone().ok_or_else(|| {
            DomainError::configuration(format!(
                "Embedding model '{}' needs an API key: set embedding.api_key or OPENROUTER_API_KEY",
                model
            ))
        })?;

        let client = HttpClient::with_timeout(self.timeout)?;
        let provider = OpenAiEmbeddingProvider::with_base_url(client, api_key, &self.settings.base_url);

        Ok(Embedder::new(Arc::new(provider), model).with_batch_size(self.settings.batch_size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn factory(api_key: Option<&str>) -> EmbedderFactory {
        let settings = EmbeddingSettings {
            api_key: api_key.map(String::from),
            ..Default::default()
        };
        let llm = LlmSettings {
            api_key: api_key.map(String::from),
            ..Default::default()
        };
        EmbedderFactory::new(&settings, &llm)
    }

    #[test]
    fn test_hash_model_is_local() {
        let embedder = factory(None).for_model("hash:32").unwrap();

        assert_eq!(embedder.provider_name(), "hashing");
        assert_eq!(embedder.model(), "hash:32");
    }

    #[test]
    fn test_hosted_model_uses_openai_backend() {
        let embedder = factory(Some("sk-test"))
            .for_model("Alibaba-NLP/gte-multilingual-base")
            .unwrap();

        assert_eq!(embedder.provider_name(), "openai");
    }
}
