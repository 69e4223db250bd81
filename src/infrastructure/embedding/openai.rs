//! OpenAI-compatible embedding provider implementation

use async_trait::async_trait;
use serde::Deserialize;

use super::HttpClientTrait;
use crate::domain::embedding::{Embedding, EmbeddingProvider, EmbeddingRequest, EmbeddingResponse};
use crate::domain::DomainError;

/// Known embedding models and their dimensions
const EMBEDDING_MODELS: &[(&str, usize)] = &[
    ("Alibaba-NLP/gte-multilingual-base", 768),
    ("sentence-transformers/all-MiniLM-L6-v2", 384),
    ("text-embedding-3-small", 1536),
    ("text-embedding-3-large", 3072),
];

/// Embedding provider for any endpoint speaking the OpenAI `/embeddings` API
#[derive(Debug)]
pub struct OpenAiEmbeddingProvider<C: HttpClientTrait> {
    client: C,
    auth_header: String,
    base_url: String,
}

impl<C: HttpClientTrait> OpenAiEmbeddingProvider<C> {
    /// `base_url` includes the version prefix, e.g. `https://api.openai.com/v1`
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

    fn embeddings_url(&self) -> String {
        format!("{}/embeddings", self.base_url)
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        vec![
            ("Authorization", self.auth_header.as_str()),
            ("Content-Type", "application/json"),
        ]
    }

    fn parse_response(
        &self,
        model: &str,
        json: serde_json::Value,
    ) -> Result<EmbeddingResponse, DomainError> {
        let response: OpenAiEmbeddingResponse = serde_json::from_value(json).map_err(|e| {
            DomainError::provider("openai", format!("Failed to parse embedding response: {}", e))
        })?;

        let embeddings: Vec<Embedding> = response
            .data
            .into_iter()
            .map(|d| Embedding::new(d.index, d.embedding))
            .collect();

        Ok(EmbeddingResponse::new(
            response.model.unwrap_or_else(|| model.to_string()),
            embeddings,
        ))
    }
}

#[async_trait]
impl<C: HttpClientTrait> EmbeddingProvider for OpenAiEmbeddingProvider<C> {
    async fn embed(&self, request: EmbeddingRequest) -> Result<EmbeddingResponse, DomainError> {
        if request.is_empty() {
            return Ok(EmbeddingResponse::new(request.model(), Vec::new()));
        }

        let url = self.embeddings_url();
        let body = serde_json::to_value(&request)
            .map_err(|e| DomainError::internal(format!("Failed to encode request: {}", e)))?;

        let response = self.client.post_json(&url, self.headers(), &body).await?;

        self.parse_response(request.model(), response)
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }

    fn dimensions(&self, model: &str) -> Option<usize> {
        EMBEDDING_MODELS
            .iter()
            .find(|(name, _)| *name == model)
            .map(|(_, dims)| *dims)
    }
}

// OpenAI API types for embeddings

#[derive(Debug, Deserialize)]
struct OpenAiEmbeddingResponse {
    model: Option<String>,
    data: Vec<OpenAiEmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct OpenAiEmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::llm::MockHttpClient;

    const BASE_URL: &str = "http://localhost:8080/v1";
    const TEST_URL: &str = "http://localhost:8080/v1/embeddings";
    const MODEL: &str = "Alibaba-NLP/gte-multilingual-base";

    fn create_mock_response(num_embeddings: usize, dimensions: usize) -> serde_json::Value {
        // Reverse order: the provider must not rely on the upstream ordering
        let data: Vec<serde_json::Value> = (0..num_embeddings)
            .rev()
            .map(|i| {
                let embedding: Vec<f32> = (0..dimensions).map(|j| (i + j) as f32 * 0.001).collect();
                serde_json::json!({"index": i, "embedding": embedding, "object": "embedding"})
            })
            .collect();

        serde_json::json!({"model": MODEL, "data": data})
    }

    #[tokio::test]
    async fn test_embed_batch() {
        let client = MockHttpClient::new().with_response(TEST_URL, create_mock_response(3, 768));
        let provider = OpenAiEmbeddingProvider::with_base_url(client, "test-api-key", BASE_URL);

        let request = EmbeddingRequest::new(MODEL, vec!["役男".into(), "出國".into(), "延期".into()]);
        let vectors = provider.embed(request).await.unwrap().into_vectors();

        assert_eq!(vectors.len(), 3);
        assert_eq!(vectors[0].len(), 768);
        assert_eq!(vectors[1][0], 0.001);

        let (_, body) = provider.client.requests().remove(0);
        assert_eq!(body["model"], MODEL);
        assert_eq!(body["input"][2], "延期");
    }

    #[tokio::test]
    async fn test_empty_request_skips_http() {
        let provider = OpenAiEmbeddingProvider::with_base_url(MockHttpClient::new(), "k", BASE_URL);

        let response = provider.embed(EmbeddingRequest::new(MODEL, vec![])).await.unwrap();

        assert!(response.embeddings().is_empty());
        assert!(provider.client.requests().is_empty());
    }

    #[tokio::test]
    async fn test_embed_error() {
        let client = MockHttpClient::new().with_error(TEST_URL, "Rate limit exceeded");
        let provider = OpenAiEmbeddingProvider::with_base_url(client, "test-api-key", BASE_URL);

        let result = provider.embed(EmbeddingRequest::single(MODEL, "Hello")).await;
        assert!(result.is_err());
    }

    #[test]
    fn test_known_dimensions() {
        let provider = OpenAiEmbeddingProvider::with_base_url(MockHttpClient::new(), "k", BASE_URL);

        assert_eq!(provider.dimensions(MODEL), Some(768));
        assert_eq!(provider.dimensions("sentence-transformers/all-MiniLM-L6-v2"), Some(384));
        assert_eq!(provider.dimensions("unknown-model"), None);
    }
}
