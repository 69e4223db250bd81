//! Model-bound embedding capability used by the index store and retriever

use std::sync::Arc;

use tracing::debug;

use super::{EmbeddingProvider, EmbeddingRequest};
use crate::domain::DomainError;

const DEFAULT_BATCH_SIZE: usize = 64;

/// An embedding provider bound to one model id
///
/// Callers only see `embed` / `embed_batch`; which backend serves the model is
/// decided when the embedder is created.
#[derive(Debug, Clone)]
pub struct Embedder {
    provider: Arc<dyn EmbeddingProvider>,
    model: String,
    batch_size: usize,
}

impl Embedder {
    pub fn new(provider: Arc<dyn EmbeddingProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.provider_name()
    }

    /// Embed a single text
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>, DomainError> {
        let response = self
            .provider
            .embed(EmbeddingRequest::single(&self.model, text))
            .await?;

        response.into_vectors().into_iter().next().ok_or_else(|| {
            DomainError::provider(self.provider.provider_name(), "Empty embedding response")
        })
    }

    /// Embed many texts, preserving input order
    pub async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, DomainError> {
        let mut vectors = Vec::with_capacity(texts.len());

        for batch in texts.chunks(self.batch_size) {
            debug!(model = %self.model, batch = batch.len(), "Embedding batch");

            let response = self
                .provider
                .embed(EmbeddingRequest::new(&self.model, batch.to_vec()))
                .await?;
            let batch_vectors = response.into_vectors();

            if batch_vectors.len() != batch.len() {
                return Err(DomainError::provider(
                    self.provider.provider_name(),
                    format!(
                        "Expected {} embeddings, got {}",
                        batch.len(),
                        batch_vectors.len()
                    ),
                ));
            }

            vectors.extend(batch_vectors);
        }

        Ok(vectors)
    }
}
