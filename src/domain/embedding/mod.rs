//! Embedding domain models and traits

mod embedder;
mod provider;
mod request;
mod response;

pub use embedder::Embedder;
pub use provider::EmbeddingProvider;
pub use request::EmbeddingRequest;
pub use response::{cosine_similarity, normalize, Embedding, EmbeddingResponse};

#[cfg(test)]
pub use provider::mock::MockEmbeddingProvider;
