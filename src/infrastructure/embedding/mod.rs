//! Embedding provider implementations

mod factory;
mod hashing;
mod openai;

pub use factory::EmbedderFactory;
pub use hashing::{HashingEmbeddingProvider, HASH_MODEL_PREFIX};
pub use openai::OpenAiEmbeddingProvider;

// Re-export HTTP client for use by embedding providers
pub use super::llm::{HttpClient, HttpClientTrait};
