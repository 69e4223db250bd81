//! Domain layer - Core entities, traits and pure logic

pub mod chat;
pub mod document;
pub mod embedding;
pub mod error;
pub mod evaluation;
pub mod index;
pub mod ingestion;
pub mod llm;

pub use chat::{AnswerChain, ChatbotParams, HistoryStore, ParamsUpdate, Preset, PromptStyle};
pub use document::Document;
pub use embedding::{Embedder, EmbeddingProvider, EmbeddingRequest, EmbeddingResponse};
pub use error::DomainError;
pub use index::{IndexManifest, Retriever, SearchHit};
pub use ingestion::{ChunkingConfig, ChunkingStrategy};
pub use llm::{LlmProvider, LlmRequest, LlmResponse, Message, MessageRole};
