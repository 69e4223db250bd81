//! Document ingestion domain types and traits

pub mod chunker;

pub use chunker::{split_documents, ChunkingConfig, ChunkingStrategy};

#[cfg(test)]
pub use chunker::mock::MockChunkingStrategy;
