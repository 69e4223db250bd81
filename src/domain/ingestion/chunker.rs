//! Chunking strategy trait and chunk-id assignment

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::domain::document::{make_chunk_id, Document, META_CHUNK_ID};
use crate::domain::DomainError;

/// Configuration for chunking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Maximum chunk size in characters
    pub chunk_size: usize,
    /// Characters carried over from the previous chunk
    pub chunk_overlap: usize,
}

impl ChunkingConfig {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size,
            chunk_overlap,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.chunk_size == 0 {
            return Err(DomainError::validation("chunk_size must be greater than 0"));
        }

        if self.chunk_overlap >= self.chunk_size {
            return Err(DomainError::validation(format!(
                "chunk_overlap ({}) must be less than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }

        Ok(())
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 512,
            chunk_overlap: 200,
        }
    }
}

/// Trait for chunking strategies
pub trait ChunkingStrategy: Send + Sync + Debug {
    /// Split content into text windows of at most `chunk_size` characters
    fn split(&self, content: &str, config: &ChunkingConfig) -> Result<Vec<String>, DomainError>;

    /// Get the strategy name
    fn name(&self) -> &'static str;
}

/// Split documents into chunks and assign each chunk its `chunk_id`
///
/// Every chunk inherits its parent's metadata. The id suffix is the chunk's
/// position in the whole output of this call, so ids are unique per call.
pub fn split_documents(
    documents: &[Document],
    strategy: &dyn ChunkingStrategy,
    config: &ChunkingConfig,
) -> Result<Vec<Document>, DomainError> {
    if documents.is_empty() {
        return Err(DomainError::empty_input(
            "No documents provided; cannot split empty list",
        ));
    }

    config.validate()?;

    let mut chunks = Vec::new();

    for document in documents {
        for piece in strategy.split(&document.content, config)? {
            chunks.push(Document {
                content: piece,
                metadata: document.metadata.clone(),
            });
        }
    }

    for (index, chunk) in chunks.iter_mut().enumerate() {
        let uuid = chunk.uuid().ok_or_else(|| {
            DomainError::schema(
                "Each original document must have a 'uuid' in metadata before splitting",
            )
        })?;

        let chunk_id = make_chunk_id(uuid, index);
        chunk.metadata.insert(META_CHUNK_ID.to_string(), chunk_id);
    }

    Ok(chunks)
}

#[cfg(test)]
pub mod mock {
    use super::*;

    /// Splits on a fixed marker, ignoring the configured size
    #[derive(Debug, Default)]
    pub struct MockChunkingStrategy;

    impl ChunkingStrategy for MockChunkingStrategy {
        fn split(&self, content: &str, _config: &ChunkingConfig) -> Result<Vec<String>, DomainError> {
            Ok(content
                .split('|')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(String::from)
                .collect())
        }

        fn name(&self) -> &'static str {
            "mock"
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::mock::MockChunkingStrategy;
    use super::*;
    use crate::domain::document::{parent_uuid, META_UUID};

    fn doc(uuid: &str, content: &str) -> Document {
        Document::new(content).with_metadata(META_UUID, uuid)
    }

    #[test]
    fn test_config_default() {
        let config = ChunkingConfig::default();
        assert_eq!(config.chunk_size, 512);
        assert_eq!(config.chunk_overlap, 200);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        assert!(ChunkingConfig::new(0, 0).validate().is_err());
        assert!(ChunkingConfig::new(100, 100).validate().is_err());
        assert!(ChunkingConfig::new(100, 99).validate().is_ok());
    }

    #[test]
    fn test_split_empty_input_fails() {
        let result = split_documents(&[], &MockChunkingStrategy, &ChunkingConfig::default());
        assert!(matches!(result, Err(DomainError::EmptyInput { .. })));
    }

    #[test]
    fn test_chunk_ids_are_unique_and_parse_back() {
        let docs = vec![doc("aaa", "one | two | three"), doc("b_b", "four | five")];

        let chunks =
            split_documents(&docs, &MockChunkingStrategy, &ChunkingConfig::default()).unwrap();

        assert_eq!(chunks.len(), 5);

        let ids: HashSet<&str> = chunks.iter().filter_map(|c| c.chunk_id()).collect();
        assert_eq!(ids.len(), 5);

        for chunk in &chunks {
            let id = chunk.chunk_id().unwrap();
            assert_eq!(parent_uuid(id), chunk.uuid());
        }

        assert_eq!(chunks[3].chunk_id(), Some("b_b_3"));
    }

    #[test]
    fn test_chunks_inherit_metadata() {
        let docs = vec![doc("u1", "a | b").with_metadata("class", "military")];

        let chunks =
            split_documents(&docs, &MockChunkingStrategy, &ChunkingConfig::default()).unwrap();

        assert!(chunks.iter().all(|c| c.get("class") == Some("military")));
    }

    #[test]
    fn test_missing_uuid_fails() {
        let docs = vec![Document::new("a | b")];

        let result = split_documents(&docs, &MockChunkingStrategy, &ChunkingConfig::default());
        assert!(matches!(result, Err(DomainError::Schema { .. })));
    }
}
