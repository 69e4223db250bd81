//! Index store operations: build, append, load and search

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{info, instrument};

use super::FlatIndex;
use crate::domain::document::{make_chunk_id, META_CHUNK_ID, META_UUID};
use crate::domain::{Document, DomainError, Embedder, Retriever, SearchHit};

/// Embed `chunks` and persist a fresh index at `path`, replacing any previous one
#[instrument(skip(chunks, embedder), fields(model = %embedder.model(), chunks = chunks.len()))]
pub async fn build(
    chunks: &[Document],
    embedder: &Embedder,
    path: &Path,
) -> Result<FlatIndex, DomainError> {
    if chunks.is_empty() {
        return Err(DomainError::empty_input("No chunks to index"));
    }

    let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
    let vectors = embedder.embed_batch(&texts).await?;

    let dimension = vectors.first().map(Vec::len).unwrap_or(0);
    if dimension == 0 {
        return Err(DomainError::provider(
            embedder.provider_name(),
            "Embedder returned empty vectors",
        ));
    }

    let mut index = FlatIndex::new(embedder.model(), dimension);
    for (chunk, vector) in chunks.iter().cloned().zip(vectors) {
        index.insert(chunk, vector)?;
    }

    index.save(path).await?;
    info!(path = %path.display(), entries = index.len(), dimension, "Built index");
    Ok(index)
}

/// Embed raw texts and add them to an existing index in place
///
/// Each text becomes a chunk with a fresh `uuid` and a `chunk_id` positioned
/// after the existing entries. Returns the new entry count.
#[instrument(skip(texts, embedder), fields(model = %embedder.model(), texts = texts.len()))]
pub async fn append(path: &Path, texts: &[String], embedder: &Embedder) -> Result<usize, DomainError> {
    if texts.is_empty() {
        return Err(DomainError::empty_input("No texts to append"));
    }

    let mut index = FlatIndex::open(path).await?;
    index.manifest().ensure_model(embedder.model())?;

    let vectors = embedder.embed_batch(texts).await?;
    let offset = index.len();

    for (i, (text, vector)) in texts.iter().zip(vectors).enumerate() {
        let uuid = uuid::Uuid::new_v4().to_string();
        let chunk_id = make_chunk_id(&uuid, offset + i);
        let document = Document::new(text.as_str())
            .with_metadata(META_UUID, uuid)
            .with_metadata(META_CHUNK_ID, chunk_id);

        index.insert(document, vector)?;
    }

    index.save(path).await?;
    info!(path = %path.display(), entries = index.len(), "Appended to index");
    Ok(index.len())
}

/// Open a persisted index for querying with `embedder`
///
/// Fails when the index was built with a different embedding model.
pub async fn load(path: &Path, embedder: Embedder) -> Result<IndexHandle, DomainError> {
    let index = FlatIndex::open(path).await?;
    index.manifest().ensure_model(embedder.model())?;

    Ok(IndexHandle {
        path: path.to_path_buf(),
        index,
        embedder,
    })
}

/// A loaded index bound to the embedder that queries it
#[derive(Debug, Clone)]
pub struct IndexHandle {
    path: PathBuf,
    index: FlatIndex,
    embedder: Embedder,
}

impl IndexHandle {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn index(&self) -> &FlatIndex {
        &self.index
    }

    /// Up to `k` chunks, most similar first
    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<SearchHit>, DomainError> {
        let vector = self.embedder.embed(query).await?;
        self.index.search_vector(&vector, k)
    }
}

#[async_trait]
impl Retriever for IndexHandle {
    async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<SearchHit>, DomainError> {
        self.search(query, k).await
    }
}
