//! Exhaustive cosine-similarity index persisted as a directory
//!
//! ```text
//! <dir>/manifest.json   model id, dimension, entry count
//! <dir>/vectors.json    one vector per entry
//! <dir>/docstore.json   chunk content + metadata, parallel to vectors
//! ```

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::domain::embedding::cosine_similarity;
use crate::domain::{Document, DomainError, IndexManifest, SearchHit};

pub const MANIFEST_FILE: &str = "manifest.json";
pub const VECTORS_FILE: &str = "vectors.json";
pub const DOCSTORE_FILE: &str = "docstore.json";

#[derive(Debug, Clone)]
pub struct FlatIndex {
    manifest: IndexManifest,
    vectors: Vec<Vec<f32>>,
    documents: Vec<Document>,
}

impl FlatIndex {
    pub fn new(model: impl Into<String>, dimension: usize) -> Self {
        Self {
            manifest: IndexManifest::new(model, dimension, 0),
            vectors: Vec::new(),
            documents: Vec::new(),
        }
    }

    pub fn manifest(&self) -> &IndexManifest {
        &self.manifest
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn insert(&mut self, document: Document, vector: Vec<f32>) -> Result<(), DomainError> {
        if vector.len() != self.manifest.dimension {
            return Err(DomainError::validation(format!(
                "Vector dimension mismatch: expected {}, got {}",
                self.manifest.dimension,
                vector.len()
            )));
        }

        self.vectors.push(vector);
        self.documents.push(document);
        self.manifest.touch(self.documents.len());
        Ok(())
    }

    /// The `k` entries most similar to `query`, most similar first
    ///
    /// Ties keep insertion order.
    pub fn search_vector(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit>, DomainError> {
        self.manifest.ensure_dimension(query.len())?;

        if k == 0 {
            return Ok(Vec::new());
        }

        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(idx, vector)| (idx, cosine_similarity(query, vector)))
            .collect();

        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(idx, score)| SearchHit::new(self.documents[idx].clone(), score))
            .collect())
    }

    pub async fn save(&self, dir: &Path) -> Result<(), DomainError> {
        tokio::fs::create_dir_all(dir).await?;

        write_json(&dir.join(VECTORS_FILE), &self.vectors).await?;
        write_json(&dir.join(DOCSTORE_FILE), &self.documents).await?;
        // Manifest last: a readable manifest means the data files are complete
        write_json(&dir.join(MANIFEST_FILE), &self.manifest).await?;

        debug!(dir = %dir.display(), entries = self.len(), "Saved index");
        Ok(())
    }

    /// Read only the manifest of a persisted index
    pub async fn read_manifest(dir: &Path) -> Result<IndexManifest, DomainError> {
        let manifest_path = dir.join(MANIFEST_FILE);
        if !tokio::fs::try_exists(&manifest_path).await.unwrap_or(false) {
            return Err(DomainError::not_found(format!(
                "No index found at {}",
                dir.display()
            )));
        }

        read_json(&manifest_path).await
    }

    pub async fn open(dir: &Path) -> Result<Self, DomainError> {
        let manifest = Self::read_manifest(dir).await?;
        let vectors: Vec<Vec<f32>> = read_json(&dir.join(VECTORS_FILE)).await?;
        let documents: Vec<Document> = read_json(&dir.join(DOCSTORE_FILE)).await?;

        if vectors.len() != documents.len() || vectors.len() != manifest.count {
            return Err(DomainError::storage(format!(
                "Corrupt index at {}: manifest says {} entries, found {} vectors and {} documents",
                dir.display(),
                manifest.count,
                vectors.len(),
                documents.len()
            )));
        }

        if let Some(bad) = vectors.iter().find(|v| v.len() != manifest.dimension) {
            return Err(DomainError::storage(format!(
                "Corrupt index at {}: vector of dimension {} in a {}-dimensional index",
                dir.display(),
                bad.len(),
                manifest.dimension
            )));
        }

        Ok(Self {
            manifest,
            vectors,
            documents,
        })
    }
}

async fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), DomainError> {
    let bytes = serde_json::to_vec(value)
        .map_err(|e| DomainError::storage(format!("Failed to encode {}: {}", path.display(), e)))?;
    tokio::fs::write(path, bytes).await?;
    Ok(())
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, DomainError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| DomainError::storage(format!("Cannot read {}: {}", path.display(), e)))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| DomainError::storage(format!("Failed to decode {}: {}", path.display(), e)))
}
