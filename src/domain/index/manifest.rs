//! Index manifest: what the persisted vectors were produced with

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

pub const MANIFEST_VERSION: u32 = 1;

/// Metadata stored alongside a persisted index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexManifest {
    pub version: u32,
    /// Embedding model id the vectors were produced with
    pub model: String,
    pub dimension: usize,
    pub count: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl IndexManifest {
    pub fn new(model: impl Into<String>, dimension: usize, count: usize) -> Self {
        let now = Utc::now();
        Self {
            version: MANIFEST_VERSION,
            model: model.into(),
            dimension,
            count,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self, count: usize) {
        self.count = count;
        self.updated_at = Utc::now();
    }

    /// Refuse to serve an index with an embedder other than the one that built it
    pub fn ensure_model(&self, model: &str) -> Result<(), DomainError> {
        if self.model != model {
            return Err(DomainError::configuration(format!(
                "Index was built with embedding model '{}' but '{}' was requested",
                self.model, model
            )));
        }
        Ok(())
    }

    pub fn ensure_dimension(&self, dimension: usize) -> Result<(), DomainError> {
        if self.dimension != dimension {
            return Err(DomainError::configuration(format!(
                "Index dimension is {} but the embedder produced {}",
                self.dimension, dimension
            )));
        }
        Ok(())
    }
}
