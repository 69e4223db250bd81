//! Retrieval seam between the chat chain / evaluator and the index store

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::document::Document;
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// A retrieved chunk together with its similarity to the query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub document: Document,
    pub score: f32,
}

impl SearchHit {
    pub fn new(document: Document, score: f32) -> Self {
        Self { document, score }
    }
}

/// Anything that can return the `k` chunks most similar to a query
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Results are ordered most similar first; at most `k` are returned
    async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<SearchHit>, DomainError>;
}
