//! Question -> answer seam used by the evaluator and the chatbot service

use async_trait::async_trait;

use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// A callable that answers one question
#[cfg_attr(test, automock)]
#[async_trait]
pub trait AnswerChain: Send + Sync {
    async fn invoke(&self, question: &str) -> Result<String, DomainError>;
}
