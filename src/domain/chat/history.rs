//! Conversation history storage seam

use async_trait::async_trait;

use crate::domain::llm::Message;
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Keyed conversation history; unknown sessions start empty
#[cfg_attr(test, automock)]
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Messages recorded for the session, oldest first
    async fn history(&self, session_id: &str) -> Result<Vec<Message>, DomainError>;

    /// Append messages to the session, creating it if needed
    async fn append(&self, session_id: &str, messages: Vec<Message>) -> Result<(), DomainError>;

    /// Forget a session
    async fn clear(&self, session_id: &str) -> Result<(), DomainError>;
}
