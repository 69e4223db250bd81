//! In-process conversation history

use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache as MokaCache;

use crate::domain::{DomainError, HistoryStore, Message};

/// Bounds on how many sessions are kept and for how long
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryCacheConfig {
    /// Sessions beyond this count are evicted
    pub max_sessions: u64,
    /// Sessions not touched for this long are dropped
    pub idle_ttl: Duration,
}

impl Default for HistoryCacheConfig {
    fn default() -> Self {
        Self {
            max_sessions: 10_000,
            idle_ttl: Duration::from_secs(3600),
        }
    }
}

/// Session histories kept in memory; lost on restart
#[derive(Debug)]
pub struct InMemoryHistoryStore {
    sessions: MokaCache<String, Vec<Message>>,
    max_messages: Option<usize>,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self::with_config(HistoryCacheConfig::default())
    }

    pub fn with_config(config: HistoryCacheConfig) -> Self {
        Self {
            sessions: MokaCache::builder()
                .max_capacity(config.max_sessions)
                .time_to_idle(config.idle_ttl)
                .build(),
            max_messages: None,
        }
    }

    /// Keep only the most recent `max_messages` per session
    pub fn with_max_messages(mut self, max_messages: usize) -> Self {
        self.max_messages = Some(max_messages);
        self
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.run_pending_tasks().await;
        self.sessions.entry_count() as usize
    }
}

impl Default for InMemoryHistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn keep_recent(history: &mut Vec<Message>, max_messages: Option<usize>) {
    if let Some(max) = max_messages {
        if history.len() > max {
            let excess = history.len() - max;
            history.drain(..excess);
        }
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistoryStore {
    async fn history(&self, session_id: &str) -> Result<Vec<Message>, DomainError> {
        Ok(self.sessions.get(session_id).await.unwrap_or_default())
    }

    async fn append(&self, session_id: &str, messages: Vec<Message>) -> Result<(), DomainError> {
        let max_messages = self.max_messages;

        self.sessions
            .entry(session_id.to_string())
            .and_upsert_with(|existing| {
                let mut history = existing.map(|entry| entry.into_value()).unwrap_or_default();
                history.extend(messages);
                keep_recent(&mut history, max_messages);
                std::future::ready(history)
            })
            .await;

        Ok(())
    }

    async fn clear(&self, session_id: &str) -> Result<(), DomainError> {
        self.sessions.invalidate(session_id).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_session_is_empty() {
        let store = InMemoryHistoryStore::new();
        assert!(store.history("nobody").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let store = InMemoryHistoryStore::new();
        store.append("a", vec![Message::user("hi")]).await.unwrap();
        store.append("b", vec![Message::user("yo")]).await.unwrap();
        store.append("a", vec![Message::assistant("hello")]).await.unwrap();

        let a = store.history("a").await.unwrap();
        assert_eq!(a.len(), 2);
        assert_eq!(a[1].content(), "hello");
        assert_eq!(store.history("b").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_max_messages_drops_oldest() {
        let store = InMemoryHistoryStore::new().with_max_messages(2);
        store
            .append(
                "s",
                vec![Message::user("1"), Message::assistant("2"), Message::user("3")],
            )
            .await
            .unwrap();

        let history = store.history("s").await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].content(), "2");
    }

    #[tokio::test]
    async fn test_clear() {
        let store = InMemoryHistoryStore::new();
        store.append("s", vec![Message::user("1")]).await.unwrap();
        store.clear("s").await.unwrap();

        assert!(store.history("s").await.unwrap().is_empty());
        assert_eq!(store.session_count().await, 0);
    }

    #[tokio::test]
    async fn test_session_count_is_bounded() {
        let store = InMemoryHistoryStore::with_config(HistoryCacheConfig {
            max_sessions: 10,
            idle_ttl: Duration::from_secs(3600),
        })
        .with_max_messages(20);

        for i in 0..200 {
            store
                .append(&format!("session-{}", i), vec![Message::user("hi")])
                .await
                .unwrap();
        }

        assert!(store.session_count().await <= 10);
    }

    #[tokio::test]
    async fn test_idle_sessions_expire() {
        let store = InMemoryHistoryStore::with_config(HistoryCacheConfig {
            max_sessions: 100,
            idle_ttl: Duration::from_millis(50),
        });
        store.append("s", vec![Message::user("1")]).await.unwrap();

        tokio::time::sleep(Duration::from_millis(200)).await;

        assert!(store.history("s").await.unwrap().is_empty());
        assert_eq!(store.session_count().await, 0);
    }
}
