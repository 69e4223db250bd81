use async_trait::async_trait;
use std::fmt::Debug;

use super::{LlmRequest, LlmResponse};
use crate::domain::DomainError;

/// Trait for chat-completion backends
#[async_trait]
pub trait LlmProvider: Send + Sync + Debug {
    /// Send a chat completion request
    async fn chat(&self, model: &str, request: LlmRequest) -> Result<LlmResponse, DomainError>;

    /// Get the provider name
    fn provider_name(&self) -> &'static str;
}

#[cfg(test)]
pub mod mock {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;
    use crate::domain::llm::Message;

    /// Scripted provider: replays queued replies in order, then falls back to
    /// the default reply. Every request is recorded for inspection.
    #[derive(Debug)]
    pub struct MockLlmProvider {
        name: &'static str,
        reply: Option<String>,
        queued: Mutex<VecDeque<Result<String, String>>>,
        error: Option<String>,
        requests: Mutex<Vec<(String, LlmRequest)>>,
    }

    impl MockLlmProvider {
        pub fn new(name: &'static str) -> Self {
            Self {
                name,
                reply: None,
                queued: Mutex::new(VecDeque::new()),
                error: None,
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn with_reply(mut self, reply: impl Into<String>) -> Self {
            self.reply = Some(reply.into());
            self
        }

        pub fn with_replies<I, S>(self, replies: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            self.queued
                .lock()
                .unwrap()
                .extend(replies.into_iter().map(|r| Ok(r.into())));
            self
        }

        pub fn with_queued_error(self, error: impl Into<String>) -> Self {
            self.queued.lock().unwrap().push_back(Err(error.into()));
            self
        }

        pub fn with_error(mut self, error: impl Into<String>) -> Self {
            self.error = Some(error.into());
            self
        }

        pub fn requests(&self) -> Vec<(String, LlmRequest)> {
            self.requests.lock().unwrap().clone()
        }

        pub fn call_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl LlmProvider for MockLlmProvider {
        async fn chat(&self, model: &str, request: LlmRequest) -> Result<LlmResponse, DomainError> {
            self.requests
                .lock()
                .unwrap()
                .push((model.to_string(), request));

            if let Some(ref error) = self.error {
                return Err(DomainError::provider(self.name, error));
            }

            let next = self.queued.lock().unwrap().pop_front();
            let content = match next {
                Some(Ok(reply)) => reply,
                Some(Err(error)) => return Err(DomainError::provider(self.name, error)),
                None => self
                    .reply
                    .clone()
                    .ok_or_else(|| DomainError::provider(self.name, "No mock response configured"))?,
            };

            Ok(LlmResponse::new("mock-id", model, Message::assistant(content)))
        }

        fn provider_name(&self) -> &'static str {
            self.name
        }
    }
}
