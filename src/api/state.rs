//! Application state shared by the HTTP handlers

use std::sync::Arc;
use std::time::Duration;

use crate::infrastructure::services::ChatbotServiceTrait;

const DEFAULT_STREAM_DELAY: Duration = Duration::from_millis(5);

#[derive(Clone)]
pub struct AppState {
    pub chatbot: Arc<dyn ChatbotServiceTrait>,
    /// Pause between streamed characters
    pub stream_delay: Duration,
}

impl AppState {
    pub fn new(chatbot: Arc<dyn ChatbotServiceTrait>) -> Self {
        Self {
            chatbot,
            stream_delay: DEFAULT_STREAM_DELAY,
        }
    }

    pub fn with_stream_delay(mut self, delay: Duration) -> Self {
        self.stream_delay = delay;
        self
    }
}
