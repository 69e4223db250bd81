//! Chat endpoint payloads

use serde::{Deserialize, Serialize};

use crate::domain::MessageRole;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

/// Body of `POST /api/chat` and `POST /api/chat/stream`
#[derive(Debug, Clone, Deserialize)]
pub struct ChatPayload {
    pub messages: Vec<ChatMessage>,
    /// Present when the client wants server-side conversation memory
    #[serde(default)]
    pub session_id: Option<String>,
}

impl ChatPayload {
    /// Content of the most recent user message
    pub fn last_user_content(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::User)
            .map(|m| m.content.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    pub reply: String,
}

/// Form body of `POST /chat`
#[derive(Debug, Clone, Deserialize)]
pub struct ChatForm {
    pub message: String,
}
