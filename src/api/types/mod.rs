//! Request/response types of the HTTP surface

pub mod chat;
pub mod error;
pub mod json;

pub use chat::{ChatForm, ChatMessage, ChatPayload, ChatReply};
pub use error::{ApiError, ApiErrorResponse};
pub use json::Json;
