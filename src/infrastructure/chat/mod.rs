//! Chat chains and conversation history

mod chain;
mod history;

pub use chain::{ChatChain, ConversationalChain};
pub use history::{HistoryCacheConfig, InMemoryHistoryStore};
