//! Chat domain: parameters, prompts and conversation history

mod chain;
mod history;
mod params;
pub mod prompt;

pub use chain::AnswerChain;
pub use history::HistoryStore;
pub use params::{ChatbotParams, ParamsUpdate, Preset};
pub use prompt::PromptStyle;

#[cfg(test)]
pub use chain::MockAnswerChain;
#[cfg(test)]
pub use history::MockHistoryStore;
