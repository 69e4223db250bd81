//! Infrastructure services

mod chatbot_service;
mod pipeline_service;

pub use chatbot_service::{error_reply, ChatbotService, ChatbotServiceDeps, ChatbotServiceTrait};
pub use pipeline_service::{BuildIndexRequest, BuildIndexResult, GenerationSettings, PipelineService};

#[cfg(test)]
pub use chatbot_service::MockChatbotServiceTrait;
