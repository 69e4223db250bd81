//! Application configuration

mod app_config;

pub use app_config::{
    AppConfig, ChatbotConfig, EmbeddingSettings, EvaluationConfig, LlmSettings, LogFormat, LoggingConfig,
    ServerConfig, TelegramConfig,
};
