//! Q/A chatbot over a retrieval-augmented index
//!
//! - Ingest Q/A CSVs and JSON notes, chunk and embed them into a flat index
//! - Answer questions with or without retrieved context
//! - Evaluate retrieval precision@k and LLM-judged answer quality
//! - Serve the chatbot over HTTP and Telegram

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use domain::{ChatbotParams, Preset};
use infrastructure::{
    chat::{HistoryCacheConfig, InMemoryHistoryStore},
    embedding::EmbedderFactory,
    evaluation::Pacing,
    llm::LlmProviderFactory,
    logging,
    params::ParamsFileStore,
    services::{ChatbotService, ChatbotServiceDeps, GenerationSettings, PipelineService},
};
use tracing::info;

/// Load `.env`, the layered config and install logging
pub fn bootstrap() -> anyhow::Result<AppConfig> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    logging::init_logging(&config.logging);

    Ok(config)
}

pub fn params_store(config: &AppConfig) -> Arc<ParamsFileStore> {
    Arc::new(ParamsFileStore::new(&config.chatbot.params_path))
}

/// Params for one CLI run: a named preset wins over `params.json`
pub async fn resolve_params(
    config: &AppConfig,
    preset: Option<Preset>,
) -> anyhow::Result<ChatbotParams> {
    match preset {
        Some(preset) => {
            info!(preset = %preset, "Using preset params");
            Ok(preset.params())
        }
        None => Ok(params_store(config).load().await?),
    }
}

/// Chatbot service shared by the HTTP server and the Telegram bot
pub fn create_chatbot_service(config: &AppConfig) -> anyhow::Result<Arc<ChatbotService>> {
    let llm = LlmProviderFactory::create(&config.llm)?;
    let history = InMemoryHistoryStore::with_config(HistoryCacheConfig {
        max_sessions: config.chatbot.history_max_sessions,
        idle_ttl: Duration::from_secs(config.chatbot.history_idle_secs),
    })
    .with_max_messages(config.chatbot.history_max_messages);

    let service = ChatbotService::new(ChatbotServiceDeps {
        params: params_store(config),
        llm,
        embedders: EmbedderFactory::new(&config.embedding, &config.llm),
        history: Arc::new(history),
    })
    .with_temperature(config.llm.temperature)
    .with_request_timeout(Duration::from_secs(config.chatbot.request_timeout_secs));

    info!(params = %config.chatbot.params_path, "Chatbot service ready");
    Ok(Arc::new(service))
}

pub fn create_pipeline_service(config: &AppConfig) -> PipelineService {
    PipelineService::new(EmbedderFactory::new(&config.embedding, &config.llm))
}

pub fn generation_settings(config: &AppConfig, pause: bool) -> GenerationSettings {
    let pacing = if pause {
        Pacing::new(
            config.evaluation.pacing_every,
            Duration::from_secs(config.evaluation.pacing_delay_secs),
        )
    } else {
        Pacing::none()
    };

    GenerationSettings {
        temperature: config.llm.temperature,
        judge_temperature: config.llm.judge_temperature,
        pacing,
    }
}

pub(crate) fn path_or(value: Option<&Path>, fallback: &str) -> std::path::PathBuf {
    value.map(Path::to_path_buf).unwrap_or_else(|| fallback.into())
}
