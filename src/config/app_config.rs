use serde::Deserialize;

const DEFAULT_LLM_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub llm: LlmSettings,
    pub embedding: EmbeddingSettings,
    pub telegram: TelegramConfig,
    pub chatbot: ChatbotConfig,
    pub evaluation: EvaluationConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Chat-completion endpoint used by the chatbot and the judge
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    pub base_url: String,
    pub api_key: Option<String>,
    pub temperature: f32,
    pub judge_temperature: f32,
    pub timeout_secs: u64,
}

/// Hosted embedding endpoint; `hash:` models never touch it
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    pub base_url: String,
    pub api_key: Option<String>,
    pub batch_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    pub token: Option<String>,
    pub api_base_url: String,
    pub poll_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChatbotConfig {
    /// Location of the shared params.json
    pub params_path: String,
    /// Upper bound for one question -> answer round trip
    pub request_timeout_secs: u64,
    /// Messages kept per conversation by the in-memory history
    pub history_max_messages: usize,
    /// Sessions kept in memory before the least useful are evicted
    pub history_max_sessions: u64,
    /// Sessions idle for longer than this are dropped
    pub history_idle_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    pub benchmark_dir: String,
    pub retrieval_output: String,
    pub generation_output: String,
    /// Pause after this many rows of a benchmark file; 0 disables pacing
    pub pacing_every: usize,
    pub pacing_delay_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_LLM_BASE_URL.to_string(),
            api_key: None,
            temperature: 0.1,
            judge_temperature: 0.0,
            timeout_secs: 120,
        }
    }
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_LLM_BASE_URL.to_string(),
            api_key: None,
            batch_size: 64,
        }
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_base_url: "https://api.telegram.org".to_string(),
            poll_timeout_secs: 30,
        }
    }
}

impl Default for ChatbotConfig {
    fn default() -> Self {
        Self {
            params_path: "params.json".to_string(),
            request_timeout_secs: 180,
            history_max_messages: 20,
            history_max_sessions: 10_000,
            history_idle_secs: 3600,
        }
    }
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            benchmark_dir: "data/eval/retrieval".to_string(),
            retrieval_output: "results/retrieval/evaluation_results.csv".to_string(),
            generation_output: "results/qa/evaluation_results.csv".to_string(),
            pacing_every: 4,
            pacing_delay_secs: 180,
        }
    }
}

impl LlmSettings {
    /// Configured key, falling back to `OPENROUTER_API_KEY`
    pub fn resolved_api_key(&self) -> Option<String> {
        non_empty(self.api_key.clone()).or_else(|| non_empty(std::env::var("OPENROUTER_API_KEY").ok()))
    }
}

impl EmbeddingSettings {
    /// Configured key, falling back to the chat key sources
    pub fn resolved_api_key(&self, llm: &LlmSettings) -> Option<String> {
        non_empty(self.api_key.clone()).or_else(|| llm.resolved_api_key())
    }
}

impl TelegramConfig {
    /// Configured token, falling back to `TELEGRAM_BOT_TOKEN`
    pub fn resolved_token(&self) -> Option<String> {
        non_empty(self.token.clone()).or_else(|| non_empty(std::env::var("TELEGRAM_BOT_TOKEN").ok()))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
