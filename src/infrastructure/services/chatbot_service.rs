//! Chatbot service - the single entry point used by the web API and the Telegram bot

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use crate::domain::{
    AnswerChain, ChatbotParams, DomainError, HistoryStore, LlmProvider, ParamsUpdate, Retriever,
};
use crate::infrastructure::chat::{ChatChain, ConversationalChain};
use crate::infrastructure::embedding::EmbedderFactory;
use crate::infrastructure::index::{self, FlatIndex, IndexHandle};
use crate::infrastructure::params::ParamsFileStore;

#[cfg(test)]
use mockall::automock;

/// Reply text shown to end users when a request fails
pub fn error_reply(error: &DomainError) -> String {
    format!("Error: {}", error)
}

/// Chat operations exposed to the outer surfaces
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ChatbotServiceTrait: Send + Sync {
    /// Answer a single question using the current params
    async fn ask(&self, question: &str) -> Result<String, DomainError>;

    /// Answer within a conversation, remembering earlier turns
    async fn ask_in_session(&self, session_id: &str, question: &str) -> Result<String, DomainError>;

    /// Persist a new `with_rag` value
    async fn set_rag(&self, enabled: bool) -> Result<ChatbotParams, DomainError>;
}

/// Dependencies of [`ChatbotService`]
pub struct ChatbotServiceDeps {
    pub params: Arc<ParamsFileStore>,
    pub llm: Arc<dyn LlmProvider>,
    pub embedders: EmbedderFactory,
    pub history: Arc<dyn HistoryStore>,
}

/// Builds a chain from the current `params.json` for every request
///
/// Params are re-read each time so `update-config` takes effect without a
/// restart. The loaded index is reused until its manifest changes on disk.
pub struct ChatbotService {
    params: Arc<ParamsFileStore>,
    llm: Arc<dyn LlmProvider>,
    embedders: EmbedderFactory,
    history: Arc<dyn HistoryStore>,
    temperature: f32,
    request_timeout: Duration,
    index: RwLock<Option<Arc<IndexHandle>>>,
}

impl ChatbotService {
    pub fn new(deps: ChatbotServiceDeps) -> Self {
        Self {
            params: deps.params,
            llm: deps.llm,
            embedders: deps.embedders,
            history: deps.history,
            temperature: 0.1,
            request_timeout: Duration::from_secs(180),
            index: RwLock::new(None),
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub async fn params(&self) -> Result<ChatbotParams, DomainError> {
        self.params.load().await
    }

    /// Like [`ChatbotServiceTrait::ask`] but failures become an `Error: ...` reply
    pub async fn ask_safe(&self, question: &str) -> String {
        self.ask(question).await.unwrap_or_else(|e| {
            warn!(error = %e, "Chat request failed");
            error_reply(&e)
        })
    }

    /// Chain for the given params: plain, or backed by the configured index
    pub async fn chain_for(&self, params: &ChatbotParams) -> Result<ChatChain, DomainError> {
        let chain = if params.with_rag {
            ChatChain::with_rag(
                self.llm.clone(),
                &params.chatbot_model,
                self.retriever(params).await?,
                params.k,
                params.prompt_style,
            )
        } else {
            ChatChain::without_rag(self.llm.clone(), &params.chatbot_model)
        };

        Ok(chain.with_temperature(self.temperature))
    }

    /// Index handle for `params`, reloaded when the index on disk has changed
    pub async fn retriever(&self, params: &ChatbotParams) -> Result<Arc<dyn Retriever>, DomainError> {
        let path = Path::new(&params.faiss_idx_path);
        let on_disk = FlatIndex::read_manifest(path).await?;
        on_disk.ensure_model(&params.emb_model)?;

        if let Some(handle) = self.index.read().await.as_ref() {
            if handle.path() == path && *handle.index().manifest() == on_disk {
                return Ok(handle.clone());
            }
        }

        let embedder = self.embedders.for_model(&params.emb_model)?;
        let handle = Arc::new(index::load(path, embedder).await?);
        info!(
            path = %path.display(),
            model = %params.emb_model,
            entries = handle.index().len(),
            "Loaded index"
        );

        *self.index.write().await = Some(handle.clone());
        Ok(handle)
    }

    async fn with_timeout<F>(&self, fut: F) -> Result<String, DomainError>
    where
        F: std::future::Future<Output = Result<String, DomainError>>,
    {
        tokio::time::timeout(self.request_timeout, fut)
            .await
            .map_err(|_| {
                DomainError::timeout(format!(
                    "No answer within {} seconds",
                    self.request_timeout.as_secs()
                ))
            })?
    }
}

#[async_trait]
impl ChatbotServiceTrait for ChatbotService {
    #[instrument(skip(self, question))]
    async fn ask(&self, question: &str) -> Result<String, DomainError> {
        let params = self.params.load().await?;
        debug!(model = %params.chatbot_model, with_rag = params.with_rag, "Answering");

        let chain = self.chain_for(&params).await?;
        self.with_timeout(chain.invoke(question)).await
    }

    #[instrument(skip(self, question))]
    async fn ask_in_session(&self, session_id: &str, question: &str) -> Result<String, DomainError> {
        let params = self.params.load().await?;

        if !params.with_rag {
            let chain = self.chain_for(&params).await?;
            return self.with_timeout(chain.invoke(question)).await;
        }

        let chain = ConversationalChain::new(
            self.llm.clone(),
            &params.chatbot_model,
            self.retriever(&params).await?,
            params.k,
            self.history.clone(),
        )
        .with_temperature(self.temperature);

        self.with_timeout(chain.invoke(session_id, question)).await
    }

    async fn set_rag(&self, enabled: bool) -> Result<ChatbotParams, DomainError> {
        let params = self.params.update(ParamsUpdate::with_rag(enabled)).await?;
        info!(with_rag = params.with_rag, "Toggled RAG");
        Ok(params)
    }
}
