//! Chat chains: plain, retrieval-augmented and multi-turn

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::domain::chat::prompt::{self, PromptStyle};
use crate::domain::{
    AnswerChain, DomainError, HistoryStore, LlmProvider, LlmRequest, Message, Retriever,
};

const DEFAULT_TEMPERATURE: f32 = 0.1;

#[derive(Clone)]
enum Mode {
    Plain,
    Rag {
        retriever: Arc<dyn Retriever>,
        k: usize,
        style: PromptStyle,
    },
}

/// Single-turn chain: optional retrieval, prompt, chat model, text
#[derive(Clone)]
pub struct ChatChain {
    llm: Arc<dyn LlmProvider>,
    model: String,
    temperature: f32,
    mode: Mode,
}

impl std::fmt::Debug for ChatChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatChain")
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("with_rag", &self.uses_retrieval())
            .finish()
    }
}

impl ChatChain {
    /// Question goes straight to the model
    pub fn without_rag(llm: Arc<dyn LlmProvider>, model: impl Into<String>) -> Self {
        Self {
            llm,
            model: model.into(),
            temperature: DEFAULT_TEMPERATURE,
            mode: Mode::Plain,
        }
    }

    /// Top-`k` retrieved chunks are put in front of the question
    pub fn with_rag(
        llm: Arc<dyn LlmProvider>,
        model: impl Into<String>,
        retriever: Arc<dyn Retriever>,
        k: usize,
        style: PromptStyle,
    ) -> Self {
        Self {
            llm,
            model: model.into(),
            temperature: DEFAULT_TEMPERATURE,
            mode: Mode::Rag {
                retriever,
                k,
                style,
            },
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn uses_retrieval(&self) -> bool {
        matches!(self.mode, Mode::Rag { .. })
    }

    async fn complete(&self, messages: Vec<Message>) -> Result<String, DomainError> {
        let request = LlmRequest::builder()
            .messages(messages)
            .temperature(self.temperature)
            .build();

        let response = self.llm.chat(&self.model, request).await?;
        Ok(response.content().trim().to_string())
    }
}

#[async_trait]
impl AnswerChain for ChatChain {
    #[instrument(skip(self, question), fields(model = %self.model, with_rag = self.uses_retrieval()))]
    async fn invoke(&self, question: &str) -> Result<String, DomainError> {
        let messages = match &self.mode {
            Mode::Plain => prompt::without_rag(question),
            Mode::Rag {
                retriever,
                k,
                style,
            } => {
                let hits = retriever.retrieve(question, *k).await?;
                debug!(hits = hits.len(), "Retrieved context");
                prompt::with_rag(*style, &prompt::format_context(&hits), question)
            }
        };

        self.complete(messages).await
    }
}

/// Multi-turn retrieval chain with per-session history
///
/// The latest question is first rewritten into a standalone query using the
/// history, that query drives retrieval, and the answer prompt sees both the
/// history and the retrieved context.
#[derive(Clone)]
pub struct ConversationalChain {
    chain: ChatChain,
    retriever: Arc<dyn Retriever>,
    k: usize,
    history: Arc<dyn HistoryStore>,
}

impl ConversationalChain {
    pub fn new(
        llm: Arc<dyn LlmProvider>,
        model: impl Into<String>,
        retriever: Arc<dyn Retriever>,
        k: usize,
        history: Arc<dyn HistoryStore>,
    ) -> Self {
        Self {
            chain: ChatChain::without_rag(llm, model),
            retriever,
            k,
            history,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.chain = self.chain.with_temperature(temperature);
        self
    }

    #[instrument(skip(self, question), fields(model = %self.chain.model()))]
    pub async fn invoke(&self, session_id: &str, question: &str) -> Result<String, DomainError> {
        let history = self.history.history(session_id).await?;

        let query = if history.is_empty() {
            question.to_string()
        } else {
            self.chain.complete(prompt::condense(&history, question)).await?
        };
        debug!(session_id, turns = history.len(), query = %query, "Condensed question");

        let hits = self.retriever.retrieve(&query, self.k).await?;
        let context = prompt::format_context(&hits);

        let answer = self
            .chain
            .complete(prompt::answer_with_history(&history, &context, question))
            .await?;

        self.history
            .append(
                session_id,
                vec![Message::user(question), Message::assistant(answer.as_str())],
            )
            .await?;

        Ok(answer)
    }
}
