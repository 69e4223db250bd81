//! Chatbot parameters and named presets

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::PromptStyle;
use crate::domain::DomainError;

const DEFAULT_EMB_MODEL: &str = "Alibaba-NLP/gte-multilingual-base";
const DEFAULT_INDEX_PATH: &str = "index/alibaba_faiss";
const DEFAULT_CHATBOT_MODEL: &str = "moonshotai/kimi-k2:free";
const DEFAULT_JUDGE_MODEL: &str = "google/gemma-3-27b-it:free";
const DEFAULT_K: usize = 5;

/// Everything needed to build a chat chain or an evaluation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ChatbotParams {
    #[validate(length(min = 1, message = "emb_model must not be empty"))]
    pub emb_model: String,
    /// Directory of the persisted index
    #[validate(length(min = 1, message = "faiss_idx_path must not be empty"))]
    pub faiss_idx_path: String,
    #[validate(range(min = 1, message = "k must be at least 1"))]
    pub k: usize,
    #[validate(length(min = 1, message = "chatbot_model must not be empty"))]
    pub chatbot_model: String,
    #[validate(length(min = 1, message = "judge_model must not be empty"))]
    pub judge_model: String,
    #[serde(default = "default_with_rag")]
    pub with_rag: bool,
    #[serde(default)]
    pub prompt_style: PromptStyle,
}

fn default_with_rag() -> bool {
    true
}

impl Default for ChatbotParams {
    fn default() -> Self {
        Preset::Alibaba.params()
    }
}

impl ChatbotParams {
    /// Check field constraints, folding validator output into a domain error
    pub fn ensure_valid(&self) -> Result<(), DomainError> {
        self.validate()
            .map_err(|e| DomainError::validation(format!("Invalid chatbot params: {}", e)))
    }

    pub fn with_rag(mut self, with_rag: bool) -> Self {
        self.with_rag = with_rag;
        self
    }

    /// Apply a partial update; keys left as `None` are untouched
    pub fn apply(&mut self, update: ParamsUpdate) -> Result<(), DomainError> {
        let mut next = self.clone();

        if let Some(v) = update.emb_model {
            next.emb_model = v;
        }
        if let Some(v) = update.faiss_idx_path {
            next.faiss_idx_path = v;
        }
        if let Some(v) = update.k {
            next.k = v;
        }
        if let Some(v) = update.chatbot_model {
            next.chatbot_model = v;
        }
        if let Some(v) = update.judge_model {
            next.judge_model = v;
        }
        if let Some(v) = update.with_rag {
            next.with_rag = v;
        }
        if let Some(v) = update.prompt_style {
            next.prompt_style = v;
        }

        next.ensure_valid()?;
        *self = next;
        Ok(())
    }
}

/// Partial update of [`ChatbotParams`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamsUpdate {
    pub emb_model: Option<String>,
    pub faiss_idx_path: Option<String>,
    pub k: Option<usize>,
    pub chatbot_model: Option<String>,
    pub judge_model: Option<String>,
    pub with_rag: Option<bool>,
    pub prompt_style: Option<PromptStyle>,
}

impl ParamsUpdate {
    pub fn with_rag(with_rag: bool) -> Self {
        Self {
            with_rag: Some(with_rag),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Named parameter sets used by the evaluation scripts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    Alibaba,
    AlibabaWorag,
    Mistral,
    MistralWorag,
    Deepseek,
    DeepseekWorag,
    Sentence,
}

impl Preset {
    pub const ALL: [Preset; 7] = [
        Preset::Alibaba,
        Preset::AlibabaWorag,
        Preset::Mistral,
        Preset::MistralWorag,
        Preset::Deepseek,
        Preset::DeepseekWorag,
        Preset::Sentence,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Preset::Alibaba => "alibaba",
            Preset::AlibabaWorag => "alibaba_worag",
            Preset::Mistral => "mistral",
            Preset::MistralWorag => "mistral_worag",
            Preset::Deepseek => "deepseek",
            Preset::DeepseekWorag => "deepseek_worag",
            Preset::Sentence => "sentence",
        }
    }

    pub fn params(&self) -> ChatbotParams {
        let base = ChatbotParams {
            emb_model: DEFAULT_EMB_MODEL.to_string(),
            faiss_idx_path: DEFAULT_INDEX_PATH.to_string(),
            k: DEFAULT_K,
            chatbot_model: DEFAULT_CHATBOT_MODEL.to_string(),
            judge_model: DEFAULT_JUDGE_MODEL.to_string(),
            with_rag: true,
            prompt_style: PromptStyle::default(),
        };

        match self {
            Preset::Alibaba => base,
            Preset::AlibabaWorag => base.with_rag(false),
            Preset::Mistral => ChatbotParams {
                chatbot_model: "mistralai/mistral-nemo:free".to_string(),
                ..base
            },
            Preset::MistralWorag => Preset::Mistral.params().with_rag(false),
            Preset::Deepseek => ChatbotParams {
                chatbot_model: "deepseek/deepseek-r1:free".to_string(),
                ..base
            },
            Preset::DeepseekWorag => Preset::Deepseek.params().with_rag(false),
            Preset::Sentence => ChatbotParams {
                emb_model: "sentence-transformers/all-MiniLM-L6-v2".to_string(),
                faiss_idx_path: "index/sentencetransformer_faiss".to_string(),
                ..base
            },
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Preset::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                let names: Vec<_> = Preset::ALL.iter().map(Preset::name).collect();
                DomainError::not_found(format!(
                    "Unknown preset '{}', expected one of: {}",
                    s,
                    names.join(", ")
                ))
            })
    }
}
