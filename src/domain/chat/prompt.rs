//! Prompt templates for the chat chains

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::index::SearchHit;
use crate::domain::llm::Message;
use crate::domain::DomainError;

pub const SYSTEM_INSTRUCTION: &str = "你是一個有幫助且簡潔的助理。";

/// Fixed reply the strict prompt asks for when the context has no answer
pub const REFUSAL_SENTENCE: &str = "根據提供的內容無法回答";

const PLAIN_TEXT_RULE: &str = "不要使用任何 Markdown 標記（例如 ** 或 ##），只輸出純文字。";

const CONVERSATIONAL_EXAMPLES: &str = "<few_shot_examples>\n\
  <example>\n\
    <question>我還沒當兵，但被推薦去德國研究，請問最長可以待多久？</question>\n\
    <answer>如果你是還在念書的役男，那最長可以待一年；但如果不是在學身份，就只能最多六個月。希望這樣能幫到你！</answer>\n\
  </example>\n\n\
  <example>\n\
    <question>請問替代役可以申請延期嗎？</question>\n\
    <answer>可以的，但需要符合特定條件，比如繼續升學或特殊家庭狀況。建議你確認一下相關規定，再遞交申請。希望有幫助！</answer>\n\
  </example>\n\
</few_shot_examples>\n\n";

const CONDENSE_INSTRUCTION: &str = "You reformulate the user's latest question into a standalone search query, \
grounded by the chat history. Do NOT answer.";

const HISTORY_ANSWER_INSTRUCTION: &str = "You are a helpful, concise assistant. Use the provided context to answer. \
If the answer isn't contained in the context, say you're unsure.";

/// Wording of the retrieval-augmented prompt
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptStyle {
    /// Answer only from context, fixed refusal otherwise
    #[default]
    Strict,
    /// Friendlier tone guided by few-shot examples
    Conversational,
}

impl PromptStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            PromptStyle::Strict => "strict",
            PromptStyle::Conversational => "conversational",
        }
    }
}

impl fmt::Display for PromptStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PromptStyle {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "strict" => Ok(PromptStyle::Strict),
            "conversational" => Ok(PromptStyle::Conversational),
            other => Err(DomainError::validation(format!(
                "Unknown prompt style '{}', expected 'strict' or 'conversational'",
                other
            ))),
        }
    }
}

/// Join retrieved chunk texts with blank lines
pub fn format_context(hits: &[SearchHit]) -> String {
    hits.iter()
        .map(|hit| hit.document.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn without_rag(question: &str) -> Vec<Message> {
    vec![
        Message::system(SYSTEM_INSTRUCTION),
        Message::user(format!(
            "問題：{}\n\n回答:\n⚠️ 請務必遵循以下規則：\n1. 輸出{}",
            question, PLAIN_TEXT_RULE
        )),
    ]
}

pub fn with_rag(style: PromptStyle, context: &str, question: &str) -> Vec<Message> {
    let rules = match style {
        PromptStyle::Strict => format!(
            "⚠️ 請務必遵循以下規則：\n\
             1. 只根據提供的檢索內容回答問題。\n\
             2. 如果檢索內容中沒有答案，請回答『{}』。\n\
             3. 請用中文作答，不得使用其他語言。\n\
             4. {}",
            REFUSAL_SENTENCE, PLAIN_TEXT_RULE
        ),
        PromptStyle::Conversational => format!(
            "⚠️ 請務必遵循以下規則：\n\
             1. 根據提供的檢索內容回答問題。\n\
             2. 請用中文作答，不得使用其他語言。\n\
             3. 回答時要重點清晰、不要冗長。\n\
             4. 回答要更加自然、友善，就像和朋友聊天一樣，請模仿下方 <few_shot_examples> 的風格。\n\
             5. {}\n\n{}",
            PLAIN_TEXT_RULE, CONVERSATIONAL_EXAMPLES
        ),
    };

    vec![
        Message::system(SYSTEM_INSTRUCTION),
        Message::user(format!(
            "檢索內容：\n{}\n\n問題：{}\n\n{}",
            context, question, rules
        )),
    ]
}

/// Rewrite the latest question into a standalone search query
pub fn condense(history: &[Message], question: &str) -> Vec<Message> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(Message::system(CONDENSE_INSTRUCTION));
    messages.extend(history.iter().cloned());
    messages.push(Message::user(question));
    messages
}

pub fn answer_with_history(history: &[Message], context: &str, question: &str) -> Vec<Message> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(Message::system(HISTORY_ANSWER_INSTRUCTION));
    messages.extend(history.iter().cloned());
    messages.push(Message::user(format!(
        "Context:\n{}\n\nQuestion: {}\n\nAnswer:",
        context, question
    )));
    messages
}
