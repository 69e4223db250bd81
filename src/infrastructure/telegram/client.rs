use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;

use super::types::{ApiResponse, Update};
use crate::domain::DomainError;
use crate::infrastructure::llm::HttpClientTrait;

const PROVIDER: &str = "telegram";

/// Telegram caps a single message at 4096 characters
pub const MAX_MESSAGE_CHARS: usize = 4096;

/// Sent instead of an empty answer, which Telegram would reject
pub const EMPTY_REPLY: &str = "抱歉，沒有產生任何回覆。";

/// Minimal Bot API client over JSON POSTs
#[derive(Debug)]
pub struct TelegramClient<C: HttpClientTrait> {
    client: C,
    bot_url: String,
}

impl<C: HttpClientTrait> TelegramClient<C> {
    pub fn new(client: C, api_base_url: &str, token: &str) -> Self {
        Self {
            client,
            bot_url: format!("{}/bot{}", api_base_url.trim_end_matches('/'), token),
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/{}", self.bot_url, method)
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        body: serde_json::Value,
    ) -> Result<T, DomainError> {
        let value = self
            .client
            .post_json(
                &self.method_url(method),
                vec![("Content-Type", "application/json")],
                &body,
            )
            .await?;

        let response: ApiResponse<T> = serde_json::from_value(value).map_err(|e| {
            DomainError::provider(PROVIDER, format!("Unexpected {} response: {}", method, e))
        })?;

        if !response.ok {
            return Err(DomainError::provider(
                PROVIDER,
                response
                    .description
                    .unwrap_or_else(|| format!("{} failed", method)),
            ));
        }

        response
            .result
            .ok_or_else(|| DomainError::provider(PROVIDER, format!("{} returned no result", method)))
    }

    /// Long-poll for updates after `offset`
    pub async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout_secs: u64,
    ) -> Result<Vec<Update>, DomainError> {
        let mut body = json!({
            "timeout": timeout_secs,
            "allowed_updates": ["message"],
        });
        if let Some(offset) = offset {
            body["offset"] = json!(offset);
        }

        let updates: Vec<Update> = self.call("getUpdates", body).await?;
        debug!(count = updates.len(), "Polled updates");
        Ok(updates)
    }

    /// Send `text`, split into several messages when it exceeds the size cap
    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), DomainError> {
        let text = if text.trim().is_empty() { EMPTY_REPLY } else { text };

        for part in split_message(text, MAX_MESSAGE_CHARS) {
            let _: serde_json::Value = self
                .call("sendMessage", json!({ "chat_id": chat_id, "text": part }))
                .await?;
        }
        Ok(())
    }
}

#[cfg(test)]
impl TelegramClient<crate::infrastructure::llm::MockHttpClient> {
    pub(crate) fn client_requests(&self) -> Vec<(String, serde_json::Value)> {
        self.client.requests()
    }
}

fn split_message(text: &str, max_chars: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(max_chars.max(1))
        .map(|chunk| chunk.iter().collect())
        .collect()
}
