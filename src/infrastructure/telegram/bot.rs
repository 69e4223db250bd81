//! Long-polling bot loop and command handling

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, instrument, warn};

use super::client::TelegramClient;
use super::types::Update;
use crate::infrastructure::llm::HttpClientTrait;
use crate::infrastructure::services::{error_reply, ChatbotServiceTrait};

pub const GREETING: &str = "Hello! 我是你的 Telegram Bot 🤖";

const RAG_OPENED: &str = "成功開啟 RAG";
const RAG_OPEN_FAILED: &str = "開啟 RAG 失敗";
const RAG_CLOSED: &str = "成功關閉 RAG";
const RAG_CLOSE_FAILED: &str = "關閉 RAG 失敗";

const RETRY_DELAY: Duration = Duration::from_secs(5);

/// What an incoming text asks the bot to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotCommand {
    Start,
    OpenRag,
    CloseRag,
    Chat(String),
}

impl BotCommand {
    /// Classify a message; unknown slash commands and blank text are ignored
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let Some(command) = text.strip_prefix('/') else {
            return Some(BotCommand::Chat(text.to_string()));
        };

        // "/open_rag@my_bot extra" -> "open_rag"
        let name = command
            .split_whitespace()
            .next()
            .unwrap_or("")
            .split('@')
            .next()
            .unwrap_or("");

        match name {
            "start" => Some(BotCommand::Start),
            "open_rag" => Some(BotCommand::OpenRag),
            "close_rag" => Some(BotCommand::CloseRag),
            _ => None,
        }
    }
}

pub struct TelegramBot<C: HttpClientTrait> {
    client: TelegramClient<C>,
    chatbot: Arc<dyn ChatbotServiceTrait>,
    poll_timeout_secs: u64,
}

impl<C: HttpClientTrait> TelegramBot<C> {
    pub fn new(client: TelegramClient<C>, chatbot: Arc<dyn ChatbotServiceTrait>) -> Self {
        Self {
            client,
            chatbot,
            poll_timeout_secs: 30,
        }
    }

    pub fn with_poll_timeout(mut self, secs: u64) -> Self {
        self.poll_timeout_secs = secs;
        self
    }

    /// Reply text for a command
    pub async fn reply_to(&self, command: BotCommand) -> String {
        match command {
            BotCommand::Start => GREETING.to_string(),
            BotCommand::OpenRag => match self.chatbot.set_rag(true).await {
                Ok(_) => RAG_OPENED.to_string(),
                Err(e) => {
                    warn!(error = %e, "Failed to open RAG");
                    RAG_OPEN_FAILED.to_string()
                }
            },
            BotCommand::CloseRag => match self.chatbot.set_rag(false).await {
                Ok(_) => RAG_CLOSED.to_string(),
                Err(e) => {
                    warn!(error = %e, "Failed to close RAG");
                    RAG_CLOSE_FAILED.to_string()
                }
            },
            BotCommand::Chat(text) => self.chatbot.ask(&text).await.unwrap_or_else(|e| {
                warn!(error = %e, "Chat request failed");
                error_reply(&e)
            }),
        }
    }

    /// Answer one update if it carries a text message
    #[instrument(skip(self, update), fields(update_id = update.update_id))]
    pub async fn handle_update(&self, update: Update) {
        let Some(message) = update.message else {
            return;
        };
        let Some(command) = message.text.as_deref().and_then(BotCommand::parse) else {
            return;
        };

        info!(chat_id = message.chat.id, ?command, "Received message");
        let reply = self.reply_to(command).await;

        if let Err(e) = self.client.send_message(message.chat.id, &reply).await {
            warn!(chat_id = message.chat.id, error = %e, "Failed to send reply");
        }
    }

    /// Poll and answer updates one at a time until `shutdown` resolves
    pub async fn run(&self, shutdown: impl Future<Output = ()>) {
        tokio::pin!(shutdown);
        let mut offset: Option<i64> = None;
        info!("Telegram bot polling started");

        loop {
            let polled = tokio::select! {
                _ = &mut shutdown => break,
                polled = self.client.get_updates(offset, self.poll_timeout_secs) => polled,
            };

            match polled {
                Ok(updates) => {
                    for update in updates {
                        offset = Some(update.update_id + 1);
                        self.handle_update(update).await;
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Polling failed, retrying");
                    tokio::select! {
                        _ = &mut shutdown => break,
                        _ = tokio::time::sleep(RETRY_DELAY) => {}
                    }
                }
            }
        }

        info!("Telegram bot stopped");
    }
}
