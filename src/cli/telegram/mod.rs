//! Telegram command - long-polls the Bot API until Ctrl-C

use std::time::Duration;

use anyhow::Context;
use tracing::info;

use crate::config::AppConfig;
use crate::infrastructure::llm::HttpClient;
use crate::infrastructure::telegram::{TelegramBot, TelegramClient};

/// Slack on top of the long-poll wait before the HTTP client gives up
const POLL_GRACE: Duration = Duration::from_secs(10);

pub async fn run(config: &AppConfig) -> anyhow::Result<()> {
    let token = config
        .telegram
        .resolved_token()
        .context("No Telegram token: set telegram.token or TELEGRAM_BOT_TOKEN")?;
    let poll_timeout = config.telegram.poll_timeout_secs;

    let chatbot = crate::create_chatbot_service(config)?;
    let http_client = HttpClient::with_timeout(Duration::from_secs(poll_timeout) + POLL_GRACE)?;
    let client = TelegramClient::new(http_client, &config.telegram.api_base_url, &token);

    info!(poll_timeout, "Starting Telegram bot");
    TelegramBot::new(client, chatbot)
        .with_poll_timeout(poll_timeout)
        .run(super::shutdown_signal())
        .await;

    Ok(())
}
