//! Telegram front end: Bot API client and the long-polling loop

mod bot;
mod client;
mod types;

pub use bot::{BotCommand, TelegramBot, GREETING};
pub use client::TelegramClient;
pub use types::{Chat, TelegramMessage, Update};
