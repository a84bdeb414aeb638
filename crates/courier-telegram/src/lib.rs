//! # courier-telegram
//!
//! Telegram Bot API access for Courier: wire types, the [`api::BotApi`]
//! trait, and the reqwest-backed [`client::TelegramClient`].
//!
//! Uses long polling via `getUpdates`. Docs: <https://core.telegram.org/bots/api>

pub mod api;
pub mod client;
pub mod types;
