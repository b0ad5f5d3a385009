//! Telegram update handlers.
//!
//! Each handler is a thin adapter: it extracts the caller identity, routes
//! commands into `osb-core` services, and echoes the outcome. Authorization
//! for operator-only commands happens inside `commands.rs` so that failed
//! checks stay silent.

use std::sync::Arc;

use teloxide::{
    prelude::*,
    types::{CallbackQuery, Message},
};

use crate::router::AppState;

mod callback;
mod commands;

pub async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    state: Arc<AppState>,
) -> ResponseResult<()> {
    callback::handle_callback(bot, q, state).await
}

pub async fn handle_message(bot: Bot, msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    if let Some(text) = msg.text() {
        if text.starts_with('/') {
            return commands::handle_command(bot, msg, state).await;
        }
    }

    // Non-command traffic is ignored; this bot only reacts to its command
    // surface.
    Ok(())
}
