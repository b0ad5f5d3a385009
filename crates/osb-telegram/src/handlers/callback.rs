use std::sync::Arc;

use teloxide::prelude::*;

use crate::router::AppState;

/// Welcome-menu buttons. Placeholder panels for now; the menu exists so
/// first-contact users get an interactive surface.
pub async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    _state: Arc<AppState>,
) -> ResponseResult<()> {
    let cb_id = q.id.clone();
    let data = q.data.clone().unwrap_or_default();

    // Always answer the callback query so the client stops its spinner.
    let _ = bot.answer_callback_query(cb_id).await;

    let Some(msg) = q.message else {
        return Ok(());
    };

    let panel = match data.as_str() {
        "dashboard" => "📊 Your Dashboard (coming soon...)",
        "purchases" => "🛒 Your Purchases (coming soon...)",
        _ => return Ok(()),
    };

    let _ = bot.edit_message_text(msg.chat.id, msg.id, panel).await;

    Ok(())
}
