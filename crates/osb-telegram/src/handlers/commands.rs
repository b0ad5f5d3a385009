use std::sync::Arc;

use teloxide::{
    prelude::*,
    types::{InlineKeyboardButton, InlineKeyboardMarkup},
};

use osb_core::{
    auth::is_operator,
    domain::{ReportWindow, UserId},
    sales::SalesService,
    Error,
};

use crate::router::AppState;

fn parse_command(text: &str) -> (String, String) {
    // Telegram may send `/cmd@botname arg1 ...`
    let mut parts = text.trim().splitn(2, char::is_whitespace);
    let first = parts.next().unwrap_or("").trim();
    let rest = parts.next().unwrap_or("").trim().to_string();

    let cmd = first
        .trim_start_matches('/')
        .split('@')
        .next()
        .unwrap_or("")
        .to_lowercase();

    (cmd, rest)
}

pub async fn handle_command(bot: Bot, msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };
    let (cmd, args) = parse_command(text);

    let user = msg.from();
    let user_id = user.map(|u| UserId(u.id.0 as i64));
    let username = user.and_then(|u| u.username.as_deref());

    match cmd.as_str() {
        "start" => handle_start(bot, &msg, state, user_id, username).await,
        "addsale" => handle_addsale(bot, &msg, state, user_id, &args).await,
        "report" => handle_report(state, user_id, &args).await,
        "broadcast" => handle_broadcast(bot, &msg, state, user_id, &args).await,
        // Unknown commands are ignored.
        _ => Ok(()),
    }
}

async fn handle_start(
    bot: Bot,
    msg: &Message,
    state: Arc<AppState>,
    user_id: Option<UserId>,
    username: Option<&str>,
) -> ResponseResult<()> {
    let Some(user_id) = user_id else {
        return Ok(());
    };

    // Registry failure means the user is NOT onboarded; skip the welcome so
    // they retry /start rather than assume they are registered.
    if let Err(e) = state.onboarding.onboard(user_id, username).await {
        eprintln!("[START] Onboarding {} failed: {e}", user_id.0);
        let _ = bot
            .send_message(msg.chat.id, "⚠️ Something went wrong, please try /start again.")
            .await;
        return Ok(());
    }

    let keyboard = InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback("📊 Dashboard", "dashboard")],
        vec![InlineKeyboardButton::callback("🛒 My Purchases", "purchases")],
    ]);
    let _ = bot
        .send_message(
            msg.chat.id,
            "👋 Welcome to OTT Subscription Bot!\nChoose an option:",
        )
        .reply_markup(keyboard)
        .await;

    Ok(())
}

async fn handle_addsale(
    bot: Bot,
    msg: &Message,
    state: Arc<AppState>,
    user_id: Option<UserId>,
    args: &str,
) -> ResponseResult<()> {
    if !is_operator(user_id, state.cfg.operator_id) {
        return Ok(()); // silent: do not confirm privileged surfaces
    }

    let parsed = match SalesService::parse_args(args) {
        Ok(v) => v,
        Err(Error::MalformedInput { usage }) => {
            let _ = bot.send_message(msg.chat.id, format!("❌ {usage}")).await;
            return Ok(());
        }
        Err(e) => {
            eprintln!("[ADDSALE] Unexpected parse error: {e}");
            return Ok(());
        }
    };

    match state.sales.record(parsed).await {
        Ok(sale) => {
            let mut reply = format!(
                "✅ Sale recorded: {sym}{} (profit {sym}{}) for {}",
                sale.amount,
                sale.profit,
                sale.customer_ref,
                sym = state.cfg.currency_symbol,
            );
            if let Some(expiry) = sale.expiry {
                reply.push_str(&format!("\nExpires: {}", expiry.format("%Y-%m-%d")));
            }
            let _ = bot.send_message(msg.chat.id, reply).await;
        }
        Err(e) => {
            eprintln!("[ADDSALE] Failed to record sale: {e}");
            let _ = bot
                .send_message(msg.chat.id, "❌ Failed to record sale, see logs.")
                .await;
        }
    }

    Ok(())
}

async fn handle_report(
    state: Arc<AppState>,
    user_id: Option<UserId>,
    args: &str,
) -> ResponseResult<()> {
    if !is_operator(user_id, state.cfg.operator_id) {
        return Ok(());
    }

    let window = if args.trim().eq_ignore_ascii_case("all") {
        ReportWindow::unbounded()
    } else {
        ReportWindow::utc_day_so_far(chrono::Utc::now())
    };

    // Ad-hoc fire; the daily schedule's next fire time is untouched.
    if let Err(e) = state.scheduler.fire_now(window).await {
        eprintln!("[REPORT] Ad-hoc report failed: {e}");
    }

    Ok(())
}

async fn handle_broadcast(
    bot: Bot,
    msg: &Message,
    state: Arc<AppState>,
    user_id: Option<UserId>,
    args: &str,
) -> ResponseResult<()> {
    if !is_operator(user_id, state.cfg.operator_id) {
        return Ok(());
    }

    let text = args.trim();
    if text.is_empty() {
        let _ = bot
            .send_message(msg.chat.id, "❌ Usage: /broadcast <text>")
            .await;
        return Ok(());
    }

    // If the enumeration itself fails the broadcast fails as a whole.
    let users = match state.registry.all_users().await {
        Ok(v) => v,
        Err(e) => {
            eprintln!("[BROADCAST] Failed to enumerate users: {e}");
            let _ = bot
                .send_message(msg.chat.id, "❌ Broadcast failed: could not load users.")
                .await;
            return Ok(());
        }
    };

    let recipients: Vec<UserId> = users.iter().map(|u| u.id).collect();
    let result = state.dispatcher.notify_many(&recipients, text).await;

    let _ = bot
        .send_message(
            msg.chat.id,
            format!(
                "📣 Broadcast delivered to {}/{} users.",
                result.delivered, result.attempted
            ),
        )
        .await;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_command_strips_slash_and_botname() {
        assert_eq!(
            parse_command("/addsale@ott_bot 100 20 30 alice"),
            ("addsale".to_string(), "100 20 30 alice".to_string())
        );
        assert_eq!(parse_command("/start"), ("start".to_string(), String::new()));
        assert_eq!(
            parse_command("/BROADCAST hello world"),
            ("broadcast".to_string(), "hello world".to_string())
        );
    }
}
