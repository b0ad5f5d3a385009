//! Telegram adapter (teloxide).
//!
//! This crate implements the `osb-core` Notifier port over the Telegram Bot
//! API and hosts the update router / command handlers.

use async_trait::async_trait;

use teloxide::prelude::*;

use tokio::time::sleep;

pub mod handlers;
pub mod router;

use osb_core::{dispatch::Notifier, domain::UserId, errors::Error, Result};

#[derive(Clone)]
pub struct TelegramNotifier {
    bot: Bot,
}

impl TelegramNotifier {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    pub fn bot(&self) -> Bot {
        self.bot.clone()
    }

    fn tg_chat(recipient: UserId) -> teloxide::types::ChatId {
        teloxide::types::ChatId(recipient.0)
    }

    fn map_err(e: teloxide::RequestError) -> Error {
        Error::Delivery(format!("telegram error: {e}"))
    }

    async fn with_retry<T, Fut>(&self, mut op: impl FnMut() -> Fut) -> Result<T>
    where
        Fut: std::future::IntoFuture<Output = std::result::Result<T, teloxide::RequestError>>,
        Fut::IntoFuture: Send,
    {
        const MAX_RETRIES: usize = 1;
        let mut attempts = 0usize;
        loop {
            match op().await {
                Ok(v) => return Ok(v),
                Err(e) => match e {
                    teloxide::RequestError::RetryAfter(d) if attempts < MAX_RETRIES => {
                        attempts += 1;
                        sleep(d).await;
                        continue;
                    }
                    other => return Err(Self::map_err(other)),
                },
            }
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send_text(&self, recipient: UserId, text: &str) -> Result<()> {
        self.with_retry(|| self.bot.send_message(Self::tg_chat(recipient), text.to_string()))
            .await?;
        Ok(())
    }
}
