//! Notification dispatch: single delivery and broadcast fan-out.

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    domain::{BroadcastResult, UserId},
    Result,
};

/// Transport port for outbound notifications.
///
/// Telegram is the first implementation; the core never manages connection
/// state, it only calls `send_text` and maps failures to `Error::Delivery`.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_text(&self, recipient: UserId, text: &str) -> Result<()>;
}

pub struct Dispatcher {
    notifier: Arc<dyn Notifier>,
}

impl Dispatcher {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier }
    }

    /// Single delivery. The transport error is surfaced to the caller, who
    /// decides whether to log-and-continue or propagate.
    pub async fn notify_one(&self, recipient: UserId, text: &str) -> Result<()> {
        self.notifier.send_text(recipient, text).await
    }

    /// Sequential fan-out in the given order. A per-recipient failure
    /// (blocked, deactivated, transport error) is logged, counted as
    /// non-delivered, and the loop continues. No abort-on-first-failure,
    /// no retry; always completes after `recipients.len()` attempts.
    pub async fn notify_many(&self, recipients: &[UserId], text: &str) -> BroadcastResult {
        let mut delivered = 0usize;
        for &recipient in recipients {
            match self.notifier.send_text(recipient, text).await {
                Ok(()) => delivered += 1,
                Err(e) => {
                    eprintln!("[BROADCAST] Skipping {}: {e}", recipient.0);
                }
            }
        }
        BroadcastResult {
            attempted: recipients.len(),
            delivered,
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::HashSet;

    use tokio::sync::Mutex;

    use super::*;
    use crate::errors::Error;

    /// Records every send; fails for a configured subset of recipients.
    #[derive(Default)]
    pub struct FakeNotifier {
        pub failing: HashSet<i64>,
        pub sent: Mutex<Vec<(i64, String)>>,
    }

    impl FakeNotifier {
        pub fn failing_for(ids: &[i64]) -> Self {
            Self {
                failing: ids.iter().copied().collect(),
                sent: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Notifier for FakeNotifier {
        async fn send_text(&self, recipient: UserId, text: &str) -> Result<()> {
            if self.failing.contains(&recipient.0) {
                return Err(Error::Delivery(format!("recipient {} blocked", recipient.0)));
            }
            self.sent.lock().await.push((recipient.0, text.to_string()));
            Ok(())
        }
    }
}
