//! First-contact onboarding: registry membership + one-time operator alert.

use std::sync::Arc;

use chrono::Utc;

use crate::{
    dispatch::Dispatcher,
    domain::{User, UserId},
    store::UserRegistry,
    Result,
};

pub struct OnboardingService {
    registry: Arc<dyn UserRegistry>,
    dispatcher: Arc<Dispatcher>,
    operator: UserId,
}

impl OnboardingService {
    pub fn new(registry: Arc<dyn UserRegistry>, dispatcher: Arc<Dispatcher>, operator: UserId) -> Self {
        Self {
            registry,
            dispatcher,
            operator,
        }
    }

    /// Ensure the user is registered. Returns `true` iff this was a first
    /// contact; in that case exactly one "new user" alert goes to the
    /// operator. The alert is best-effort: the registry write has already
    /// committed, so a delivery failure is logged and not propagated.
    pub async fn onboard(&self, id: UserId, username: Option<&str>) -> Result<bool> {
        let user = User {
            id,
            username: username.map(|s| s.to_string()),
            joined_at: Utc::now(),
        };

        let is_new = self.registry.insert_if_absent(&user).await?;
        if !is_new {
            return Ok(false);
        }

        let handle = match username {
            Some(name) => format!("@{name}"),
            None => "(no username)".to_string(),
        };
        let alert = format!("👤 New user started bot:\n\nID: {}\nUsername: {handle}", id.0);
        if let Err(e) = self.dispatcher.notify_one(self.operator, &alert).await {
            eprintln!("[ONBOARD] Failed to notify operator about {}: {e}", id.0);
        }

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::test_support::FakeNotifier;
    use crate::store::memory::MemoryStore;

    const OPERATOR: UserId = UserId(999);

    fn service(store: Arc<MemoryStore>, notifier: Arc<FakeNotifier>) -> OnboardingService {
        OnboardingService::new(store, Arc::new(Dispatcher::new(notifier)), OPERATOR)
    }

    #[tokio::test]
    async fn first_contact_registers_and_alerts_operator_once() {
        let store = Arc::new(MemoryStore::new());
        let notifier = Arc::new(FakeNotifier::default());
        let svc = service(store.clone(), notifier.clone());

        assert!(svc.onboard(UserId(1), Some("alice")).await.unwrap());
        assert!(!svc.onboard(UserId(1), Some("alice")).await.unwrap());

        assert_eq!(store.user_count().await, 1);

        let sent = notifier.sent.lock().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, OPERATOR.0);
        assert!(sent[0].1.contains("ID: 1"));
        assert!(sent[0].1.contains("@alice"));
    }

    #[tokio::test]
    async fn alert_failure_does_not_fail_onboarding() {
        let store = Arc::new(MemoryStore::new());
        let notifier = Arc::new(FakeNotifier::failing_for(&[OPERATOR.0]));
        let svc = service(store.clone(), notifier);

        assert!(svc.onboard(UserId(2), None).await.unwrap());
        assert_eq!(store.user_count().await, 1);
    }
}
