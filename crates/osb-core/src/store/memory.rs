//! In-memory store used by service tests (and handy for local dry runs).

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{
    domain::{ReportWindow, Sale, User, UserId},
    store::{SalesLedger, UserRegistry},
    Result,
};

#[derive(Default)]
pub struct MemoryStore {
    users: Mutex<Vec<User>>,
    sales: Mutex<Vec<Sale>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn user_count(&self) -> usize {
        self.users.lock().await.len()
    }

    pub async fn sale_count(&self) -> usize {
        self.sales.lock().await.len()
    }
}

#[async_trait]
impl UserRegistry for MemoryStore {
    async fn insert_if_absent(&self, user: &User) -> Result<bool> {
        let mut users = self.users.lock().await;
        if users.iter().any(|u| u.id == user.id) {
            return Ok(false);
        }
        users.push(user.clone());
        Ok(true)
    }

    async fn all_users(&self) -> Result<Vec<User>> {
        Ok(self.users.lock().await.clone())
    }
}

#[async_trait]
impl SalesLedger for MemoryStore {
    async fn insert_sale(&self, sale: &Sale) -> Result<()> {
        self.sales.lock().await.push(sale.clone());
        Ok(())
    }

    async fn sales_in(&self, window: ReportWindow) -> Result<Vec<Sale>> {
        let sales = self.sales.lock().await;
        Ok(sales
            .iter()
            .filter(|s| window.contains(s.recorded_at))
            .cloned()
            .collect())
    }
}

/// Convenience for tests that register users directly.
pub fn user(id: i64, username: Option<&str>) -> User {
    User {
        id: UserId(id),
        username: username.map(|s| s.to_string()),
        joined_at: chrono::Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn sale_at(ts: chrono::DateTime<Utc>, amount: f64) -> Sale {
        Sale {
            amount,
            profit: 0.0,
            customer_ref: "c".to_string(),
            recorded_at: ts,
            expiry: None,
        }
    }

    #[tokio::test]
    async fn insert_if_absent_is_idempotent() {
        let store = MemoryStore::new();
        assert!(store.insert_if_absent(&user(1, Some("a"))).await.unwrap());
        assert!(!store.insert_if_absent(&user(1, Some("a"))).await.unwrap());
        assert_eq!(store.user_count().await, 1);
    }

    #[tokio::test]
    async fn enumeration_preserves_insertion_order() {
        let store = MemoryStore::new();
        for id in [3, 1, 2] {
            store.insert_if_absent(&user(id, None)).await.unwrap();
        }
        let ids: Vec<i64> = store
            .all_users()
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.id.0)
            .collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[tokio::test]
    async fn sales_in_filters_by_window() {
        let store = MemoryStore::new();
        let t1 = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
        let t2 = Utc.with_ymd_and_hms(2026, 1, 2, 12, 0, 0).unwrap();
        store.insert_sale(&sale_at(t1, 10.0)).await.unwrap();
        store.insert_sale(&sale_at(t2, 20.0)).await.unwrap();

        let window = ReportWindow {
            start: Some(Utc.with_ymd_and_hms(2026, 1, 2, 0, 0, 0).unwrap()),
            end: None,
        };
        let hits = store.sales_in(window).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].amount, 20.0);
    }
}
