//! Storage ports.
//!
//! SQLite is the first implementation (`osb-store`); the in-memory store in
//! this module backs tests. Handles are constructed once at startup and
//! passed into services (no ambient globals).

pub mod memory;

use async_trait::async_trait;

use crate::{
    domain::{ReportWindow, Sale, User},
    Result,
};

/// Durable set of known users keyed by `UserId`.
#[async_trait]
pub trait UserRegistry: Send + Sync {
    /// Atomic conditional insert: create the user iff the id is not already
    /// registered. Returns `true` iff a new record was created. This is the
    /// only write path, so "at most one User per id, exactly one new-user
    /// notification" holds even under concurrent first contacts.
    async fn insert_if_absent(&self, user: &User) -> Result<bool>;

    /// All registered users in insertion order. Broadcast attempts follow
    /// this order.
    async fn all_users(&self) -> Result<Vec<User>>;
}

/// Durable append-only collection of sale records.
#[async_trait]
pub trait SalesLedger: Send + Sync {
    async fn insert_sale(&self, sale: &Sale) -> Result<()>;

    /// Sales with `recorded_at` inside the half-open window, oldest first.
    /// Read-only; never mutates the ledger.
    async fn sales_in(&self, window: ReportWindow) -> Result<Vec<Sale>>;
}
