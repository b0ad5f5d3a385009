use chrono::{DateTime, Datelike, TimeZone, Utc};

/// Telegram user id (numeric). For direct messages this doubles as the chat
/// id, so notifications address recipients by `UserId` directly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UserId(pub i64);

/// A registered recipient. Created exactly once on first `/start`; never
/// updated or deleted by the core.
#[derive(Clone, Debug, PartialEq)]
pub struct User {
    pub id: UserId,
    pub username: Option<String>,
    pub joined_at: DateTime<Utc>,
}

/// One completed transaction. Immutable once written (append-only ledger).
#[derive(Clone, Debug, PartialEq)]
pub struct Sale {
    pub amount: f64,
    pub profit: f64,
    pub customer_ref: String,
    pub recorded_at: DateTime<Utc>,
    /// `recorded_at + duration_days` when a subscription term was given.
    pub expiry: Option<DateTime<Utc>>,
}

/// Half-open time window `[start, end)` bounding a ledger query. Either
/// bound may be absent (unbounded on that side).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ReportWindow {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl ReportWindow {
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Start of the current UTC calendar day up to `now`.
    pub fn utc_day_so_far(now: DateTime<Utc>) -> Self {
        let midnight = Utc
            .with_ymd_and_hms(now.year(), now.month(), now.day(), 0, 0, 0)
            .single()
            .unwrap_or(now);
        Self {
            start: Some(midnight),
            end: Some(now),
        }
    }

    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        if let Some(start) = self.start {
            if t < start {
                return false;
            }
        }
        if let Some(end) = self.end {
            if t >= end {
                return false;
            }
        }
        true
    }
}

/// Summary statistics over a ledger slice. Derived on demand, never stored.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReportSummary {
    pub count: u64,
    pub total_amount: f64,
    pub total_profit: f64,
    pub window: ReportWindow,
}

/// Outcome of a fan-out. `delivered <= attempted`; the gap is recipients
/// that failed delivery and were skipped, never retried.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BroadcastResult {
    pub attempted: usize,
    pub delivered: usize,
}
