//! Daily report scheduler.
//!
//! One background task computes the exact duration to the next fire time
//! (UTC wall clock) and sleeps until then; no short-interval polling. Fires
//! missed while the process was down are not backfilled: the next fire is
//! simply the next scheduled occurrence.

use std::{sync::Arc, time::Duration};

use chrono::{DateTime, TimeZone, Utc};
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::{
    config::FireTime,
    dispatch::Dispatcher,
    domain::{ReportWindow, UserId},
    report::{format_report, summarize},
    store::SalesLedger,
    Result,
};

#[derive(Clone)]
pub struct DailyReportScheduler {
    inner: Arc<SchedulerInner>,
}

struct SchedulerInner {
    fire_time: FireTime,
    currency: String,
    operator: UserId,
    ledger: Arc<dyn SalesLedger>,
    dispatcher: Arc<Dispatcher>,
    state: tokio::sync::Mutex<SchedulerState>,
}

#[derive(Default)]
struct SchedulerState {
    task: Option<JoinHandle<()>>,
    cancel: Option<CancellationToken>,
}

impl DailyReportScheduler {
    pub fn new(
        fire_time: FireTime,
        currency: String,
        operator: UserId,
        ledger: Arc<dyn SalesLedger>,
        dispatcher: Arc<Dispatcher>,
    ) -> Self {
        Self {
            inner: Arc::new(SchedulerInner {
                fire_time,
                currency,
                operator,
                ledger,
                dispatcher,
                state: tokio::sync::Mutex::new(SchedulerState::default()),
            }),
        }
    }

    /// Spawn the timer task. Idempotent: a second call replaces the
    /// previous task.
    pub async fn start(&self) {
        self.stop().await;

        let cancel = CancellationToken::new();
        let scheduler = self.clone();
        let tok = cancel.clone();
        let handle = tokio::spawn(async move {
            scheduler.timer_loop(tok).await;
        });

        let mut st = self.inner.state.lock().await;
        st.task = Some(handle);
        st.cancel = Some(cancel);

        println!(
            "[REPORT] Daily report scheduled for {:02}:{:02} UTC",
            self.inner.fire_time.hour, self.inner.fire_time.minute
        );
    }

    pub async fn stop(&self) {
        let mut st = self.inner.state.lock().await;
        if let Some(tok) = st.cancel.take() {
            tok.cancel();
        }
        if let Some(task) = st.task.take() {
            task.abort(); // best-effort
        }
    }

    /// Operator-triggered out-of-band fire (`/report`). Runs the same
    /// summarize+dispatch path without touching the schedule's next fire.
    pub async fn fire_now(&self, window: ReportWindow) -> Result<()> {
        let summary = summarize(self.inner.ledger.as_ref(), window).await?;
        let text = format_report(&summary, &self.inner.currency);
        self.inner
            .dispatcher
            .notify_one(self.inner.operator, &text)
            .await
    }

    async fn timer_loop(&self, cancel: CancellationToken) {
        loop {
            let now = Utc::now();
            let next = next_fire_after(now, self.inner.fire_time);
            let dur = (next - now).to_std().unwrap_or(Duration::from_secs(0));

            tokio::select! {
              _ = cancel.cancelled() => break,
              _ = sleep(dur) => {
                // A storage or delivery failure is terminal for this fire
                // only; the loop continues to the next day.
                let window = ReportWindow::utc_day_so_far(Utc::now());
                if let Err(e) = self.fire_now(window).await {
                  eprintln!("[REPORT] Daily report failed: {e}");
                } else {
                  println!("[REPORT] Daily report sent");
                }
              }
            }
        }
    }
}

/// Next occurrence of `fire_time` strictly after `now`: today if the time is
/// still ahead, otherwise tomorrow.
pub fn next_fire_after(now: DateTime<Utc>, fire_time: FireTime) -> DateTime<Utc> {
    // The fire time is validated at config load, so and_hms_opt cannot miss;
    // fall back to `now` rather than panic if it ever does.
    let candidate = now
        .date_naive()
        .and_hms_opt(fire_time.hour, fire_time.minute, 0)
        .map(|ndt| Utc.from_utc_datetime(&ndt))
        .unwrap_or(now);

    if candidate > now {
        candidate
    } else {
        candidate + chrono::Duration::days(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::test_support::FakeNotifier;
    use crate::domain::Sale;
    use crate::store::memory::MemoryStore;

    #[test]
    fn next_fire_is_today_when_time_is_ahead() {
        let now = Utc.with_ymd_and_hms(2026, 4, 10, 8, 0, 0).unwrap();
        let next = next_fire_after(now, FireTime { hour: 21, minute: 0 });
        assert_eq!(next, Utc.with_ymd_and_hms(2026, 4, 10, 21, 0, 0).unwrap());
    }

    #[test]
    fn next_fire_rolls_to_tomorrow_when_time_has_passed() {
        let now = Utc.with_ymd_and_hms(2026, 4, 10, 21, 0, 0).unwrap();
        let next = next_fire_after(now, FireTime { hour: 21, minute: 0 });
        assert_eq!(next, Utc.with_ymd_and_hms(2026, 4, 11, 21, 0, 0).unwrap());
    }

    #[test]
    fn next_fire_crosses_month_boundary() {
        let now = Utc.with_ymd_and_hms(2026, 4, 30, 23, 59, 0).unwrap();
        let next = next_fire_after(now, FireTime { hour: 9, minute: 30 });
        assert_eq!(next, Utc.with_ymd_and_hms(2026, 5, 1, 9, 30, 0).unwrap());
    }

    #[tokio::test]
    async fn fire_now_sends_summary_to_operator() {
        let store = Arc::new(MemoryStore::new());
        store
            .insert_sale(&Sale {
                amount: 100.0,
                profit: 20.0,
                customer_ref: "alice".to_string(),
                recorded_at: Utc::now(),
                expiry: None,
            })
            .await
            .unwrap();

        let notifier = Arc::new(FakeNotifier::default());
        let scheduler = DailyReportScheduler::new(
            FireTime { hour: 21, minute: 0 },
            "₹".to_string(),
            UserId(999),
            store,
            Arc::new(Dispatcher::new(notifier.clone())),
        );

        scheduler
            .fire_now(ReportWindow::utc_day_so_far(Utc::now()))
            .await
            .unwrap();

        let sent = notifier.sent.lock().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, 999);
        assert!(sent[0].1.contains("Total Sales: 1"));
        assert!(sent[0].1.contains("Total Amount: ₹100"));
        assert!(sent[0].1.contains("Total Profit: ₹20"));
    }

    #[tokio::test]
    async fn fire_now_surfaces_delivery_error() {
        let store = Arc::new(MemoryStore::new());
        let notifier = Arc::new(FakeNotifier::failing_for(&[999]));
        let scheduler = DailyReportScheduler::new(
            FireTime { hour: 21, minute: 0 },
            "₹".to_string(),
            UserId(999),
            store,
            Arc::new(Dispatcher::new(notifier)),
        );

        let err = scheduler
            .fire_now(ReportWindow::unbounded())
            .await
            .unwrap_err();
        assert!(matches!(err, crate::Error::Delivery(_)));
    }
}
