//! Aggregation over the sales ledger.

use crate::{
    domain::{ReportSummary, ReportWindow},
    store::SalesLedger,
    Result,
};

/// Compute summary statistics over the selected ledger slice. Safe to call
/// concurrently with writes: a concurrent insert may or may not land inside
/// the window, which is acceptable (no stronger isolation required).
pub async fn summarize(ledger: &dyn SalesLedger, window: ReportWindow) -> Result<ReportSummary> {
    let sales = ledger.sales_in(window).await?;

    let mut total_amount = 0.0;
    let mut total_profit = 0.0;
    for sale in &sales {
        total_amount += sale.amount;
        total_profit += sale.profit;
    }

    Ok(ReportSummary {
        count: sales.len() as u64,
        total_amount,
        total_profit,
        window,
    })
}

/// Render the report text sent to the operator.
pub fn format_report(summary: &ReportSummary, currency: &str) -> String {
    let heading = if summary.window.start.is_some() || summary.window.end.is_some() {
        "📊 Daily Report"
    } else {
        "📊 Lifetime Report"
    };

    if summary.count == 0 {
        return format!("{heading}:\nNo sales recorded.");
    }

    format!(
        "{heading}\n\nTotal Sales: {}\nTotal Amount: {currency}{}\nTotal Profit: {currency}{}",
        summary.count,
        format_money(summary.total_amount),
        format_money(summary.total_profit),
    )
}

/// Trim trailing zeros so whole amounts print without a decimal point.
fn format_money(v: f64) -> String {
    let s = format!("{v:.2}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s.is_empty() || s == "-" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Sale;
    use crate::store::memory::MemoryStore;
    use chrono::{TimeZone, Utc};

    fn sale(amount: f64, profit: f64, ts: chrono::DateTime<Utc>) -> Sale {
        Sale {
            amount,
            profit,
            customer_ref: "c".to_string(),
            recorded_at: ts,
            expiry: None,
        }
    }

    #[tokio::test]
    async fn unbounded_summary_covers_whole_ledger() {
        let store = MemoryStore::new();
        let t = Utc.with_ymd_and_hms(2026, 5, 1, 10, 0, 0).unwrap();
        for (a, p) in [(100.0, 20.0), (50.0, -5.0), (25.5, 10.0)] {
            store.insert_sale(&sale(a, p, t)).await.unwrap();
        }

        let summary = summarize(&store, ReportWindow::unbounded()).await.unwrap();
        assert_eq!(summary.count, 3);
        assert!((summary.total_amount - 175.5).abs() < 1e-9);
        assert!((summary.total_profit - 25.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn empty_slice_yields_zeros() {
        let store = MemoryStore::new();
        let summary = summarize(&store, ReportWindow::unbounded()).await.unwrap();
        assert_eq!(summary.count, 0);
        assert_eq!(summary.total_amount, 0.0);
        assert_eq!(summary.total_profit, 0.0);
    }

    #[tokio::test]
    async fn daily_window_excludes_earlier_days() {
        let store = MemoryStore::new();
        let yesterday = Utc.with_ymd_and_hms(2026, 5, 1, 23, 0, 0).unwrap();
        let today = Utc.with_ymd_and_hms(2026, 5, 2, 9, 0, 0).unwrap();
        store.insert_sale(&sale(100.0, 10.0, yesterday)).await.unwrap();
        store.insert_sale(&sale(40.0, 8.0, today)).await.unwrap();

        let now = Utc.with_ymd_and_hms(2026, 5, 2, 12, 0, 0).unwrap();
        let summary = summarize(&store, ReportWindow::utc_day_so_far(now))
            .await
            .unwrap();
        assert_eq!(summary.count, 1);
        assert_eq!(summary.total_amount, 40.0);
    }

    #[test]
    fn report_text_for_empty_day() {
        let summary = ReportSummary {
            count: 0,
            total_amount: 0.0,
            total_profit: 0.0,
            window: ReportWindow::utc_day_so_far(Utc::now()),
        };
        assert_eq!(
            format_report(&summary, "₹"),
            "📊 Daily Report:\nNo sales recorded."
        );
    }

    #[test]
    fn report_text_with_totals() {
        let summary = ReportSummary {
            count: 2,
            total_amount: 150.0,
            total_profit: 25.5,
            window: ReportWindow::unbounded(),
        };
        let text = format_report(&summary, "₹");
        assert!(text.starts_with("📊 Lifetime Report"));
        assert!(text.contains("Total Sales: 2"));
        assert!(text.contains("Total Amount: ₹150"));
        assert!(text.contains("Total Profit: ₹25.5"));
    }
}
