//! Sale recording: argument validation and append to the ledger.

use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::{domain::Sale, errors::Error, store::SalesLedger, Result};

pub const ADDSALE_USAGE: &str = "Usage: /addsale <amount> <profit> <duration_days> <customer_ref>";

/// Validated `/addsale` arguments, not yet persisted.
#[derive(Clone, Debug, PartialEq)]
pub struct SaleArgs {
    pub amount: f64,
    pub profit: f64,
    pub duration_days: Option<u32>,
    pub customer_ref: String,
}

pub struct SalesService {
    ledger: Arc<dyn SalesLedger>,
}

impl SalesService {
    pub fn new(ledger: Arc<dyn SalesLedger>) -> Self {
        Self { ledger }
    }

    /// Parse `<amount> <profit> [duration_days] <customer_ref>`.
    ///
    /// With three tokens the third is the customer reference and no expiry
    /// is recorded. With four or more, the third must be a non-negative day
    /// count and the rest joins into the customer reference (allows
    /// free-text labels without quoting).
    pub fn parse_args(args: &str) -> Result<SaleArgs> {
        let tokens: Vec<&str> = args.split_whitespace().collect();
        if tokens.len() < 3 {
            return Err(malformed());
        }

        let amount: f64 = tokens[0].parse().map_err(|_| malformed())?;
        if !amount.is_finite() || amount < 0.0 {
            return Err(malformed());
        }

        let profit: f64 = tokens[1].parse().map_err(|_| malformed())?;
        if !profit.is_finite() {
            return Err(malformed());
        }

        let (duration_days, customer_ref) = if tokens.len() == 3 {
            (None, tokens[2].to_string())
        } else {
            // u32 parse rejects negatives and non-integers outright.
            let days: u32 = tokens[2].parse().map_err(|_| malformed())?;
            (Some(days), tokens[3..].join(" "))
        };

        let customer_ref = customer_ref.trim_matches('"').trim().to_string();
        if customer_ref.is_empty() {
            return Err(malformed());
        }

        Ok(SaleArgs {
            amount,
            profit,
            duration_days,
            customer_ref,
        })
    }

    /// Append the sale. `expiry = recorded_at + duration_days` when a
    /// subscription term was given. Returns the stored record so the caller
    /// can echo confirmation.
    pub async fn record(&self, args: SaleArgs) -> Result<Sale> {
        let recorded_at = Utc::now();
        let expiry = args
            .duration_days
            .map(|days| recorded_at + Duration::days(i64::from(days)));

        let sale = Sale {
            amount: args.amount,
            profit: args.profit,
            customer_ref: args.customer_ref,
            recorded_at,
            expiry,
        };

        self.ledger.insert_sale(&sale).await?;
        Ok(sale)
    }
}

fn malformed() -> Error {
    Error::MalformedInput {
        usage: ADDSALE_USAGE.to_string(),
    }
}
