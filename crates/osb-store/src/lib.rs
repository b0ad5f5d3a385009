//! SQLite adapter for the registry and ledger ports.
//!
//! A single connection behind an async mutex is plenty for this workload:
//! every query is a point read/write, and callers never hold the lock across
//! an await on anything but the query itself.

use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use tokio::sync::Mutex;

use osb_core::{
    domain::{ReportWindow, Sale, User, UserId},
    store::{SalesLedger, UserRegistry},
    Error, Result,
};

const BUSY_TIMEOUT_MS: u64 = 5_000;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS users (
    user_id    INTEGER PRIMARY KEY,
    username   TEXT,
    joined_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS sales (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    amount       REAL NOT NULL,
    profit       REAL NOT NULL,
    customer_ref TEXT NOT NULL,
    recorded_at  TEXT NOT NULL,
    expiry       TEXT
);

CREATE INDEX IF NOT EXISTS idx_sales_recorded_at ON sales(recorded_at);
";

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(map_err)?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(map_err)?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        // foreign_keys and busy_timeout are per-connection settings.
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(map_err)?;
        conn.busy_timeout(std::time::Duration::from_millis(BUSY_TIMEOUT_MS))
            .map_err(map_err)?;
        conn.execute_batch(SCHEMA).map_err(map_err)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

fn map_err(e: rusqlite::Error) -> Error {
    Error::Storage(format!("sqlite error: {e}"))
}

fn parse_ts(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Storage(format!("bad timestamp {raw:?}: {e}")))
}

#[async_trait]
impl UserRegistry for SqliteStore {
    async fn insert_if_absent(&self, user: &User) -> Result<bool> {
        let conn = self.conn.lock().await;
        // The primary key makes this an atomic conditional insert: two
        // concurrent first contacts cannot both observe "newly created".
        let changed = conn
            .execute(
                "INSERT OR IGNORE INTO users (user_id, username, joined_at) VALUES (?1, ?2, ?3)",
                params![user.id.0, user.username, user.joined_at.to_rfc3339()],
            )
            .map_err(map_err)?;
        Ok(changed > 0)
    }

    async fn all_users(&self) -> Result<Vec<User>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn
            .prepare("SELECT user_id, username, joined_at FROM users ORDER BY rowid")
            .map_err(map_err)?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, Option<String>>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })
            .map_err(map_err)?;

        let mut users = Vec::new();
        for row in rows {
            let (id, username, joined_at) = row.map_err(map_err)?;
            users.push(User {
                id: UserId(id),
                username,
                joined_at: parse_ts(&joined_at)?,
            });
        }
        Ok(users)
    }
}

#[async_trait]
impl SalesLedger for SqliteStore {
    async fn insert_sale(&self, sale: &Sale) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO sales (amount, profit, customer_ref, recorded_at, expiry)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                sale.amount,
                sale.profit,
                sale.customer_ref,
                sale.recorded_at.to_rfc3339(),
                sale.expiry.map(|dt| dt.to_rfc3339()),
            ],
        )
        .map_err(map_err)?;
        Ok(())
    }

    async fn sales_in(&self, window: ReportWindow) -> Result<Vec<Sale>> {
        let conn = self.conn.lock().await;

        // RFC3339 UTC timestamps compare correctly as text, so the half-open
        // range filter works directly on the stored strings.
        let mut sql = String::from(
            "SELECT amount, profit, customer_ref, recorded_at, expiry FROM sales WHERE 1=1",
        );
        let mut args: Vec<String> = Vec::new();
        if let Some(start) = window.start {
            sql.push_str(&format!(" AND recorded_at >= ?{}", args.len() + 1));
            args.push(start.to_rfc3339());
        }
        if let Some(end) = window.end {
            sql.push_str(&format!(" AND recorded_at < ?{}", args.len() + 1));
            args.push(end.to_rfc3339());
        }
        sql.push_str(" ORDER BY rowid");

        let mut stmt = conn.prepare(&sql).map_err(map_err)?;
        let rows = stmt
            .query_map(rusqlite::params_from_iter(args.iter()), |row| {
                Ok((
                    row.get::<_, f64>(0)?,
                    row.get::<_, f64>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, Option<String>>(4)?,
                ))
            })
            .map_err(map_err)?;

        let mut sales = Vec::new();
        for row in rows {
            let (amount, profit, customer_ref, recorded_at, expiry) = row.map_err(map_err)?;
            sales.push(Sale {
                amount,
                profit,
                customer_ref,
                recorded_at: parse_ts(&recorded_at)?,
                expiry: expiry.as_deref().map(parse_ts).transpose()?,
            });
        }
        Ok(sales)
    }
}
