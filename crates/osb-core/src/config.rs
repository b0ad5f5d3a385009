use std::{
    env, fs,
    path::{Path, PathBuf},
};

use crate::{errors::Error, Result};

/// Daily report fire time, wall-clock UTC.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FireTime {
    pub hour: u32,
    pub minute: u32,
}

impl FireTime {
    /// Parse `HH:MM` (24h).
    pub fn parse(raw: &str) -> Result<Self> {
        let Some((h, m)) = raw.trim().split_once(':') else {
            return Err(Error::Config(format!(
                "REPORT_TIME must be HH:MM, got {raw:?}"
            )));
        };
        let hour: u32 = h
            .trim()
            .parse()
            .map_err(|_| Error::Config(format!("invalid report hour: {h:?}")))?;
        let minute: u32 = m
            .trim()
            .parse()
            .map_err(|_| Error::Config(format!("invalid report minute: {m:?}")))?;
        if hour > 23 || minute > 59 {
            return Err(Error::Config(format!(
                "REPORT_TIME out of range: {hour:02}:{minute:02}"
            )));
        }
        Ok(Self { hour, minute })
    }
}

/// Typed configuration for the bot.
#[derive(Clone, Debug)]
pub struct Config {
    pub bot_token: String,
    /// The single privileged actor: may record sales, trigger ad-hoc
    /// reports, and broadcast.
    pub operator_id: i64,
    pub database_path: PathBuf,
    /// Daily report time in UTC (not process-local).
    pub report_time: FireTime,
    pub currency_symbol: String,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));

        let bot_token = env_str("BOT_TOKEN").unwrap_or_default();
        if bot_token.trim().is_empty() {
            return Err(Error::Config(
                "BOT_TOKEN environment variable is required".to_string(),
            ));
        }

        let operator_id = env_i64("ADMIN_ID").ok_or_else(|| {
            Error::Config("ADMIN_ID environment variable is required".to_string())
        })?;
        if operator_id == 0 {
            return Err(Error::Config("ADMIN_ID must be non-zero".to_string()));
        }

        let database_path =
            PathBuf::from(env_str("DATABASE_PATH").unwrap_or("ott-sales.db".to_string()));

        // 21:00 UTC mirrors the original deployment's 9 PM report.
        let report_time = FireTime::parse(&env_str("REPORT_TIME").unwrap_or("21:00".to_string()))?;

        let currency_symbol = env_str("CURRENCY_SYMBOL")
            .and_then(non_empty)
            .unwrap_or("₹".to_string());

        Ok(Self {
            bot_token,
            operator_id,
            database_path,
            report_time,
            currency_symbol,
        })
    }
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }
        if env::var_os(key).is_some() {
            continue; // do not override existing env
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        env::set_var(key, val);
    }
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn env_i64(key: &str) -> Option<i64> {
    env_str(key).and_then(|s| s.trim().parse::<i64>().ok())
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
