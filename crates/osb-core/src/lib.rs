//! Core domain + application logic for the OTT sales bot.
//!
//! This crate is intentionally framework-agnostic. Telegram / SQLite live
//! behind ports (traits) implemented in adapter crates.

pub mod auth;
pub mod config;
pub mod dispatch;
pub mod domain;
pub mod errors;
pub mod logging;
pub mod onboarding;
pub mod report;
pub mod sales;
pub mod scheduler;
pub mod store;

pub use errors::{Error, Result};
