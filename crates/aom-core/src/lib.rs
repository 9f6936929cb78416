//! Aom Core Library
//!
//! Shared functionality for the Aom chat-first expense ledger:
//! - Database access and migrations
//! - Smart Input parsing and category resolution
//! - Command Dispatcher vocabulary
//! - Streak and achievement bookkeeping
//! - Recurring bill detection
//! - The chat engine that ties them together into response intents

pub mod calendar;
pub mod chat;
pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod gamification;
pub mod intent;
pub mod models;
pub mod recurring;
pub mod smart_input;

pub use calendar::LocalCalendar;
pub use chat::ChatEngine;
pub use commands::{parse_command, Command};
pub use config::AppConfig;
pub use db::Database;
pub use error::{Error, Result};
pub use gamification::Gamification;
pub use intent::{BudgetAlert, RecordedTransaction, ResponseIntent};
pub use recurring::{RecurringConfig, RecurringDetector};
