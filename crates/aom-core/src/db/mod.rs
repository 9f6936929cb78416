//! Database access layer with connection pooling and migrations
//!
//! This module is organized by domain:
//! - `users` - Users, first-contact bootstrap, gamification fields
//! - `groups` - Personal and family wallets, membership, invite codes
//! - `categories` - Per-wallet categories, default seed, budgets
//! - `transactions` - Transaction inserts, listing, deletion
//! - `goals` - Savings goals
//! - `journals` - Daily mood journals
//! - `reports` - Month/day/category aggregates and recurring bills

use chrono::{DateTime, NaiveDate, Utc};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use tracing::info;

use crate::error::{Error, Result};

mod categories;
mod goals;
mod groups;
mod journals;
mod reports;
mod transactions;
mod users;

pub use categories::DEFAULT_CATEGORIES;
pub use groups::{generate_invite_code, INVITE_CODE_LEN};
pub use journals::JournalUpdate;
pub use reports::UNCATEGORIZED_NAME;

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConn = PooledConnection<SqliteConnectionManager>;

/// Environment variable for database encryption key
pub const DB_KEY_ENV: &str = "AOM_DB_KEY";

/// Timestamp format used for every DATETIME column
pub(crate) const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Derive an encryption key from a passphrase using Argon2
///
/// Uses a fixed application salt so the same passphrase always produces the same key,
/// regardless of database path.
fn derive_key(passphrase: &str) -> Result<String> {
    use argon2::{password_hash::SaltString, Argon2, PasswordHasher};

    // Changing this invalidates all existing encrypted databases
    const APP_SALT: &[u8; 16] = b"aom-ledger-salt1";

    let salt = SaltString::encode_b64(APP_SALT)
        .map_err(|e| Error::Encryption(format!("Failed to create salt: {}", e)))?;

    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(passphrase.as_bytes(), &salt)
        .map_err(|e| Error::Encryption(format!("Failed to derive key: {}", e)))?;

    let hash_str = hash
        .hash
        .ok_or_else(|| Error::Encryption("No hash output".to_string()))?;
    Ok(hex::encode(hash_str.as_bytes()))
}

/// Parse a stored datetime string into a DateTime<Utc>
pub(crate) fn parse_datetime(s: &str) -> DateTime<Utc> {
    chrono::NaiveDateTime::parse_from_str(s, DATETIME_FORMAT)
        .map(|dt| dt.and_utc())
        .unwrap_or_else(|_| Utc::now())
}

pub(crate) fn format_datetime(dt: DateTime<Utc>) -> String {
    dt.format(DATETIME_FORMAT).to_string()
}

pub(crate) fn parse_day(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// Database wrapper with connection pooling
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
    /// Path to the database file
    db_path: String,
}

impl Database {
    /// Create a new database connection pool with encryption
    ///
    /// Requires `AOM_DB_KEY` environment variable to be set. Use
    /// `new_unencrypted()` for development/testing without encryption.
    pub fn new(path: &str) -> Result<Self> {
        match std::env::var(DB_KEY_ENV).ok() {
            Some(key) => Self::new_with_key(path, Some(&key)),
            None => Err(Error::Encryption(format!(
                "Database encryption required. Set {} environment variable with your passphrase, \
                or use --no-encrypt for unencrypted databases (not recommended for production).",
                DB_KEY_ENV
            ))),
        }
    }

    /// Create a new unencrypted database connection pool
    pub fn new_unencrypted(path: &str) -> Result<Self> {
        Self::new_with_key(path, None)
    }

    /// Create a new database with an explicit encryption key
    pub fn new_with_key(path: &str, passphrase: Option<&str>) -> Result<Self> {
        let manager = SqliteConnectionManager::file(path);

        let pool = if let Some(pass) = passphrase {
            let key = derive_key(pass)?;
            let key_pragma = format!("PRAGMA key = 'x\"{}\"';", key);

            let manager = manager.with_init(move |conn| {
                conn.execute_batch(&key_pragma)?;
                conn.execute_batch("PRAGMA foreign_keys = ON;")?;
                Ok(())
            });

            Pool::builder().max_size(10).build(manager)?
        } else {
            let manager =
                manager.with_init(|conn| conn.execute_batch("PRAGMA foreign_keys = ON;"));
            Pool::builder().max_size(10).build(manager)?
        };

        let db = Self {
            pool,
            db_path: path.to_string(),
        };
        db.run_migrations()?;

        Ok(db)
    }

    /// Get the path to the database file
    pub fn path(&self) -> &str {
        &self.db_path
    }

    /// Create a throwaway database (for testing)
    ///
    /// Uses a temporary file rather than `:memory:` so every pooled
    /// connection sees the same data.
    pub fn in_memory() -> Result<Self> {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);

        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        let path = std::env::temp_dir().join(format!(
            "aom_test_{}_{}.db",
            std::process::id(),
            id
        ));
        let path = path.to_string_lossy().to_string();

        let _ = std::fs::remove_file(&path);

        Self::new_unencrypted(&path)
    }

    /// Check if the database is encrypted
    pub fn is_encrypted(&self) -> Result<bool> {
        let conn = self.conn()?;
        let result: rusqlite::Result<String> =
            conn.query_row("PRAGMA cipher_version;", [], |row| row.get(0));
        Ok(result.is_ok() && std::env::var(DB_KEY_ENV).is_ok())
    }

    /// Get a connection from the pool
    pub fn conn(&self) -> Result<DbConn> {
        Ok(self.pool.get()?)
    }

    /// Run database migrations
    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            PRAGMA foreign_keys = ON;
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;

            -- Users (identity comes from the messaging platform)
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                display_name TEXT NOT NULL DEFAULT '',
                picture_url TEXT,
                current_group_id INTEGER,
                personal_group_id INTEGER,
                streak INTEGER NOT NULL DEFAULT 0,
                last_record_day DATE,                      -- local calendar day
                total_saved REAL NOT NULL DEFAULT 0,
                created_at DATETIME NOT NULL
            );

            -- Wallets
            CREATE TABLE IF NOT EXISTS wallets (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                kind TEXT NOT NULL DEFAULT 'personal',     -- personal, family
                invite_code TEXT UNIQUE,                   -- family wallets only
                owner_id TEXT NOT NULL,
                created_at DATETIME NOT NULL
            );

            CREATE TABLE IF NOT EXISTS wallet_members (
                group_id INTEGER NOT NULL REFERENCES wallets(id) ON DELETE CASCADE,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                joined_at DATETIME NOT NULL,
                PRIMARY KEY (group_id, user_id)
            );

            CREATE INDEX IF NOT EXISTS idx_wallet_members_user ON wallet_members(user_id);

            -- Categories (per wallet)
            CREATE TABLE IF NOT EXISTS categories (
                id INTEGER PRIMARY KEY,
                group_id INTEGER NOT NULL REFERENCES wallets(id) ON DELETE CASCADE,
                name TEXT NOT NULL,
                icon TEXT NOT NULL DEFAULT '📦',
                kind TEXT NOT NULL,                        -- income, expense
                budget_limit REAL,
                alert_percent REAL
            );

            CREATE INDEX IF NOT EXISTS idx_categories_group_kind ON categories(group_id, kind);

            -- Transactions (category_id is not a foreign key: orphans are tolerated)
            CREATE TABLE IF NOT EXISTS transactions (
                id INTEGER PRIMARY KEY,
                group_id INTEGER NOT NULL REFERENCES wallets(id) ON DELETE CASCADE,
                user_id TEXT NOT NULL,
                category_id INTEGER,
                kind TEXT NOT NULL,
                amount REAL NOT NULL CHECK (amount > 0),
                occurred_at DATETIME NOT NULL,             -- UTC
                month TEXT NOT NULL,                       -- YYYY-MM, local offset
                note TEXT NOT NULL DEFAULT '',
                source TEXT NOT NULL DEFAULT 'chat'        -- chat, web
            );

            CREATE INDEX IF NOT EXISTS idx_transactions_group_month ON transactions(group_id, month);
            CREATE INDEX IF NOT EXISTS idx_transactions_user ON transactions(user_id, occurred_at);
            CREATE INDEX IF NOT EXISTS idx_transactions_category ON transactions(category_id);

            CREATE TABLE IF NOT EXISTS transaction_tags (
                transaction_id INTEGER NOT NULL REFERENCES transactions(id) ON DELETE CASCADE,
                tag TEXT NOT NULL,
                PRIMARY KEY (transaction_id, tag)
            );

            -- Savings goals
            CREATE TABLE IF NOT EXISTS savings_goals (
                id INTEGER PRIMARY KEY,
                group_id INTEGER NOT NULL REFERENCES wallets(id) ON DELETE CASCADE,
                user_id TEXT NOT NULL,
                name TEXT NOT NULL,
                target_amount REAL NOT NULL,
                current_amount REAL NOT NULL DEFAULT 0,
                completed BOOLEAN NOT NULL DEFAULT 0,
                created_at DATETIME NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_savings_goals_group ON savings_goals(group_id);

            -- Daily mood journals
            CREATE TABLE IF NOT EXISTS daily_journals (
                id INTEGER PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                day DATE NOT NULL,
                mood INTEGER CHECK (mood BETWEEN 1 AND 5),
                note TEXT NOT NULL DEFAULT '',
                income_total REAL NOT NULL DEFAULT 0,
                expense_total REAL NOT NULL DEFAULT 0,
                UNIQUE(user_id, day)
            );

            -- Unlocked achievements (membership set per user)
            CREATE TABLE IF NOT EXISTS user_achievements (
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                achievement TEXT NOT NULL,
                unlocked_at DATETIME NOT NULL,
                PRIMARY KEY (user_id, achievement)
            );
            "#,
        )?;

        info!("Database schema initialized");
        Ok(())
    }
}
