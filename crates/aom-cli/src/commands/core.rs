//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the database
//! - `load_config` - Resolve the application config once at startup
//! - `cmd_init` - Initialize the database
//! - `cmd_config` - Print the effective configuration

use std::path::Path;

use anyhow::{Context, Result};
use aom_core::config::{default_config_path, AppConfig};
use aom_core::db::Database;
use aom_core::models::User;

/// Open database with encryption by default, or unencrypted if --no-encrypt
pub fn open_db(db_path: &Path, no_encrypt: bool) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .context("Database path must be valid UTF-8")?;
    if no_encrypt {
        Database::new_unencrypted(path_str).context("Failed to open database (unencrypted)")
    } else {
        Database::new(path_str).context("Failed to open database")
    }
}

/// Load config from an explicit path, or the default override location
pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    match path {
        Some(path) => AppConfig::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => AppConfig::load().context("Failed to load config"),
    }
}

/// Look up a chat user, pointing at `aom say` when they don't exist yet
pub fn require_user(db: &Database, user_id: &str) -> Result<User> {
    db.get_user(user_id)?.ok_or_else(|| {
        anyhow::anyhow!(
            "Unknown user '{}'. Send a first message with: aom say --user {} help",
            user_id,
            user_id
        )
    })
}

pub fn cmd_init(db_path: &Path, no_encrypt: bool) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    // Opening runs the schema migrations
    open_db(db_path, no_encrypt)?;

    if no_encrypt {
        println!("   ⚠️  Encryption: DISABLED (--no-encrypt)");
    } else {
        println!("   🔒 Encryption: ENABLED");
    }

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Try the chat engine: aom say อาหาร 150");
    println!("  2. Start the webhook server: aom serve");

    Ok(())
}

pub fn cmd_config(config: &AppConfig, explicit_path: Option<&Path>) -> Result<()> {
    let source = match explicit_path {
        Some(path) if path.exists() => path.display().to_string(),
        Some(path) => format!("{} (missing, using built-in defaults)", path.display()),
        None => match default_config_path() {
            Some(path) if path.exists() => path.display().to_string(),
            _ => "built-in defaults".to_string(),
        },
    };

    println!();
    println!("⚙️  Configuration ({})", source);
    println!("   ─────────────────────────────");
    println!("   UTC offset:            {:+} hours", config.utc_offset_hours);
    println!("   Suggestion limit:      {}", config.suggestion_limit);
    println!("   Top categories limit:  {}", config.top_categories_limit);
    println!("   Default alert:         {}%", config.default_alert_percent);
    if config.rich_menus.is_empty() {
        println!("   Rich menus:            (none)");
    } else {
        println!("   Rich menus:");
        for (role, id) in &config.rich_menus {
            println!("     {:<10} {}", role, id);
        }
    }

    Ok(())
}
