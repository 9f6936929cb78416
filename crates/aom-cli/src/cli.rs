//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Aom - chat-first expense ledger
#[derive(Parser)]
#[command(name = "aom")]
#[command(about = "Chat-first personal and family expense ledger", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "aom.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable database encryption (not recommended for production)
    ///
    /// By default, the database is encrypted using SQLCipher.
    /// Set AOM_DB_KEY environment variable with your passphrase.
    /// Use --no-encrypt only for development or testing.
    #[arg(long, global = true)]
    pub no_encrypt: bool,

    /// Config file (defaults to ~/.local/share/aom/config.toml, then built-in defaults)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Start the webhook and API server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Disable API key authentication (for local development only)
        #[arg(long)]
        no_auth: bool,

        /// Directory with the built web UI to serve
        #[arg(long = "static")]
        static_dir: Option<PathBuf>,
    },

    /// Send one chat message through the engine and print the reply
    Say {
        /// Chat user id
        #[arg(short, long, default_value = "cli")]
        user: String,

        /// Message text, e.g. `aom say อาหาร 150`
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        text: Vec<String>,
    },

    /// Show a month summary for a user's current wallet
    Summary {
        /// Chat user id
        #[arg(short, long, default_value = "cli")]
        user: String,

        /// Month (YYYY-MM); defaults to the current month
        #[arg(short, long)]
        month: Option<String>,
    },

    /// List or add categories in a user's current wallet
    Categories {
        /// Chat user id
        #[arg(short, long, default_value = "cli")]
        user: String,

        #[command(subcommand)]
        action: Option<CategoriesAction>,
    },

    /// List or delete transactions in a user's current wallet
    Transactions {
        /// Chat user id
        #[arg(short, long, default_value = "cli")]
        user: String,

        #[command(subcommand)]
        action: Option<TransactionsAction>,
    },

    /// Show the effective configuration
    Config,
}

#[derive(Subcommand)]
pub enum CategoriesAction {
    /// Add a category
    Add {
        /// Category name
        name: String,

        /// income or expense
        #[arg(short, long, default_value = "expense")]
        kind: String,

        /// Icon shown in replies
        #[arg(short, long, default_value = "📦")]
        icon: String,
    },
}

#[derive(Subcommand)]
pub enum TransactionsAction {
    /// List transactions (default)
    List {
        /// Month (YYYY-MM); defaults to the current month
        #[arg(short, long)]
        month: Option<String>,

        /// Number of transactions to show
        #[arg(short, long, default_value = "20")]
        limit: i64,
    },

    /// Delete a transaction
    Delete {
        /// Transaction ID
        id: i64,
    },
}
