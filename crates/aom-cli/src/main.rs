//! Aom CLI - chat-first expense ledger
//!
//! Usage:
//!   aom init                     Initialize database
//!   aom say อาหาร 150            Run one chat message locally
//!   aom summary --user U123      Month summary for a user's wallet
//!   aom serve --port 3000        Start webhook and API server

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db, cli.no_encrypt),
        Commands::Serve {
            port,
            host,
            no_auth,
            static_dir,
        } => {
            commands::cmd_serve(
                &cli.db,
                config,
                &host,
                port,
                no_auth,
                cli.no_encrypt,
                static_dir.as_deref(),
            )
            .await
        }
        Commands::Say { user, text } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_say(&db, config, &user, &text.join(" "))
        }
        Commands::Summary { user, month } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_summary(&db, &config, &user, month.as_deref())
        }
        Commands::Categories { user, action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                None => commands::cmd_categories_list(&db, &user),
                Some(CategoriesAction::Add { name, kind, icon }) => {
                    commands::cmd_categories_add(&db, &user, &name, &kind, &icon)
                }
            }
        }
        Commands::Transactions { user, action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                None => commands::cmd_transactions_list(&db, &config, &user, None, 20),
                Some(TransactionsAction::List { month, limit }) => {
                    commands::cmd_transactions_list(&db, &config, &user, month.as_deref(), limit)
                }
                Some(TransactionsAction::Delete { id }) => {
                    commands::cmd_transactions_delete(&db, id)
                }
            }
        }
        Commands::Config => commands::cmd_config(&config, cli.config.as_deref()),
    }
}
