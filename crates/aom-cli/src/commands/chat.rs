//! Chat command implementation

use anyhow::Result;
use aom_core::config::AppConfig;
use aom_core::db::Database;
use aom_core::ChatEngine;
use aom_server::line;
use chrono::Utc;

/// Run one message through the chat engine and print the rendered reply
pub fn cmd_say(db: &Database, config: AppConfig, user_id: &str, text: &str) -> Result<()> {
    let engine = ChatEngine::new(db.clone(), config);

    match engine.handle_text(user_id, text, Utc::now())? {
        Some(intent) => {
            let messages = line::render(&intent);
            println!("{}", line::to_plain_text(&messages));
        }
        None => println!("(no reply)"),
    }

    Ok(())
}
