//! Server command implementation

use std::path::Path;

use anyhow::{Context, Result};
use aom_core::config::{AppConfig, API_KEYS_ENV, CHANNEL_SECRET_ENV, CHANNEL_TOKEN_ENV};
use aom_core::ChatEngine;

use super::open_db;

pub async fn cmd_serve(
    db_path: &Path,
    config: AppConfig,
    host: &str,
    port: u16,
    no_auth: bool,
    no_encrypt: bool,
    static_dir: Option<&Path>,
) -> Result<()> {
    println!("🚀 Starting Aom server...");
    println!("   Database: {}", db_path.display());
    println!("   Listening: http://{}:{}", host, port);
    println!("   Webhook: http://{}:{}/webhook", host, port);
    if let Some(dir) = static_dir {
        println!("   Static files: {}", dir.display());
    }

    let server_config = aom_server::ServerConfig {
        require_auth: !no_auth,
        ..Default::default()
    }
    .with_env_secrets();

    if no_auth {
        println!();
        println!("   ⚠️  API authentication DISABLED - do not expose to network!");
    } else if server_config.api_keys.is_empty() {
        println!(
            "   🔒 API: no keys configured ({}), every /api request will be rejected",
            API_KEYS_ENV
        );
    } else {
        println!(
            "   🔑 API keys: {} configured ({})",
            server_config.api_keys.len(),
            API_KEYS_ENV
        );
    }
    if server_config.channel_secret.is_some() {
        println!("   ✍️  Webhook signatures: verified ({})", CHANNEL_SECRET_ENV);
    } else {
        println!("   ⚠️  Webhook signatures: NOT verified (set {})", CHANNEL_SECRET_ENV);
    }
    if server_config.channel_access_token.is_none() {
        println!("   💬 Replies: logged only (set {})", CHANNEL_TOKEN_ENV);
    }
    if no_encrypt {
        println!("   ⚠️  Encryption DISABLED (--no-encrypt)");
    }
    println!();
    println!("   Press Ctrl+C to stop");

    let db = open_db(db_path, no_encrypt)?;
    let engine = ChatEngine::new(db, config);

    let static_dir_str = static_dir
        .map(|p| p.to_str().context("Static dir path must be valid UTF-8"))
        .transpose()?;
    aom_server::serve_with_config(engine, host, port, static_dir_str, server_config).await?;

    Ok(())
}
