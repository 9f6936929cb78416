//! Transaction command implementations

use anyhow::Result;
use aom_core::config::AppConfig;
use aom_core::db::Database;
use aom_core::models::TransactionKind;

use super::{require_user, resolve_month, truncate};

pub fn cmd_transactions_list(
    db: &Database,
    config: &AppConfig,
    user_id: &str,
    month: Option<&str>,
    limit: i64,
) -> Result<()> {
    let user = require_user(db, user_id)?;
    let month = resolve_month(config, month)?;
    let transactions = db.list_transactions(user.current_group_id, Some(&month), limit, 0)?;

    if transactions.is_empty() {
        println!("No transactions in {}. Record one with:", month);
        println!("  aom say --user {} อาหาร 150", user_id);
        return Ok(());
    }

    let offset = config.offset();
    let names: std::collections::HashMap<i64, String> = db
        .list_categories(user.current_group_id, None)?
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect();

    println!();
    println!("📝 Transactions for {}", month);
    println!("   ─────────────────────────────────────────────────────────────");

    for tx in transactions {
        let amount_str = match tx.kind {
            TransactionKind::Expense => format!("\x1b[31m-{:.2}\x1b[0m", tx.amount), // Red for expenses
            TransactionKind::Income => format!("\x1b[32m+{:.2}\x1b[0m", tx.amount), // Green for income
        };
        let category = tx
            .category_id
            .and_then(|id| names.get(&id))
            .map(String::as_str)
            .unwrap_or("-");

        println!(
            "   [{}] {} │ {:>10} │ {:<14} │ {}",
            tx.id,
            tx.occurred_at.with_timezone(&offset).format("%Y-%m-%d %H:%M"),
            amount_str,
            truncate(category, 14),
            truncate(&tx.note, 30)
        );
    }

    Ok(())
}

pub fn cmd_transactions_delete(db: &Database, id: i64) -> Result<()> {
    // Verify transaction exists
    let tx = db
        .get_transaction(id)?
        .ok_or_else(|| anyhow::anyhow!("Transaction {} not found", id))?;

    db.delete_transaction(id)?;

    println!("✅ Deleted transaction {}:", id);
    println!(
        "   {} │ {:.2} │ {}",
        tx.kind,
        tx.amount,
        truncate(&tx.note, 40)
    );

    Ok(())
}
