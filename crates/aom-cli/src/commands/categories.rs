//! Category command implementations

use anyhow::{Context, Result};
use aom_core::db::Database;
use aom_core::models::{NewCategory, TransactionKind};

use super::require_user;

pub fn cmd_categories_list(db: &Database, user_id: &str) -> Result<()> {
    let user = require_user(db, user_id)?;
    let categories = db.list_categories(user.current_group_id, None)?;

    println!();
    println!("🗂️  Categories");
    println!("   ─────────────────────────────");

    for kind in [TransactionKind::Expense, TransactionKind::Income] {
        println!("   {}", kind);
        for category in categories.iter().filter(|c| c.kind == kind) {
            match category.budget_limit {
                Some(limit) => println!(
                    "   [{}] {} {} (budget {:.2})",
                    category.id, category.icon, category.name, limit
                ),
                None => println!("   [{}] {} {}", category.id, category.icon, category.name),
            }
        }
    }

    Ok(())
}

pub fn cmd_categories_add(
    db: &Database,
    user_id: &str,
    name: &str,
    kind: &str,
    icon: &str,
) -> Result<()> {
    let user = require_user(db, user_id)?;
    let kind: TransactionKind = kind.parse().map_err(|e: String| anyhow::anyhow!(e))?;

    let category = db
        .create_category(
            user.current_group_id,
            &NewCategory {
                name: name.to_string(),
                icon: icon.to_string(),
                kind,
                budget_limit: None,
                alert_percent: None,
            },
        )
        .context("Failed to create category")?;

    println!(
        "✅ Added {} category {} {} [{}]",
        category.kind, category.icon, category.name, category.id
    );
    Ok(())
}
