//! Report command implementations

use anyhow::Result;
use aom_core::calendar::{parse_month_key, LocalCalendar};
use aom_core::config::AppConfig;
use aom_core::db::Database;
use aom_core::models::TransactionKind;
use chrono::Utc;

use super::{require_user, truncate};

/// Validate a --month argument, defaulting to the current local month
pub fn resolve_month(config: &AppConfig, month: Option<&str>) -> Result<String> {
    match month {
        Some(m) => parse_month_key(m)
            .ok_or_else(|| anyhow::anyhow!("Invalid month: {} (use YYYY-MM)", m)),
        None => Ok(LocalCalendar::new(config.offset()).month_key(Utc::now())),
    }
}

pub fn cmd_summary(
    db: &Database,
    config: &AppConfig,
    user_id: &str,
    month: Option<&str>,
) -> Result<()> {
    let user = require_user(db, user_id)?;
    let month = resolve_month(config, month)?;
    let group_id = user.current_group_id;

    let summary = db.month_summary(group_id, &month)?;
    let expenses = db.category_totals(group_id, &month, TransactionKind::Expense)?;
    let budgets = db.budget_statuses(group_id, &month, config.default_alert_percent)?;

    println!();
    println!("📊 Summary for {}", month);
    println!("   ─────────────────────────────");
    println!("   Income:       {:>12.2}", summary.income);
    println!("   Expense:      {:>12.2}", summary.expense);
    println!("   Balance:      {:>12.2}", summary.balance());
    println!("   Transactions: {:>12}", summary.transaction_count);

    if !expenses.is_empty() {
        println!();
        println!("   By category");
        for total in &expenses {
            println!(
                "   {} {:<20} {:>12.2} ({})",
                total.icon,
                truncate(&total.name, 20),
                total.total,
                total.count
            );
        }
    }

    if !budgets.is_empty() {
        println!();
        println!("   Budgets");
        for budget in &budgets {
            let marker = if budget.is_exceeded() {
                "🔴"
            } else if budget.is_alerting() {
                "⚠️ "
            } else {
                "  "
            };
            println!(
                "   {} {:<20} {:>10.2} / {:<10.2} {:>5.0}%",
                marker,
                truncate(&budget.name, 20),
                budget.spent,
                budget.limit,
                budget.percent()
            );
        }
    }

    Ok(())
}
