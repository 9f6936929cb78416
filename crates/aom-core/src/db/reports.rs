//! Wallet reports: month and day totals, category breakdowns, budgets

use chrono::NaiveDate;
use rusqlite::params;

use super::Database;
use crate::calendar::LocalCalendar;
use crate::error::Result;
use crate::models::*;
use crate::recurring::ExpenseObservation;

/// Name shown for transactions whose category was deleted
pub const UNCATEGORIZED_NAME: &str = "ไม่มีหมวด";

impl Database {
    /// Income/expense totals for one wallet and month
    pub fn month_summary(&self, group_id: i64, month: &str) -> Result<MonthSummary> {
        let conn = self.conn()?;
        let (income, expense, count) = conn.query_row(
            r#"
            SELECT
                COALESCE(SUM(CASE WHEN kind = 'income' THEN amount END), 0),
                COALESCE(SUM(CASE WHEN kind = 'expense' THEN amount END), 0),
                COUNT(*)
            FROM transactions
            WHERE group_id = ? AND month = ?
            "#,
            params![group_id, month],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )?;

        Ok(MonthSummary {
            month: month.to_string(),
            income,
            expense,
            transaction_count: count,
        })
    }

    /// Per-category totals for one month and kind, largest first
    ///
    /// Transactions pointing at a deleted category are grouped under
    /// [`UNCATEGORIZED_NAME`].
    pub fn category_totals(
        &self,
        group_id: i64,
        month: &str,
        kind: TransactionKind,
    ) -> Result<Vec<CategoryTotal>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT c.id, c.name, c.icon, SUM(t.amount) AS total, COUNT(*)
            FROM transactions t
            LEFT JOIN categories c ON c.id = t.category_id
            WHERE t.group_id = ? AND t.month = ? AND t.kind = ?
            GROUP BY c.id
            ORDER BY total DESC, c.id
            "#,
        )?;

        let totals = stmt
            .query_map(params![group_id, month, kind.as_str()], |row| {
                let name: Option<String> = row.get(1)?;
                let icon: Option<String> = row.get(2)?;
                Ok(CategoryTotal {
                    category_id: row.get(0)?,
                    name: name.unwrap_or_else(|| UNCATEGORIZED_NAME.to_string()),
                    icon: icon.unwrap_or_else(|| "❔".to_string()),
                    kind,
                    total: row.get(3)?,
                    count: row.get(4)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(totals)
    }

    /// Amount spent in one category during a month
    pub fn category_spent(&self, category_id: i64, month: &str) -> Result<f64> {
        let conn = self.conn()?;
        let spent = conn.query_row(
            "SELECT COALESCE(SUM(amount), 0) FROM transactions \
             WHERE category_id = ? AND month = ? AND kind = 'expense'",
            params![category_id, month],
            |row| row.get(0),
        )?;
        Ok(spent)
    }

    /// Budget usage for every expense category that has a limit
    pub fn budget_statuses(
        &self,
        group_id: i64,
        month: &str,
        default_alert_percent: f64,
    ) -> Result<Vec<BudgetStatus>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT c.id, c.name, c.icon, c.budget_limit, c.alert_percent,
                   COALESCE((
                       SELECT SUM(t.amount) FROM transactions t
                       WHERE t.category_id = c.id AND t.month = ?2 AND t.kind = 'expense'
                   ), 0)
            FROM categories c
            WHERE c.group_id = ?1 AND c.kind = 'expense' AND c.budget_limit IS NOT NULL
            ORDER BY c.id
            "#,
        )?;

        let statuses = stmt
            .query_map(params![group_id, month], |row| {
                let alert: Option<f64> = row.get(4)?;
                Ok(BudgetStatus {
                    category_id: row.get(0)?,
                    name: row.get(1)?,
                    icon: row.get(2)?,
                    limit: row.get(3)?,
                    alert_percent: alert.unwrap_or(default_alert_percent),
                    spent: row.get(5)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(statuses)
    }

    /// Totals and transactions for one local day, with the user's mood if journaled
    pub fn day_summary(
        &self,
        group_id: i64,
        user_id: &str,
        day: NaiveDate,
        calendar: &LocalCalendar,
    ) -> Result<DaySummary> {
        let (from, to) = calendar.day_bounds(day);
        let transactions = self.list_transactions_between(group_id, from, to)?;

        let (income, expense) =
            transactions
                .iter()
                .fold((0.0, 0.0), |(inc, exp), tx| match tx.kind {
                    TransactionKind::Income => (inc + tx.amount, exp),
                    TransactionKind::Expense => (inc, exp + tx.amount),
                });
        let mood = self.get_journal(user_id, day)?.and_then(|j| j.mood);

        Ok(DaySummary {
            day,
            income,
            expense,
            transactions,
            mood,
        })
    }

    /// Lifetime counters for a user across all wallets
    pub fn user_stats(&self, user: &User, utc_offset_hours: i32) -> Result<UserStats> {
        let conn = self.conn()?;
        let shift = format!("{:+} hours", utc_offset_hours);
        let (transaction_count, days_recorded) = conn.query_row(
            "SELECT COUNT(*), COUNT(DISTINCT date(occurred_at, ?)) FROM transactions WHERE user_id = ?",
            params![shift, user.id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        Ok(UserStats {
            streak: user.streak,
            transaction_count,
            days_recorded,
            total_saved: user.total_saved,
            achievement_count: user.achievements.len(),
        })
    }

    /// Expense rows in the given months, for recurring bill detection
    pub fn expense_observations(
        &self,
        group_id: i64,
        months: &[String],
    ) -> Result<Vec<ExpenseObservation>> {
        if months.is_empty() {
            return Ok(Vec::new());
        }

        let conn = self.conn()?;
        let placeholders = vec!["?"; months.len()].join(", ");
        let sql = format!(
            r#"
            SELECT t.month, COALESCE(c.name, ?), t.note, t.amount
            FROM transactions t
            LEFT JOIN categories c ON c.id = t.category_id
            WHERE t.group_id = ? AND t.kind = 'expense' AND t.month IN ({})
            ORDER BY t.occurred_at, t.id
            "#,
            placeholders
        );

        let mut bound: Vec<&dyn rusqlite::ToSql> = vec![&UNCATEGORIZED_NAME, &group_id];
        bound.extend(months.iter().map(|m| m as &dyn rusqlite::ToSql));

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(bound.as_slice(), |row| {
                Ok(ExpenseObservation {
                    month: row.get(0)?,
                    category_name: row.get(1)?,
                    note: row.get(2)?,
                    amount: row.get(3)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }
}
