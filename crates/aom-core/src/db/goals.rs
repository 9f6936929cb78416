//! Savings goal operations

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};

use super::{format_datetime, parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::SavingsGoal;

const GOAL_COLUMNS: &str =
    "id, group_id, user_id, name, target_amount, current_amount, completed, created_at";

fn row_to_goal(row: &rusqlite::Row) -> rusqlite::Result<SavingsGoal> {
    let created_at: String = row.get(7)?;
    Ok(SavingsGoal {
        id: row.get(0)?,
        group_id: row.get(1)?,
        user_id: row.get(2)?,
        name: row.get(3)?,
        target_amount: row.get(4)?,
        current_amount: row.get(5)?,
        completed: row.get(6)?,
        created_at: parse_datetime(&created_at),
    })
}

impl Database {
    /// Create a savings goal in a wallet
    pub fn create_goal(
        &self,
        group_id: i64,
        user_id: &str,
        name: &str,
        target_amount: f64,
        now: DateTime<Utc>,
    ) -> Result<SavingsGoal> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidData("goal name is empty".to_string()));
        }
        if !target_amount.is_finite() || target_amount <= 0.0 {
            return Err(Error::InvalidData(format!(
                "goal target must be positive, got {}",
                target_amount
            )));
        }

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO savings_goals (group_id, user_id, name, target_amount, created_at) VALUES (?, ?, ?, ?, ?)",
            params![group_id, user_id, name, target_amount, format_datetime(now)],
        )?;
        let id = conn.last_insert_rowid();
        drop(conn);

        self.get_goal(id)?
            .ok_or_else(|| Error::NotFound(format!("goal {}", id)))
    }

    /// Get a goal by id
    pub fn get_goal(&self, id: i64) -> Result<Option<SavingsGoal>> {
        let conn = self.conn()?;
        let goal = conn
            .query_row(
                &format!("SELECT {} FROM savings_goals WHERE id = ?", GOAL_COLUMNS),
                params![id],
                row_to_goal,
            )
            .optional()?;
        Ok(goal)
    }

    /// List a wallet's goals, unfinished first
    pub fn list_goals(&self, group_id: i64) -> Result<Vec<SavingsGoal>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM savings_goals WHERE group_id = ? ORDER BY completed, id",
            GOAL_COLUMNS
        ))?;
        let goals = stmt
            .query_map(params![group_id], row_to_goal)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(goals)
    }

    /// Find a goal by name: exact (case-insensitive) first, then containment
    pub fn find_goal_by_name(&self, group_id: i64, name: &str) -> Result<Option<SavingsGoal>> {
        let wanted = name.trim().to_lowercase();
        if wanted.is_empty() {
            return Ok(None);
        }
        let goals = self.list_goals(group_id)?;

        if let Some(goal) = goals.iter().find(|g| g.name.to_lowercase() == wanted) {
            return Ok(Some(goal.clone()));
        }
        Ok(goals
            .into_iter()
            .find(|g| g.name.to_lowercase().contains(&wanted)))
    }

    /// Add money to a goal, marking it completed once the target is reached
    pub fn add_to_goal(&self, id: i64, amount: f64) -> Result<SavingsGoal> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(Error::InvalidData(format!(
                "amount must be positive, got {}",
                amount
            )));
        }

        let conn = self.conn()?;
        let updated = conn.execute(
            r#"
            UPDATE savings_goals
            SET current_amount = current_amount + ?1,
                completed = (current_amount + ?1) >= target_amount
            WHERE id = ?2
            "#,
            params![amount, id],
        )?;
        drop(conn);

        if updated == 0 {
            return Err(Error::NotFound(format!("goal {}", id)));
        }
        self.get_goal(id)?
            .ok_or_else(|| Error::NotFound(format!("goal {}", id)))
    }
}
