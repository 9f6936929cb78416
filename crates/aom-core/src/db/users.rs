//! User operations and first-contact bootstrap

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::info;

use super::categories::seed_categories_on;
use super::{format_datetime, parse_datetime, parse_day, Database};
use crate::error::{Error, Result};
use crate::models::{Achievement, GroupKind, User};

const USER_COLUMNS: &str = "id, display_name, picture_url, current_group_id, personal_group_id, \
     streak, last_record_day, total_saved, created_at";

fn row_to_user(row: &rusqlite::Row) -> rusqlite::Result<User> {
    let last_record_day: Option<String> = row.get(6)?;
    let created_at: String = row.get(8)?;
    Ok(User {
        id: row.get(0)?,
        display_name: row.get(1)?,
        picture_url: row.get(2)?,
        current_group_id: row.get::<_, Option<i64>>(3)?.unwrap_or_default(),
        personal_group_id: row.get::<_, Option<i64>>(4)?.unwrap_or_default(),
        streak: row.get(5)?,
        last_record_day: last_record_day.as_deref().and_then(parse_day),
        total_saved: row.get(7)?,
        achievements: Vec::new(),
        created_at: parse_datetime(&created_at),
    })
}

fn load_achievements(conn: &Connection, user_id: &str) -> Result<Vec<Achievement>> {
    let mut stmt = conn.prepare(
        "SELECT achievement FROM user_achievements WHERE user_id = ? ORDER BY unlocked_at, rowid",
    )?;
    let names = stmt
        .query_map(params![user_id], |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    // Unknown names come from newer versions; skip rather than fail
    Ok(names.iter().filter_map(|n| n.parse().ok()).collect())
}

impl Database {
    /// Get a user by platform id
    pub fn get_user(&self, id: &str) -> Result<Option<User>> {
        let conn = self.conn()?;
        let user = conn
            .query_row(
                &format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS),
                params![id],
                row_to_user,
            )
            .optional()?;

        match user {
            Some(mut user) => {
                user.achievements = load_achievements(&conn, &user.id)?;
                Ok(Some(user))
            }
            None => Ok(None),
        }
    }

    /// Get a user, creating it with a personal wallet and default categories on first contact
    ///
    /// Returns the user and whether it was created by this call.
    pub fn get_or_create_user(
        &self,
        id: &str,
        display_name: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<(User, bool)> {
        if let Some(user) = self.get_user(id)? {
            return Ok((user, false));
        }

        let name = display_name.unwrap_or("").trim().to_string();
        let wallet_name = if name.is_empty() {
            "กระเป๋าส่วนตัว".to_string()
        } else {
            format!("กระเป๋าของ {}", name)
        };
        let created = format_datetime(now);

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        // Another delivery may have created the user between the read and this insert
        let inserted = tx.execute(
            "INSERT OR IGNORE INTO users (id, display_name, created_at) VALUES (?, ?, ?)",
            params![id, name, created],
        )?;

        if inserted == 1 {
            tx.execute(
                "INSERT INTO wallets (name, kind, owner_id, created_at) VALUES (?, ?, ?, ?)",
                params![wallet_name, GroupKind::Personal.as_str(), id, created],
            )?;
            let group_id = tx.last_insert_rowid();

            tx.execute(
                "INSERT INTO wallet_members (group_id, user_id, joined_at) VALUES (?, ?, ?)",
                params![group_id, id, created],
            )?;
            seed_categories_on(&tx, group_id)?;

            tx.execute(
                "UPDATE users SET current_group_id = ?1, personal_group_id = ?1 WHERE id = ?2",
                params![group_id, id],
            )?;
        }
        tx.commit()?;

        if inserted == 1 {
            info!(user_id = %id, "Created user with personal wallet");
        }

        let user = self
            .get_user(id)?
            .ok_or_else(|| Error::NotFound(format!("user {}", id)))?;
        Ok((user, inserted == 1))
    }

    /// Refresh profile fields fetched from the messaging platform
    pub fn update_user_profile(
        &self,
        id: &str,
        display_name: &str,
        picture_url: Option<&str>,
    ) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "UPDATE users SET display_name = ?, picture_url = ? WHERE id = ?",
            params![display_name, picture_url, id],
        )?;
        Ok(())
    }

    /// Point the user's chat input at another wallet
    pub fn set_current_group(&self, user_id: &str, group_id: i64) -> Result<()> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE users SET current_group_id = ? WHERE id = ?",
            params![group_id, user_id],
        )?;
        if updated == 0 {
            return Err(Error::NotFound(format!("user {}", user_id)));
        }
        Ok(())
    }

    /// Persist streak fields after a qualifying record
    pub fn update_streak(&self, user_id: &str, streak: i64, last_record_day: NaiveDate) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "UPDATE users SET streak = ?, last_record_day = ? WHERE id = ?",
            params![streak, last_record_day.to_string(), user_id],
        )?;
        Ok(())
    }

    /// Unlock an achievement; returns false if it was already unlocked
    pub fn unlock_achievement(
        &self,
        user_id: &str,
        achievement: Achievement,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        let conn = self.conn()?;
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO user_achievements (user_id, achievement, unlocked_at) VALUES (?, ?, ?)",
            params![user_id, achievement.as_str(), format_datetime(now)],
        )?;
        Ok(inserted == 1)
    }

    /// Add to the user's cumulative saved amount, returning the new total
    pub fn add_total_saved(&self, user_id: &str, amount: f64) -> Result<f64> {
        let conn = self.conn()?;
        conn.execute(
            "UPDATE users SET total_saved = total_saved + ? WHERE id = ?",
            params![amount, user_id],
        )?;
        let total: f64 = conn.query_row(
            "SELECT total_saved FROM users WHERE id = ?",
            params![user_id],
            |row| row.get(0),
        )?;
        Ok(total)
    }
}
