//! Daily mood journal operations

use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension};

use super::{parse_day, Database};
use crate::error::{Error, Result};
use crate::models::DailyJournal;

const JOURNAL_COLUMNS: &str = "id, user_id, day, mood, note, income_total, expense_total";

fn row_to_journal(row: &rusqlite::Row) -> rusqlite::Result<DailyJournal> {
    let day: String = row.get(2)?;
    Ok(DailyJournal {
        id: row.get(0)?,
        user_id: row.get(1)?,
        day: parse_day(&day).unwrap_or_default(),
        mood: row.get(3)?,
        note: row.get(4)?,
        income_total: row.get(5)?,
        expense_total: row.get(6)?,
    })
}

/// Fields to write into a journal entry; `None` keeps the stored value
#[derive(Debug, Clone, Default)]
pub struct JournalUpdate<'a> {
    pub mood: Option<u8>,
    pub note: Option<&'a str>,
    pub income_total: f64,
    pub expense_total: f64,
}

impl Database {
    /// Get the journal entry for one user and day
    pub fn get_journal(&self, user_id: &str, day: NaiveDate) -> Result<Option<DailyJournal>> {
        let conn = self.conn()?;
        let journal = conn
            .query_row(
                &format!(
                    "SELECT {} FROM daily_journals WHERE user_id = ? AND day = ?",
                    JOURNAL_COLUMNS
                ),
                params![user_id, day.to_string()],
                row_to_journal,
            )
            .optional()?;
        Ok(journal)
    }

    /// Create or update the single journal entry for (user, day)
    pub fn upsert_journal(
        &self,
        user_id: &str,
        day: NaiveDate,
        update: &JournalUpdate<'_>,
    ) -> Result<DailyJournal> {
        if let Some(mood) = update.mood {
            if !(1..=5).contains(&mood) {
                return Err(Error::InvalidData(format!("mood must be 1-5, got {}", mood)));
            }
        }

        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO daily_journals (user_id, day, mood, note, income_total, expense_total)
            VALUES (?1, ?2, ?3, COALESCE(?4, ''), ?5, ?6)
            ON CONFLICT(user_id, day) DO UPDATE SET
                mood = COALESCE(?3, mood),
                note = COALESCE(?4, note),
                income_total = ?5,
                expense_total = ?6
            "#,
            params![
                user_id,
                day.to_string(),
                update.mood,
                update.note,
                update.income_total,
                update.expense_total
            ],
        )?;
        drop(conn);

        self.get_journal(user_id, day)?
            .ok_or_else(|| Error::NotFound(format!("journal {} {}", user_id, day)))
    }

    /// List a user's journal entries in a "YYYY-MM" month
    pub fn list_journals(&self, user_id: &str, month: &str) -> Result<Vec<DailyJournal>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM daily_journals WHERE user_id = ? AND day LIKE ? ORDER BY day",
            JOURNAL_COLUMNS
        ))?;
        let journals = stmt
            .query_map(params![user_id, format!("{}-%", month)], row_to_journal)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(journals)
    }
}
