//! Category operations and the default seed

use rusqlite::{params, Connection, OptionalExtension};

use super::Database;
use crate::error::{Error, Result};
use crate::models::{Category, NewCategory, TransactionKind};

/// Categories every new wallet starts with, in storage order
pub const DEFAULT_CATEGORIES: &[(&str, &str, TransactionKind)] = &[
    ("อาหาร", "🍜", TransactionKind::Expense),
    ("เดินทาง", "🚕", TransactionKind::Expense),
    ("ช้อปปิ้ง", "🛍️", TransactionKind::Expense),
    ("ที่พัก", "🏠", TransactionKind::Expense),
    ("ค่าน้ำค่าไฟ", "💡", TransactionKind::Expense),
    ("สุขภาพ", "💊", TransactionKind::Expense),
    ("บันเทิง", "🎬", TransactionKind::Expense),
    ("การศึกษา", "📚", TransactionKind::Expense),
    ("อื่นๆ", "📦", TransactionKind::Expense),
    ("เงินเดือน", "💰", TransactionKind::Income),
    ("โบนัส", "🎁", TransactionKind::Income),
    ("ขายของ", "🏪", TransactionKind::Income),
    ("รายได้อื่นๆ", "💵", TransactionKind::Income),
];

const CATEGORY_COLUMNS: &str = "id, group_id, name, icon, kind, budget_limit, alert_percent";

fn row_to_category(row: &rusqlite::Row) -> rusqlite::Result<Category> {
    let kind: String = row.get(4)?;
    Ok(Category {
        id: row.get(0)?,
        group_id: row.get(1)?,
        name: row.get(2)?,
        icon: row.get(3)?,
        kind: kind.parse().unwrap_or(TransactionKind::Expense),
        budget_limit: row.get(5)?,
        alert_percent: row.get(6)?,
    })
}

/// Insert the default categories for a freshly created wallet
pub(crate) fn seed_categories_on(conn: &Connection, group_id: i64) -> Result<()> {
    let mut stmt =
        conn.prepare("INSERT INTO categories (group_id, name, icon, kind) VALUES (?, ?, ?, ?)")?;
    for (name, icon, kind) in DEFAULT_CATEGORIES {
        stmt.execute(params![group_id, name, icon, kind.as_str()])?;
    }
    Ok(())
}

impl Database {
    /// List a wallet's categories in storage order, optionally of one kind
    pub fn list_categories(
        &self,
        group_id: i64,
        kind: Option<TransactionKind>,
    ) -> Result<Vec<Category>> {
        let conn = self.conn()?;
        let categories = match kind {
            Some(kind) => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM categories WHERE group_id = ? AND kind = ? ORDER BY id",
                    CATEGORY_COLUMNS
                ))?;
                let rows = stmt.query_map(params![group_id, kind.as_str()], row_to_category)?;
                rows.collect::<rusqlite::Result<Vec<_>>>()?
            }
            None => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM categories WHERE group_id = ? ORDER BY id",
                    CATEGORY_COLUMNS
                ))?;
                let rows = stmt.query_map(params![group_id], row_to_category)?;
                rows.collect::<rusqlite::Result<Vec<_>>>()?
            }
        };
        Ok(categories)
    }

    /// Get a category by id
    pub fn get_category(&self, id: i64) -> Result<Option<Category>> {
        let conn = self.conn()?;
        let category = conn
            .query_row(
                &format!("SELECT {} FROM categories WHERE id = ?", CATEGORY_COLUMNS),
                params![id],
                row_to_category,
            )
            .optional()?;
        Ok(category)
    }

    /// Find a category by name, case-insensitive; first in storage order wins
    ///
    /// Expense categories are preferred when an income category shares the name.
    pub fn find_category_by_name(&self, group_id: i64, name: &str) -> Result<Option<Category>> {
        let wanted = name.trim().to_lowercase();
        let categories = self.list_categories(group_id, None)?;
        let mut matches = categories
            .into_iter()
            .filter(|c| c.name.to_lowercase() == wanted);
        let first = matches.next();
        if let Some(ref c) = first {
            if c.kind == TransactionKind::Income {
                if let Some(expense) = matches.find(|c| c.kind == TransactionKind::Expense) {
                    return Ok(Some(expense));
                }
            }
        }
        Ok(first)
    }

    /// Create a category in a wallet
    pub fn create_category(&self, group_id: i64, new: &NewCategory) -> Result<Category> {
        let name = new.name.trim();
        if name.is_empty() {
            return Err(Error::InvalidData("category name is empty".to_string()));
        }

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO categories (group_id, name, icon, kind, budget_limit, alert_percent) VALUES (?, ?, ?, ?, ?, ?)",
            params![
                group_id,
                name,
                new.icon,
                new.kind.as_str(),
                new.budget_limit,
                new.alert_percent
            ],
        )?;
        let id = conn.last_insert_rowid();
        drop(conn);

        self.get_category(id)?
            .ok_or_else(|| Error::NotFound(format!("category {}", id)))
    }

    /// Delete a category; transactions keep their (now dangling) reference
    pub fn delete_category(&self, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM categories WHERE id = ?", params![id])?;
        Ok(deleted > 0)
    }

    /// Set a category's monthly budget and optional alert threshold
    pub fn set_category_budget(
        &self,
        id: i64,
        limit: Option<f64>,
        alert_percent: Option<f64>,
    ) -> Result<Category> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE categories SET budget_limit = ?, alert_percent = COALESCE(?, alert_percent) WHERE id = ?",
            params![limit, alert_percent, id],
        )?;
        drop(conn);

        if updated == 0 {
            return Err(Error::NotFound(format!("category {}", id)));
        }
        self.get_category(id)?
            .ok_or_else(|| Error::NotFound(format!("category {}", id)))
    }
}
