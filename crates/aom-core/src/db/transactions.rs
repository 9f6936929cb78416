//! Transaction operations

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use super::{format_datetime, parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{NewTransaction, Transaction, TransactionKind, TransactionSource};

pub(crate) const TRANSACTION_COLUMNS: &str =
    "t.id, t.group_id, t.user_id, t.category_id, t.kind, t.amount, t.occurred_at, t.month, t.note, t.source";

pub(crate) fn row_to_transaction(row: &rusqlite::Row) -> rusqlite::Result<Transaction> {
    let kind: String = row.get(4)?;
    let occurred_at: String = row.get(6)?;
    let source: String = row.get(9)?;
    Ok(Transaction {
        id: row.get(0)?,
        group_id: row.get(1)?,
        user_id: row.get(2)?,
        category_id: row.get(3)?,
        kind: kind.parse().unwrap_or(TransactionKind::Expense),
        amount: row.get(5)?,
        occurred_at: parse_datetime(&occurred_at),
        month: row.get(7)?,
        note: row.get(8)?,
        tags: Vec::new(),
        source: source.parse().unwrap_or(TransactionSource::Chat),
    })
}

/// Fill in tags for a batch of transactions
pub(crate) fn attach_tags(conn: &Connection, transactions: &mut [Transaction]) -> Result<()> {
    if transactions.is_empty() {
        return Ok(());
    }
    let mut stmt =
        conn.prepare("SELECT tag FROM transaction_tags WHERE transaction_id = ? ORDER BY tag")?;
    for tx in transactions.iter_mut() {
        tx.tags = stmt
            .query_map(params![tx.id], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
    }
    Ok(())
}

impl Database {
    /// Insert a transaction together with its tags
    pub fn insert_transaction(&self, new: &NewTransaction) -> Result<Transaction> {
        if !new.amount.is_finite() || new.amount <= 0.0 {
            return Err(Error::InvalidData(format!(
                "transaction amount must be positive, got {}",
                new.amount
            )));
        }

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        tx.execute(
            r#"
            INSERT INTO transactions (group_id, user_id, category_id, kind, amount, occurred_at, month, note, source)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                new.group_id,
                new.user_id,
                new.category_id,
                new.kind.as_str(),
                new.amount,
                format_datetime(new.occurred_at),
                new.month,
                new.note,
                new.source.as_str(),
            ],
        )?;
        let id = tx.last_insert_rowid();

        for tag in &new.tags {
            tx.execute(
                "INSERT OR IGNORE INTO transaction_tags (transaction_id, tag) VALUES (?, ?)",
                params![id, tag],
            )?;
        }
        tx.commit()?;
        drop(conn);

        debug!(id, group_id = new.group_id, amount = new.amount, "Inserted transaction");
        self.get_transaction(id)?
            .ok_or_else(|| Error::NotFound(format!("transaction {}", id)))
    }

    /// Get a transaction by id
    pub fn get_transaction(&self, id: i64) -> Result<Option<Transaction>> {
        let conn = self.conn()?;
        let tx = conn
            .query_row(
                &format!("SELECT {} FROM transactions t WHERE t.id = ?", TRANSACTION_COLUMNS),
                params![id],
                row_to_transaction,
            )
            .optional()?;

        match tx {
            Some(tx) => {
                let mut batch = [tx];
                attach_tags(&conn, &mut batch)?;
                let [tx] = batch;
                Ok(Some(tx))
            }
            None => Ok(None),
        }
    }

    /// List a wallet's transactions, newest first, optionally within one month
    pub fn list_transactions(
        &self,
        group_id: i64,
        month: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;
        let mut transactions = match month {
            Some(month) => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM transactions t WHERE t.group_id = ? AND t.month = ? \
                     ORDER BY t.occurred_at DESC, t.id DESC LIMIT ? OFFSET ?",
                    TRANSACTION_COLUMNS
                ))?;
                let rows =
                    stmt.query_map(params![group_id, month, limit, offset], row_to_transaction)?;
                rows.collect::<rusqlite::Result<Vec<_>>>()?
            }
            None => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM transactions t WHERE t.group_id = ? \
                     ORDER BY t.occurred_at DESC, t.id DESC LIMIT ? OFFSET ?",
                    TRANSACTION_COLUMNS
                ))?;
                let rows = stmt.query_map(params![group_id, limit, offset], row_to_transaction)?;
                rows.collect::<rusqlite::Result<Vec<_>>>()?
            }
        };
        attach_tags(&conn, &mut transactions)?;
        Ok(transactions)
    }

    /// List a wallet's transactions in a UTC time range [from, to), oldest first
    pub fn list_transactions_between(
        &self,
        group_id: i64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM transactions t WHERE t.group_id = ? AND t.occurred_at >= ? AND t.occurred_at < ? \
             ORDER BY t.occurred_at, t.id",
            TRANSACTION_COLUMNS
        ))?;
        let mut transactions = stmt
            .query_map(
                params![group_id, format_datetime(from), format_datetime(to)],
                row_to_transaction,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        attach_tags(&conn, &mut transactions)?;
        Ok(transactions)
    }

    /// Most recent transaction a user entered into a wallet
    pub fn last_transaction_by_user(
        &self,
        group_id: i64,
        user_id: &str,
    ) -> Result<Option<Transaction>> {
        let conn = self.conn()?;
        let id: Option<i64> = conn
            .query_row(
                "SELECT id FROM transactions WHERE group_id = ? AND user_id = ? \
                 ORDER BY occurred_at DESC, id DESC LIMIT 1",
                params![group_id, user_id],
                |row| row.get(0),
            )
            .optional()?;
        drop(conn);

        match id {
            Some(id) => self.get_transaction(id),
            None => Ok(None),
        }
    }

    /// Income and expense totals a user entered in a UTC range [from, to), across wallets
    pub fn user_totals_between(
        &self,
        user_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<(f64, f64)> {
        let conn = self.conn()?;
        let totals = conn.query_row(
            r#"
            SELECT
                COALESCE(SUM(CASE WHEN kind = 'income' THEN amount END), 0),
                COALESCE(SUM(CASE WHEN kind = 'expense' THEN amount END), 0)
            FROM transactions
            WHERE user_id = ? AND occurred_at >= ? AND occurred_at < ?
            "#,
            params![user_id, format_datetime(from), format_datetime(to)],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        Ok(totals)
    }

    /// Delete a transaction (tags cascade)
    pub fn delete_transaction(&self, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM transactions WHERE id = ?", params![id])?;
        Ok(deleted > 0)
    }
}
