//! Wallet (group) operations: family wallets, membership, invite codes

use chrono::{DateTime, Utc};
use rand::Rng;
use rusqlite::{params, OptionalExtension};
use tracing::info;

use super::categories::seed_categories_on;
use super::{format_datetime, parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{Group, GroupKind, GroupMember};

/// Invite code alphabet without look-alike characters (0/O, 1/I)
const INVITE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

pub const INVITE_CODE_LEN: usize = 6;

/// Generate a random invite code
pub fn generate_invite_code<R: Rng>(rng: &mut R) -> String {
    (0..INVITE_CODE_LEN)
        .map(|_| INVITE_ALPHABET[rng.gen_range(0..INVITE_ALPHABET.len())] as char)
        .collect()
}

const GROUP_COLUMNS: &str = "id, name, kind, invite_code, owner_id, created_at";

fn row_to_group(row: &rusqlite::Row) -> rusqlite::Result<Group> {
    let kind: String = row.get(2)?;
    let created_at: String = row.get(5)?;
    Ok(Group {
        id: row.get(0)?,
        name: row.get(1)?,
        kind: kind.parse().unwrap_or(GroupKind::Personal),
        invite_code: row.get(3)?,
        owner_id: row.get(4)?,
        created_at: parse_datetime(&created_at),
    })
}

impl Database {
    /// Get a wallet by id
    pub fn get_group(&self, id: i64) -> Result<Option<Group>> {
        let conn = self.conn()?;
        let group = conn
            .query_row(
                &format!("SELECT {} FROM wallets WHERE id = ?", GROUP_COLUMNS),
                params![id],
                row_to_group,
            )
            .optional()?;
        Ok(group)
    }

    /// Create a family wallet owned by `owner_id`, join it, and make it current
    pub fn create_family_group(
        &self,
        owner_id: &str,
        name: &str,
        now: DateTime<Utc>,
    ) -> Result<Group> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidData("wallet name is empty".to_string()));
        }
        let created = format_datetime(now);

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let mut rng = rand::thread_rng();
        let mut code = generate_invite_code(&mut rng);
        let mut attempts = 0;
        while tx
            .query_row(
                "SELECT 1 FROM wallets WHERE invite_code = ?",
                params![code],
                |_| Ok(()),
            )
            .optional()?
            .is_some()
        {
            attempts += 1;
            if attempts > 16 {
                return Err(Error::InvalidData(
                    "could not allocate a unique invite code".to_string(),
                ));
            }
            code = generate_invite_code(&mut rng);
        }

        tx.execute(
            "INSERT INTO wallets (name, kind, invite_code, owner_id, created_at) VALUES (?, ?, ?, ?, ?)",
            params![name, GroupKind::Family.as_str(), code, owner_id, created],
        )?;
        let group_id = tx.last_insert_rowid();

        tx.execute(
            "INSERT INTO wallet_members (group_id, user_id, joined_at) VALUES (?, ?, ?)",
            params![group_id, owner_id, created],
        )?;
        seed_categories_on(&tx, group_id)?;
        tx.execute(
            "UPDATE users SET current_group_id = ? WHERE id = ?",
            params![group_id, owner_id],
        )?;
        tx.commit()?;
        drop(conn);

        info!(group_id, owner_id = %owner_id, "Created family wallet");
        self.get_group(group_id)?
            .ok_or_else(|| Error::NotFound(format!("wallet {}", group_id)))
    }

    /// Look up a family wallet by invite code (case-insensitive)
    pub fn find_group_by_invite_code(&self, code: &str) -> Result<Option<Group>> {
        let conn = self.conn()?;
        let group = conn
            .query_row(
                &format!(
                    "SELECT {} FROM wallets WHERE invite_code = ? AND kind = 'family'",
                    GROUP_COLUMNS
                ),
                params![code.trim().to_uppercase()],
                row_to_group,
            )
            .optional()?;
        Ok(group)
    }

    /// Add a member to a wallet and make it their current wallet
    ///
    /// Returns false if the user was already a member.
    pub fn join_group(&self, group_id: i64, user_id: &str, now: DateTime<Utc>) -> Result<bool> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let inserted = tx.execute(
            "INSERT OR IGNORE INTO wallet_members (group_id, user_id, joined_at) VALUES (?, ?, ?)",
            params![group_id, user_id, format_datetime(now)],
        )?;
        tx.execute(
            "UPDATE users SET current_group_id = ? WHERE id = ?",
            params![group_id, user_id],
        )?;
        tx.commit()?;

        if inserted == 1 {
            info!(group_id, user_id = %user_id, "User joined wallet");
        }
        Ok(inserted == 1)
    }

    /// Check wallet membership
    pub fn is_group_member(&self, group_id: i64, user_id: &str) -> Result<bool> {
        let conn = self.conn()?;
        let found = conn
            .query_row(
                "SELECT 1 FROM wallet_members WHERE group_id = ? AND user_id = ?",
                params![group_id, user_id],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// List wallet members in join order
    pub fn list_group_members(&self, group_id: i64) -> Result<Vec<GroupMember>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT m.user_id, u.display_name, m.joined_at
            FROM wallet_members m
            JOIN users u ON u.id = m.user_id
            WHERE m.group_id = ?
            ORDER BY m.joined_at, m.rowid
            "#,
        )?;
        let members = stmt
            .query_map(params![group_id], |row| {
                let joined_at: String = row.get(2)?;
                Ok(GroupMember {
                    user_id: row.get(0)?,
                    display_name: row.get(1)?,
                    joined_at: parse_datetime(&joined_at),
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(members)
    }

    /// List every wallet a user belongs to
    pub fn list_user_groups(&self, user_id: &str) -> Result<Vec<Group>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT w.id, w.name, w.kind, w.invite_code, w.owner_id, w.created_at
            FROM wallets w
            JOIN wallet_members m ON m.group_id = w.id
            WHERE m.user_id = ?
            ORDER BY w.id
            "#,
        )?;
        let groups = stmt
            .query_map(params![user_id], row_to_group)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(groups)
    }
}
