//! SQLite access layer for chatvault
//!
//! Opens the chat application's database read-only, runs one query batch,
//! and is dropped. No pooling and no writes.

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OpenFlags};
use std::path::Path;

use super::models::{ChatBody, Conversation};

/// Read-only connection to the chat-history database.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens the database read-only.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened as a SQLite database.
    pub fn open_read_only(path: &Path) -> Result<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_context(|| format!("Failed to open database at {}", path.display()))?;
        Ok(Self { conn })
    }

    /// Lists all conversations belonging to one user, most recently
    /// updated first.
    ///
    /// The `meta` and `chat` JSON blobs are parsed leniently: a malformed
    /// blob degrades to an empty value instead of failing the whole listing.
    pub fn list_conversations(&self, user_id: &str) -> Result<Vec<Conversation>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, user_id, title, share_id, archived, pinned,
                        created_at, updated_at, meta, chat
                 FROM chat
                 WHERE user_id = ?1
                 ORDER BY updated_at DESC",
            )
            .context("Failed to prepare conversation query")?;

        let rows = stmt.query_map(params![user_id], |row| {
            let meta: Option<String> = row.get(8)?;
            let chat: Option<String> = row.get(9)?;

            Ok(Conversation {
                id: row.get(0)?,
                user_id: row.get(1)?,
                title: row.get(2)?,
                share_id: row.get(3)?,
                archived: row.get::<_, Option<i64>>(4)?.unwrap_or(0) != 0,
                pinned: row.get::<_, Option<i64>>(5)?.unwrap_or(0) != 0,
                created_at: row.get(6)?,
                updated_at: row.get(7)?,
                meta: meta
                    .and_then(|m| serde_json::from_str(&m).ok())
                    .unwrap_or(serde_json::Value::Null),
                chat: chat
                    .and_then(|c| serde_json::from_str::<ChatBody>(&c).ok())
                    .unwrap_or_default(),
            })
        })?;

        rows.collect::<Result<Vec<_>, _>>()
            .context("Failed to list conversations")
    }
}
