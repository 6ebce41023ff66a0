//! SQLite-backed document port.
//!
//! RULE: Only this file talks to the database.

use super::port::KeyValuePort;
use crate::error::DeskResult;
use rusqlite::{params, Connection, OptionalExtension};

pub struct SqlitePort {
    conn: Connection,
}

impl SqlitePort {
    /// Open (or create) the desk database at `path`.
    pub fn open(path: &str) -> DeskResult<Self> {
        let conn = Connection::open(path)?;
        // WAL mode only matters for real files; in-memory ignores it.
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> DeskResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> DeskResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_documents.sql"))?;
        Ok(())
    }

    /// Keys that currently hold a document, sorted.
    pub fn keys(&self) -> DeskResult<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT key FROM document ORDER BY key ASC")?;
        let keys = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(keys)
    }
}

impl KeyValuePort for SqlitePort {
    fn read(&self, key: &str) -> DeskResult<Option<String>> {
        let document = self
            .conn
            .query_row(
                "SELECT document FROM document WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(document)
    }

    fn write(&mut self, key: &str, document: &str) -> DeskResult<()> {
        self.conn.execute(
            "INSERT INTO document (key, document, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET
                document   = excluded.document,
                updated_at = excluded.updated_at",
            params![key, document, chrono::Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }
}
