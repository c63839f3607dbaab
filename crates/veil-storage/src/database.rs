//! SQLite document backend

use chrono::Local;
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;
use std::sync::Arc;

use crate::migrations::run_migrations;
use crate::store::{validate_name, DocumentStore};
use crate::Result;

/// Keeps every document as one row of the `documents` table.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;

        // WAL mode so a reader never blocks the single writer
        let _: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;

        run_migrations(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        run_migrations(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn with_connection<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.conn.lock();
        f(&conn)
    }

    pub fn transaction<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        let result = f(&tx)?;
        tx.commit()?;
        Ok(result)
    }

    /// Last write time of a document, as stored (RFC 3339)
    pub fn updated_at(&self, name: &str) -> Result<Option<String>> {
        validate_name(name)?;
        self.with_connection(|conn| {
            let value = conn
                .query_row(
                    "SELECT updated_at FROM documents WHERE name = ?1",
                    [name],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(value)
        })
    }
}

impl DocumentStore for SqliteStore {
    fn read(&self, name: &str) -> Result<Option<String>> {
        validate_name(name)?;
        self.with_connection(|conn| {
            let body = conn
                .query_row("SELECT body FROM documents WHERE name = ?1", [name], |row| {
                    row.get(0)
                })
                .optional()?;
            Ok(body)
        })
    }

    fn write(&self, name: &str, body: &str) -> Result<()> {
        validate_name(name)?;
        let updated_at = Local::now().to_rfc3339();
        self.transaction(|conn| {
            conn.execute(
                "INSERT OR REPLACE INTO documents (name, body, updated_at) VALUES (?1, ?2, ?3)",
                rusqlite::params![name, body, updated_at],
            )?;
            Ok(())
        })?;

        tracing::debug!(document = %name, bytes = body.len(), "Wrote document row");

        Ok(())
    }

    fn remove(&self, name: &str) -> Result<()> {
        validate_name(name)?;
        self.with_connection(|conn| {
            conn.execute("DELETE FROM documents WHERE name = ?1", [name])?;
            Ok(())
        })
    }
}

impl Clone for SqliteStore {
    fn clone(&self) -> Self {
        Self {
            conn: Arc::clone(&self.conn),
        }
    }
}
