use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::Result;

use super::KeyValueStore;

const SQLITE_DB: &str = "notes.db";

/// Key-value table in a SQLite database.
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Open or create `notes.db` in the data directory.
    pub fn open(data_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_dir)?;
        let storage = Self {
            conn: Connection::open(data_dir.join(SQLITE_DB))?,
        };
        storage.init_schema()?;
        Ok(storage)
    }

    #[cfg(test)]
    fn open_in_memory() -> Result<Self> {
        let storage = Self {
            conn: Connection::open_in_memory()?,
        };
        storage.init_schema()?;
        Ok(storage)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )?;
        Ok(())
    }
}

impl KeyValueStore for SqliteStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let value: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM kv WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }
}
