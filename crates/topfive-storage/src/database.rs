//! Database connection and flag operations

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;
use std::sync::Arc;

use crate::error::StorageError;
use crate::migrations::run_migrations;
use crate::Result;

pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;

        // WAL mode for better concurrent performance
        let _: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;

        // Run migrations
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

    /// Read a flag. Expired flags read as absent and are deleted lazily.
    pub fn get_flag(&self, key: &str) -> Result<Option<String>> {
        let row = self.with_connection(|conn| {
            let row: Option<(String, String)> = conn
                .query_row(
                    "SELECT value, expires_at FROM flags WHERE key = ?1",
                    [key],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()?;
            Ok(row)
        })?;

        let (value, expires_at) = match row {
            Some(row) => row,
            None => return Ok(None),
        };

        let expired = DateTime::parse_from_rfc3339(&expires_at)
            .map(|dt| dt.with_timezone(&Utc) <= Utc::now())
            .unwrap_or(true);

        if expired {
            self.clear_flag(key)?;
            return Ok(None);
        }

        Ok(Some(value))
    }

    /// Write a flag that stays readable for `expiry_days` days.
    pub fn set_flag(&self, key: &str, value: &str, expiry_days: i64) -> Result<()> {
        if expiry_days <= 0 {
            return Err(StorageError::InvalidExpiry(format!(
                "{} days",
                expiry_days
            )));
        }

        let expires_at = (Utc::now() + Duration::days(expiry_days)).to_rfc3339();
        self.with_connection(|conn| {
            conn.execute(
                "INSERT OR REPLACE INTO flags (key, value, expires_at) VALUES (?1, ?2, ?3)",
                rusqlite::params![key, value, expires_at],
            )?;
            Ok(())
        })?;

        Ok(())
    }

    /// Remove a flag. Removing an absent flag is a no-op.
    pub fn clear_flag(&self, key: &str) -> Result<()> {
        self.with_connection(|conn| {
            conn.execute("DELETE FROM flags WHERE key = ?1", [key])?;
            Ok(())
        })?;

        Ok(())
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            conn: Arc::clone(&self.conn),
        }
    }
}
