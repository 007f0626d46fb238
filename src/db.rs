//! Database module for the intake bot
//!
//! Durable storage for collected user records, keyed by the chat platform's
//! user id. Each mutating operation is a single SQL statement.

mod schema;

pub use schema::*;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Database connection lock poisoned")]
    LockPoisoned,
}

pub type DbResult<T> = Result<T, DbError>;

/// Thread-safe database handle
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open or create database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    /// Open an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    fn lock(&self) -> DbResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| DbError::LockPoisoned)
    }

    fn run_migrations(&self) -> DbResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Check that the connection answers queries
    pub fn ping(&self) -> DbResult<()> {
        let conn = self.lock()?;
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
        Ok(())
    }

    // ==================== User Operations ====================

    /// Insert a record or overwrite the existing one for this user.
    ///
    /// `created_at` is kept on update; `updated_at` is always refreshed.
    pub fn upsert_user(
        &self,
        telegram_user_id: i64,
        name: &str,
        age: u8,
        address: &str,
    ) -> DbResult<UserRecord> {
        let conn = self.lock()?;
        let now = Utc::now().to_rfc3339();

        let record = conn.query_row(
            "INSERT INTO users (telegram_user_id, name, age, address, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)
             ON CONFLICT(telegram_user_id) DO UPDATE SET
                 name = excluded.name,
                 age = excluded.age,
                 address = excluded.address,
                 updated_at = excluded.updated_at
             RETURNING id, telegram_user_id, name, age, address, created_at, updated_at",
            params![telegram_user_id, name, age, address, now],
            parse_user_row,
        )?;
        Ok(record)
    }

    /// Delete the record for this user. Returns whether a row was removed.
    pub fn delete_user(&self, telegram_user_id: i64) -> DbResult<bool> {
        let conn = self.lock()?;
        let deleted = conn.execute(
            "DELETE FROM users WHERE telegram_user_id = ?1",
            params![telegram_user_id],
        )?;
        Ok(deleted > 0)
    }

    /// Get the record for this user, if any
    #[allow(dead_code)] // Used in tests and for diagnostics
    pub fn get_user(&self, telegram_user_id: i64) -> DbResult<Option<UserRecord>> {
        let conn = self.lock()?;
        let record = conn
            .query_row(
                "SELECT id, telegram_user_id, name, age, address, created_at, updated_at
                 FROM users WHERE telegram_user_id = ?1",
                params![telegram_user_id],
                parse_user_row,
            )
            .optional()?;
        Ok(record)
    }
}

fn parse_user_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<UserRecord> {
    Ok(UserRecord {
        id: row.get(0)?,
        telegram_user_id: row.get(1)?,
        name: row.get(2)?,
        age: row.get(3)?,
        address: row.get(4)?,
        created_at: parse_datetime(&row.get::<_, String>(5)?),
        updated_at: parse_datetime(&row.get::<_, String>(6)?),
    })
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).map_or_else(|_| Utc::now(), |dt| dt.with_timezone(&Utc))
}
