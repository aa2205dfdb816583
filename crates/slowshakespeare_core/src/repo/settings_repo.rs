//! Settings repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Store serialized settings records by key.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - One row per key; saving an existing key replaces its value.
//! - Values are stored verbatim; validation happens on load in the model.

use crate::db::DbError;
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};

pub type RepoResult<T> = Result<T, RepoError>;

/// Settings persistence errors.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    Encode(serde_json::Error),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Encode(err) => write!(f, "failed to encode settings: {err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Encode(err) => Some(err),
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(value: serde_json::Error) -> Self {
        Self::Encode(value)
    }
}

/// Key-value storage for serialized settings records.
pub trait SettingsRepository {
    fn load_raw(&self, key: &str) -> RepoResult<Option<String>>;
    fn save_raw(&self, key: &str, value: &str) -> RepoResult<()>;
}

/// SQLite-backed settings repository.
pub struct SqliteSettingsRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSettingsRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl SettingsRepository for SqliteSettingsRepository<'_> {
    fn load_raw(&self, key: &str) -> RepoResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn save_raw(&self, key: &str, value: &str) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO settings (key, value, updated_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, value, now_epoch_ms()],
        )?;
        Ok(())
    }
}

fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::{SettingsRepository, SqliteSettingsRepository};
    use crate::db::open_db_in_memory;

    #[test]
    fn load_returns_none_for_missing_key() {
        let conn = open_db_in_memory().expect("open in-memory store");
        let repo = SqliteSettingsRepository::new(&conn);
        assert_eq!(repo.load_raw("slowshakespeare").expect("load"), None);
    }

    #[test]
    fn save_replaces_existing_value() {
        let conn = open_db_in_memory().expect("open in-memory store");
        let repo = SqliteSettingsRepository::new(&conn);
        repo.save_raw("slowshakespeare", r#"{"sonnet":"1"}"#)
            .expect("first save");
        repo.save_raw("slowshakespeare", r#"{"sonnet":"29"}"#)
            .expect("second save");

        let stored = repo.load_raw("slowshakespeare").expect("load");
        assert_eq!(stored.as_deref(), Some(r#"{"sonnet":"29"}"#));

        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM settings;", [], |row| row.get(0))
            .expect("count rows");
        assert_eq!(rows, 1);
    }
}
