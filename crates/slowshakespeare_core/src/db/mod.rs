//! Settings store on SQLite.
//!
//! The store holds one table, `settings(key, value, updated_at)`, where each
//! row is a JSON document keyed by a storage key (today only
//! `SETTINGS_STORAGE_KEY`). The schema version lives in `PRAGMA user_version`
//! and is brought up to date by `open_db` before the connection is returned.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Failures opening or migrating the settings store.
#[derive(Debug)]
pub enum DbError {
    /// The file was written by a newer build; nothing was changed.
    SchemaTooNew { found: u32, supported: u32 },
    Sqlite(rusqlite::Error),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SchemaTooNew { found, supported } => write!(
                f,
                "settings store uses schema v{found}; this build reads up to v{supported}"
            ),
            Self::Sqlite(err) => write!(f, "settings store: {err}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::SchemaTooNew { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
