//! Item store bootstrap: connection setup and schema upgrades.
//!
//! # Responsibility
//! - Open the SQLite file (or an in-memory store) holding items and notes.
//! - Bring the `items`/`item_notes` schema to the version this binary knows.
//!
//! # Invariants
//! - The schema version lives in `PRAGMA user_version`.
//! - No item or note is read or written before the schema is current.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    /// Transport-level SQLite failure.
    Sqlite(rusqlite::Error),
    /// The directory that should hold the store file could not be created.
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    /// One schema step failed; the whole upgrade was rolled back.
    Migration {
        version: u32,
        name: &'static str,
        source: rusqlite::Error,
    },
    /// The file was written by a newer build with a schema we cannot read.
    SchemaTooNew { found: u32, supported: u32 },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "item store error: {err}"),
            Self::CreateDir { path, source } => write!(
                f,
                "cannot create item store directory `{}`: {source}",
                path.display()
            ),
            Self::Migration {
                version,
                name,
                source,
            } => write!(f, "schema step {version} ({name}) failed: {source}"),
            Self::SchemaTooNew { found, supported } => write!(
                f,
                "item store uses schema {found}, but this build only understands up to {supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::CreateDir { source, .. } => Some(source),
            Self::Migration { source, .. } => Some(source),
            Self::SchemaTooNew { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
