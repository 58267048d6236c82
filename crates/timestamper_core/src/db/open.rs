//! Opening the item store.
//!
//! # Invariants
//! - Returned connections enforce foreign keys, so deleting an item removes its notes.
//! - Returned connections are at `migrations::latest_version()`.

use super::migrations::{apply_migrations, schema_version};
use super::{DbError, DbResult};
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens (creating if needed) the store file at `path`.
///
/// Missing parent directories are created first.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| {
            error!(
                "event=store_open module=db status=error target=file error_code=store_dir_failed"
            );
            DbError::CreateDir {
                path: parent.to_path_buf(),
                source,
            }
        })?;
    }
    open_with("file", || Connection::open(path))
}

/// Opens a private in-memory store; used by tests and dry runs.
pub fn open_db_in_memory() -> DbResult<Connection> {
    open_with("memory", Connection::open_in_memory)
}

fn open_with(
    target: &'static str,
    connect: impl FnOnce() -> rusqlite::Result<Connection>,
) -> DbResult<Connection> {
    let started_at = Instant::now();
    let result = connect()
        .map_err(DbError::from)
        .and_then(|mut conn| prepare(&mut conn).map(|()| conn));

    match &result {
        Ok(conn) => info!(
            "event=store_open module=db status=ok target={} schema_version={} duration_ms={}",
            target,
            schema_version(conn).unwrap_or_default(),
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event=store_open module=db status=error target={} error_code={} duration_ms={}",
            target,
            error_code(err),
            started_at.elapsed().as_millis()
        ),
    }
    result
}

fn prepare(conn: &mut Connection) -> DbResult<()> {
    conn.pragma_update(None, "foreign_keys", true)?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    apply_migrations(conn)
}

fn error_code(err: &DbError) -> &'static str {
    match err {
        DbError::Sqlite(_) => "sqlite",
        DbError::CreateDir { .. } => "store_dir_failed",
        DbError::Migration { .. } => "schema_step_failed",
        DbError::SchemaTooNew { .. } => "schema_too_new",
    }
}
