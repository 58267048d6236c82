//! Item repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide create/get/list/append/rename/delete over `items` and
//!   `item_notes`.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Items are listed by `created_at ASC, creation_seq ASC`; `creation_seq`
//!   grows with every insert, so items sharing a timestamp keep creation order.
//! - Notes are read back in `position ASC`, which is append order.
//! - Deleting an item removes its notes in the same statement (FK cascade).

use crate::db::DbError;
use crate::model::item::{Item, ItemId, ItemValidationError};
use rusqlite::{params, Connection, Row, Transaction};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const ITEM_SELECT_SQL: &str = "SELECT
    uuid,
    title,
    created_at
FROM items";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for item persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(ItemValidationError),
    Db(DbError),
    NotFound(ItemId),
    InvalidData(String),
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "item not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted item data: {message}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "connection is missing required table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "table `{table}` is missing required column `{column}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ItemValidationError> for RepoError {
    fn from(value: ItemValidationError) -> Self {
        Self::Validation(value)
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

/// Persistence capability for items and their notes.
pub trait ItemRepository {
    /// Inserts an item (and any notes it already carries).
    fn create_item(&self, item: &Item) -> RepoResult<ItemId>;
    fn get_item(&self, id: ItemId) -> RepoResult<Option<Item>>;
    /// Returns every item sorted by `created_at` ascending.
    fn list_items(&self) -> RepoResult<Vec<Item>>;
    /// Appends one note and returns its zero-based position.
    fn append_note(&self, id: ItemId, content: &str) -> RepoResult<usize>;
    fn rename_item(&self, id: ItemId, title: &str) -> RepoResult<()>;
    /// Permanently removes the item and all of its notes.
    fn delete_item(&self, id: ItemId) -> RepoResult<()>;
}

/// SQLite-backed item repository.
pub struct SqliteItemRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteItemRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    ///
    /// # Errors
    /// - Returns `MissingRequiredTable`/`MissingRequiredColumn` when the
    ///   connection was not bootstrapped through `open_db*`.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl ItemRepository for SqliteItemRepository<'_> {
    fn create_item(&self, item: &Item) -> RepoResult<ItemId> {
        item.validate()?;

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO items (uuid, title, created_at, updated_at, creation_seq)
             VALUES (?1, ?2, ?3, ?3, (SELECT COALESCE(MAX(creation_seq), 0) + 1 FROM items));",
            params![item.id.to_string(), item.title.as_str(), item.created_at],
        )?;
        for (position, note) in item.notes.iter().enumerate() {
            insert_note(&tx, &item.id.to_string(), position, note)?;
        }
        tx.commit()?;

        Ok(item.id)
    }

    fn get_item(&self, id: ItemId) -> RepoResult<Option<Item>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ITEM_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        let Some(row) = rows.next()? else {
            return Ok(None);
        };

        let mut item = parse_item_row(row)?;
        item.notes = load_notes_for_item(self.conn, &id.to_string())?;
        item.validate()?;
        Ok(Some(item))
    }

    fn list_items(&self) -> RepoResult<Vec<Item>> {
        let mut notes_by_item = load_all_notes(self.conn)?;

        let mut stmt = self
            .conn
            .prepare(&format!("{ITEM_SELECT_SQL} ORDER BY created_at ASC, creation_seq ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            let mut item = parse_item_row(row)?;
            item.notes = notes_by_item
                .remove(&item.id.to_string())
                .unwrap_or_default();
            item.validate()?;
            items.push(item);
        }

        Ok(items)
    }

    fn append_note(&self, id: ItemId, content: &str) -> RepoResult<usize> {
        let item_uuid = id.to_string();
        let tx = self.conn.unchecked_transaction()?;
        if !item_exists_in_tx(&tx, &item_uuid)? {
            return Err(RepoError::NotFound(id));
        }

        let next_position: i64 = tx.query_row(
            "SELECT COALESCE(MAX(position) + 1, 0) FROM item_notes WHERE item_uuid = ?1;",
            [item_uuid.as_str()],
            |row| row.get(0),
        )?;
        let position = usize::try_from(next_position).map_err(|_| {
            RepoError::InvalidData(format!(
                "invalid note position `{next_position}` in item_notes.position"
            ))
        })?;
        insert_note(&tx, &item_uuid, position, content)?;
        touch_item(&tx, &item_uuid)?;
        tx.commit()?;

        Ok(position)
    }

    fn rename_item(&self, id: ItemId, title: &str) -> RepoResult<()> {
        if title.trim().is_empty() {
            return Err(RepoError::Validation(ItemValidationError::BlankTitle));
        }

        let changed = self.conn.execute(
            "UPDATE items
             SET
                title = ?2,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params![id.to_string(), title],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn delete_item(&self, id: ItemId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM items WHERE uuid = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }
}

fn parse_item_row(row: &Row<'_>) -> RepoResult<Item> {
    let uuid_text: String = row.get("uuid")?;
    let id = parse_uuid(&uuid_text)?;

    Ok(Item {
        id,
        title: row.get("title")?,
        created_at: row.get("created_at")?,
        notes: Vec::new(),
    })
}

fn parse_uuid(value: &str) -> RepoResult<ItemId> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in items.uuid")))
}

fn insert_note(
    tx: &Transaction<'_>,
    item_uuid: &str,
    position: usize,
    content: &str,
) -> RepoResult<()> {
    let position = i64::try_from(position)
        .map_err(|_| RepoError::InvalidData(format!("note position {position} overflows")))?;
    tx.execute(
        "INSERT INTO item_notes (item_uuid, position, content) VALUES (?1, ?2, ?3);",
        params![item_uuid, position, content],
    )?;
    Ok(())
}

fn touch_item(tx: &Transaction<'_>, item_uuid: &str) -> RepoResult<()> {
    tx.execute(
        "UPDATE items SET updated_at = (strftime('%s', 'now') * 1000) WHERE uuid = ?1;",
        [item_uuid],
    )?;
    Ok(())
}

fn load_notes_for_item(conn: &Connection, item_uuid: &str) -> RepoResult<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT content
         FROM item_notes
         WHERE item_uuid = ?1
         ORDER BY position ASC;",
    )?;
    let mut rows = stmt.query([item_uuid])?;
    let mut notes = Vec::new();
    while let Some(row) = rows.next()? {
        notes.push(row.get(0)?);
    }
    Ok(notes)
}

fn load_all_notes(conn: &Connection) -> RepoResult<HashMap<String, Vec<String>>> {
    let mut stmt = conn.prepare(
        "SELECT item_uuid, content
         FROM item_notes
         ORDER BY item_uuid ASC, position ASC;",
    )?;
    let mut rows = stmt.query([])?;
    let mut notes: HashMap<String, Vec<String>> = HashMap::new();
    while let Some(row) = rows.next()? {
        let item_uuid: String = row.get(0)?;
        notes.entry(item_uuid).or_default().push(row.get(1)?);
    }
    Ok(notes)
}

fn item_exists_in_tx(tx: &Transaction<'_>, item_uuid: &str) -> RepoResult<bool> {
    let exists: i64 = tx.query_row(
        "SELECT EXISTS(SELECT 1 FROM items WHERE uuid = ?1);",
        [item_uuid],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    const REQUIRED: &[(&str, &[&str])] = &[
        (
            "items",
            &["uuid", "title", "created_at", "updated_at", "creation_seq"],
        ),
        ("item_notes", &["item_uuid", "position", "content"]),
    ];

    for &(table, columns) in REQUIRED {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
        for &column in columns {
            if !table_has_column(conn, table, column)? {
                return Err(RepoError::MissingRequiredColumn { table, column });
            }
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
