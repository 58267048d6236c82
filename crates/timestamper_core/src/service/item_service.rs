//! Item use-case service.
//!
//! # Responsibility
//! - Provide create/list/get/append-note/rename/delete for items.
//! - Classify storage failures as read or write failures.
//! - Publish `StoreEvent`s after every successful mutation.
//!
//! # Invariants
//! - Every store failure is returned as a recoverable `ItemServiceError`.
//! - Whitespace-only notes are rejected before touching storage.
//! - Log lines carry ids and counts only, never titles or note text.

use crate::event::EventBus;
use crate::model::item::{normalize_title, Item, ItemId};
use crate::repo::item_repo::{ItemRepository, RepoError};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::mpsc::Receiver;

/// Service error for item use-cases.
#[derive(Debug)]
pub enum ItemServiceError {
    /// Note text is empty or whitespace-only.
    EmptyNote,
    /// Target item does not exist.
    ItemNotFound(ItemId),
    /// Persisting a change failed.
    StoreWrite(RepoError),
    /// Reading from storage failed.
    StoreRead(RepoError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl Display for ItemServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyNote => write!(f, "note text cannot be empty"),
            Self::ItemNotFound(id) => write!(f, "item not found: {id}"),
            Self::StoreWrite(err) => write!(f, "failed to save changes: {err}"),
            Self::StoreRead(err) => write!(f, "failed to load items: {err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent item state: {details}"),
        }
    }
}

impl Error for ItemServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::StoreWrite(err) | Self::StoreRead(err) => Some(err),
            _ => None,
        }
    }
}

impl ItemServiceError {
    fn write(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(id) => Self::ItemNotFound(id),
            other => Self::StoreWrite(other),
        }
    }

    fn read(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(id) => Self::ItemNotFound(id),
            other => Self::StoreRead(other),
        }
    }

    /// Stable short code used in log lines and CLI output.
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyNote => "empty_note",
            Self::ItemNotFound(_) => "item_not_found",
            Self::StoreWrite(_) => "store_write_failed",
            Self::StoreRead(_) => "store_read_failed",
            Self::InconsistentState(_) => "inconsistent_state",
        }
    }
}

pub type ServiceResult<T> = Result<T, ItemServiceError>;

/// Store mutations observed by views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    ItemCreated(ItemId),
    NoteAppended { id: ItemId, position: usize },
    ItemRenamed(ItemId),
    ItemDeleted(ItemId),
}

/// Item service facade over repository implementations.
pub struct ItemService<R: ItemRepository> {
    repo: R,
    events: EventBus<StoreEvent>,
}

impl<R: ItemRepository> ItemService<R> {
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            events: EventBus::new(),
        }
    }

    pub fn subscribe(&self) -> Receiver<StoreEvent> {
        self.events.subscribe()
    }

    /// Creates an item stamped with the current time.
    pub fn create_item(&self, title: Option<&str>) -> ServiceResult<Item> {
        self.insert(Item::new(title))
    }

    /// Creates an item with an explicit creation timestamp (epoch ms).
    pub fn create_item_at(&self, title: Option<&str>, created_at: i64) -> ServiceResult<Item> {
        self.insert(Item::with_timestamp(title, created_at))
    }

    /// Lists every item ordered by creation time ascending.
    pub fn list_items(&self) -> ServiceResult<Vec<Item>> {
        self.repo.list_items().map_err(|err| {
            log_failure("item_list", None, &err);
            ItemServiceError::read(err)
        })
    }

    pub fn get_item(&self, id: ItemId) -> ServiceResult<Option<Item>> {
        self.repo.get_item(id).map_err(|err| {
            log_failure("item_get", Some(id), &err);
            ItemServiceError::read(err)
        })
    }

    /// Appends a note and returns the item as persisted.
    pub fn append_note(&self, id: ItemId, text: &str) -> ServiceResult<Item> {
        if text.trim().is_empty() {
            return Err(ItemServiceError::EmptyNote);
        }

        let position = self.repo.append_note(id, text).map_err(|err| {
            log_failure("note_append", Some(id), &err);
            ItemServiceError::write(err)
        })?;
        info!(
            "event=note_append module=service status=ok item_id={} position={}",
            id, position
        );
        self.events
            .publish(StoreEvent::NoteAppended { id, position });

        self.read_back(id, "item missing after note append")
    }

    /// Replaces the title. Blank titles fall back to the default title.
    pub fn rename_item(&self, id: ItemId, title: &str) -> ServiceResult<Item> {
        let title = normalize_title(Some(title));
        self.repo.rename_item(id, &title).map_err(|err| {
            log_failure("item_rename", Some(id), &err);
            ItemServiceError::write(err)
        })?;
        info!("event=item_rename module=service status=ok item_id={id}");
        self.events.publish(StoreEvent::ItemRenamed(id));

        self.read_back(id, "item missing after rename")
    }

    /// Permanently deletes the item together with its notes.
    pub fn delete_item(&self, id: ItemId) -> ServiceResult<()> {
        self.repo.delete_item(id).map_err(|err| {
            log_failure("item_delete", Some(id), &err);
            ItemServiceError::write(err)
        })?;
        info!("event=item_delete module=service status=ok item_id={id}");
        self.events.publish(StoreEvent::ItemDeleted(id));
        Ok(())
    }

    fn insert(&self, item: Item) -> ServiceResult<Item> {
        let id = self.repo.create_item(&item).map_err(|err| {
            log_failure("item_create", Some(item.id), &err);
            ItemServiceError::write(err)
        })?;
        info!("event=item_create module=service status=ok item_id={id}");
        self.events.publish(StoreEvent::ItemCreated(id));

        self.read_back(id, "created item not found in read-back")
    }

    fn read_back(&self, id: ItemId, details: &'static str) -> ServiceResult<Item> {
        self.get_item(id)?
            .ok_or(ItemServiceError::InconsistentState(details))
    }
}

fn log_failure(event: &str, id: Option<ItemId>, err: &RepoError) {
    match id {
        Some(id) => error!(
            "event={} module=service status=error item_id={} error={}",
            event, id, err
        ),
        None => error!("event={} module=service status=error error={}", event, err),
    }
}
