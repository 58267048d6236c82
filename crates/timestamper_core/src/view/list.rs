//! Item list screen.

use crate::event::drain;
use crate::model::item::{Item, ItemId};
use crate::repo::item_repo::ItemRepository;
use crate::service::item_service::{ItemService, ServiceResult, StoreEvent};
use log::{debug, warn};
use std::sync::mpsc::Receiver;

/// One rendered list cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRow {
    /// 1-based display position.
    pub position: usize,
    pub id: ItemId,
    pub title: String,
    pub subtitle: String,
    pub note_count: usize,
    pub selected: bool,
}

pub struct ListView {
    items: Vec<Item>,
    selected: Option<ItemId>,
    error: Option<String>,
    store_events: Receiver<StoreEvent>,
}

impl ListView {
    /// Subscribes to store events and loads the initial item list.
    ///
    /// A failed initial load leaves the list empty with the error recorded.
    pub fn open<R: ItemRepository>(service: &ItemService<R>) -> Self {
        let mut view = Self {
            items: Vec::new(),
            selected: None,
            error: None,
            store_events: service.subscribe(),
        };
        if let Err(err) = view.refresh(service) {
            debug!(
                "event=list_open module=view status=degraded error_code={}",
                err.code()
            );
        }
        view
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Reloads items from the store.
    pub fn refresh<R: ItemRepository>(&mut self, service: &ItemService<R>) -> ServiceResult<()> {
        let result = service.list_items();
        match result {
            Ok(items) => {
                self.items = items;
                if let Some(id) = self.selected {
                    if !self.items.iter().any(|item| item.id == id) {
                        self.selected = None;
                    }
                }
                self.error = None;
                Ok(())
            }
            Err(err) => {
                warn!(
                    "event=list_refresh module=view status=error error_code={}",
                    err.code()
                );
                self.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Applies pending store events. Returns whether the list was reloaded.
    pub fn sync<R: ItemRepository>(&mut self, service: &ItemService<R>) -> bool {
        if drain(&self.store_events).is_empty() {
            return false;
        }
        if let Err(err) = self.refresh(service) {
            debug!(
                "event=list_sync module=view status=stale items={} error_code={}",
                self.items.len(),
                err.code()
            );
        }
        true
    }

    /// "Add Item": creates an item with the default or given title.
    pub fn add_item<R: ItemRepository>(
        &mut self,
        service: &ItemService<R>,
        title: Option<&str>,
    ) -> ServiceResult<Item> {
        match service.create_item(title) {
            Ok(item) => {
                self.sync(service);
                Ok(item)
            }
            Err(err) => {
                self.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    pub fn select(&mut self, id: ItemId) -> bool {
        if self.items.iter().any(|item| item.id == id) {
            self.selected = Some(id);
            return true;
        }
        false
    }

    /// Selects by 1-based display position.
    pub fn select_position(&mut self, position: usize) -> Option<ItemId> {
        let id = self.items.get(position.checked_sub(1)?)?.id;
        self.selected = Some(id);
        Some(id)
    }

    pub fn selected(&self) -> Option<&Item> {
        let id = self.selected?;
        self.items.iter().find(|item| item.id == id)
    }

    pub fn rows(&self) -> Vec<ListRow> {
        self.items
            .iter()
            .enumerate()
            .map(|(index, item)| ListRow {
                position: index + 1,
                id: item.id,
                title: item.title.clone(),
                subtitle: format!("Item at: {}", item.created_at_display()),
                note_count: item.notes.len(),
                selected: self.selected == Some(item.id),
            })
            .collect()
    }
}
