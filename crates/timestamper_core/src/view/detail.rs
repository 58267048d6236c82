//! Item detail screen: title, stopwatch, notes and the note composer.
//!
//! # Invariants
//! - A fresh stopwatch is created every time the view is opened.
//! - Deletion requires `request_delete()` followed by `confirm_delete()`.
//! - After the item is deleted the view shows the empty state and the
//!   stopwatch is stopped.

use crate::event::drain;
use crate::model::item::{Item, ItemId};
use crate::repo::item_repo::ItemRepository;
use crate::schedule::Clock;
use crate::service::item_service::{ItemService, ItemServiceError, ServiceResult, StoreEvent};
use crate::stopwatch::{Stopwatch, StopwatchControl, StopwatchEvent, StopwatchMode};
use crate::timefmt::{format_hms, relative_prefix};
use log::warn;
use std::sync::mpsc::Receiver;
use std::time::Duration;

/// Quick-select offsets for "Add Timestamp".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuickOffset {
    Sixty,
    Thirty,
    Ten,
    Now,
}

impl QuickOffset {
    pub const ALL: [QuickOffset; 4] = [Self::Sixty, Self::Thirty, Self::Ten, Self::Now];

    pub fn seconds(self) -> u64 {
        match self {
            Self::Sixty => 60,
            Self::Thirty => 30,
            Self::Ten => 10,
            Self::Now => 0,
        }
    }

    pub fn from_seconds(seconds: u64) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|offset| offset.seconds() == seconds)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Sixty => "-60s",
            Self::Thirty => "-30s",
            Self::Ten => "-10s",
            Self::Now => "0s",
        }
    }
}

/// Render-ready state of the detail screen.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailSnapshot {
    pub title: String,
    pub elapsed_display: String,
    pub elapsed_seconds: f64,
    pub mode: StopwatchMode,
    pub controls: Vec<StopwatchControl>,
    pub notes: Vec<String>,
    pub note_input: String,
    pub input_focused: bool,
    pub delete_pending: bool,
    pub error: Option<String>,
}

pub struct DetailView<C: Clock> {
    item: Option<Item>,
    stopwatch: Stopwatch<C>,
    note_input: String,
    input_focused: bool,
    delete_pending: bool,
    error: Option<String>,
    store_events: Receiver<StoreEvent>,
    stopwatch_events: Receiver<StopwatchEvent>,
}

impl<C: Clock> DetailView<C> {
    /// Loads `id` and attaches a fresh stopwatch ticking every `tick_interval`.
    pub fn open<R: ItemRepository>(
        service: &ItemService<R>,
        id: ItemId,
        clock: C,
        tick_interval: Duration,
    ) -> ServiceResult<Self> {
        let item = service
            .get_item(id)?
            .ok_or(ItemServiceError::ItemNotFound(id))?;
        let stopwatch = Stopwatch::with_interval(clock, tick_interval);
        let stopwatch_events = stopwatch.subscribe();

        Ok(Self {
            item: Some(item),
            stopwatch,
            note_input: String::new(),
            input_focused: false,
            delete_pending: false,
            error: None,
            store_events: service.subscribe(),
            stopwatch_events,
        })
    }

    /// `None` once the item has been deleted.
    pub fn item(&self) -> Option<&Item> {
        self.item.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.item.is_none()
    }

    pub fn stopwatch(&self) -> &Stopwatch<C> {
        &self.stopwatch
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn note_input(&self) -> &str {
        &self.note_input
    }

    pub fn input_focused(&self) -> bool {
        self.input_focused
    }

    pub fn delete_pending(&self) -> bool {
        self.delete_pending
    }

    /// Applies a stopwatch control. Illegal controls are ignored.
    pub fn control(&mut self, control: StopwatchControl) -> bool {
        if self.item.is_none() {
            return false;
        }
        self.stopwatch.apply(control)
    }

    /// Delivers due stopwatch ticks.
    pub fn tick(&mut self) -> u32 {
        self.stopwatch.pump()
    }

    /// "Add Timestamp": prefills the note input relative to elapsed time and
    /// focuses it.
    pub fn mark(&mut self, offset: QuickOffset) -> &str {
        self.note_input = relative_prefix(self.stopwatch.elapsed_whole_seconds(), offset.seconds());
        self.input_focused = true;
        &self.note_input
    }

    pub fn set_note_input(&mut self, text: impl Into<String>) {
        self.note_input = text.into();
        self.input_focused = true;
    }

    /// Appends the current note input. On success the input is cleared and
    /// loses focus.
    pub fn submit_note<R: ItemRepository>(&mut self, service: &ItemService<R>) -> ServiceResult<()> {
        let text = self.note_input.clone();
        self.append_note(service, &text)?;
        self.note_input.clear();
        self.input_focused = false;
        Ok(())
    }

    pub fn append_note<R: ItemRepository>(
        &mut self,
        service: &ItemService<R>,
        text: &str,
    ) -> ServiceResult<()> {
        let id = self.current_id()?;
        let result = service.append_note(id, text);
        match result {
            Ok(item) => {
                self.item = Some(item);
                self.error = None;
                Ok(())
            }
            Err(err) => Err(self.record(err)),
        }
    }

    pub fn rename<R: ItemRepository>(
        &mut self,
        service: &ItemService<R>,
        title: &str,
    ) -> ServiceResult<()> {
        let id = self.current_id()?;
        match service.rename_item(id, title) {
            Ok(item) => {
                self.item = Some(item);
                self.error = None;
                Ok(())
            }
            Err(err) => Err(self.record(err)),
        }
    }

    /// Shows the delete confirmation.
    pub fn request_delete(&mut self) {
        if self.item.is_some() {
            self.delete_pending = true;
        }
    }

    pub fn cancel_delete(&mut self) {
        self.delete_pending = false;
    }

    /// Deletes the item if a confirmation is pending. Returns whether the item
    /// was deleted.
    pub fn confirm_delete<R: ItemRepository>(
        &mut self,
        service: &ItemService<R>,
    ) -> ServiceResult<bool> {
        if !self.delete_pending {
            return Ok(false);
        }
        self.delete_pending = false;

        let id = self.current_id()?;
        match service.delete_item(id) {
            Ok(()) => {
                self.clear_item();
                Ok(true)
            }
            Err(err) => Err(self.record(err)),
        }
    }

    /// Applies pending store and stopwatch events. Returns whether the
    /// screen needs re-rendering.
    pub fn sync<R: ItemRepository>(&mut self, service: &ItemService<R>) -> bool {
        let mut changed = !drain(&self.stopwatch_events).is_empty();

        let Some(id) = self.item.as_ref().map(|item| item.id) else {
            drain(&self.store_events);
            return changed;
        };

        let mut reload = false;
        for event in drain(&self.store_events) {
            match event {
                StoreEvent::ItemDeleted(deleted) if deleted == id => {
                    self.clear_item();
                    return true;
                }
                StoreEvent::NoteAppended { id: target, .. } | StoreEvent::ItemRenamed(target)
                    if target == id =>
                {
                    reload = true;
                }
                _ => {}
            }
        }

        if reload {
            match service.get_item(id) {
                Ok(Some(item)) => self.item = Some(item),
                Ok(None) => self.clear_item(),
                Err(err) => {
                    self.record(err);
                }
            }
            changed = true;
        }
        changed
    }

    pub fn snapshot(&self) -> DetailSnapshot {
        DetailSnapshot {
            title: self
                .item
                .as_ref()
                .map_or_else(String::new, |item| item.title.clone()),
            elapsed_display: format_hms(self.stopwatch.elapsed_seconds()),
            elapsed_seconds: self.stopwatch.elapsed_seconds(),
            mode: self.stopwatch.mode(),
            controls: if self.item.is_some() {
                self.stopwatch.available_controls().to_vec()
            } else {
                Vec::new()
            },
            notes: self
                .item
                .as_ref()
                .map_or_else(Vec::new, |item| item.notes.clone()),
            note_input: self.note_input.clone(),
            input_focused: self.input_focused,
            delete_pending: self.delete_pending,
            error: self.error.clone(),
        }
    }

    fn current_id(&mut self) -> ServiceResult<ItemId> {
        match self.item.as_ref() {
            Some(item) => Ok(item.id),
            None => Err(self.record(ItemServiceError::InconsistentState(
                "detail view has no item",
            ))),
        }
    }

    fn clear_item(&mut self) {
        self.item = None;
        self.stopwatch.stop();
        self.note_input.clear();
        self.input_focused = false;
        self.delete_pending = false;
    }

    fn record(&mut self, err: ItemServiceError) -> ItemServiceError {
        warn!(
            "event=detail_action module=view status=error error_code={}",
            err.code()
        );
        self.error = Some(err.to_string());
        err
    }
}
