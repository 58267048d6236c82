//! Item domain model.
//!
//! # Responsibility
//! - Define the canonical item record (title, creation time, notes).
//! - Provide validation used before every persistence write.
//!
//! # Invariants
//! - `id` is stable and never reused for another item.
//! - `created_at` never changes after creation.
//! - `notes` keep insertion order.

use chrono::{Local, TimeZone};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Stable identifier for every item.
pub type ItemId = Uuid;

/// Title applied when none (or a blank one) is supplied.
pub const DEFAULT_TITLE: &str = "No Title";

/// A titled stopwatch session with its ordered notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub title: String,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Insertion order is display order.
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemValidationError {
    BlankTitle,
    NegativeCreatedAt(i64),
}

impl Display for ItemValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankTitle => write!(f, "item title cannot be blank"),
            Self::NegativeCreatedAt(value) => {
                write!(f, "item created_at must be >= 0, got {value}")
            }
        }
    }
}

impl Error for ItemValidationError {}

impl Item {
    /// Creates an item stamped with the current time.
    pub fn new(title: Option<&str>) -> Self {
        Self::with_timestamp(title, now_epoch_ms())
    }

    /// Creates an item with a caller-provided creation timestamp.
    pub fn with_timestamp(title: Option<&str>, created_at: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: normalize_title(title),
            created_at,
            notes: Vec::new(),
        }
    }

    pub fn validate(&self) -> Result<(), ItemValidationError> {
        if self.title.trim().is_empty() {
            return Err(ItemValidationError::BlankTitle);
        }
        if self.created_at < 0 {
            return Err(ItemValidationError::NegativeCreatedAt(self.created_at));
        }
        Ok(())
    }

    /// Local-time rendering of `created_at` for list cells.
    pub fn created_at_display(&self) -> String {
        match Local.timestamp_millis_opt(self.created_at).single() {
            Some(at) => at.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => self.created_at.to_string(),
        }
    }
}

/// Trims a title and falls back to `DEFAULT_TITLE` when blank or missing.
pub fn normalize_title(title: Option<&str>) -> String {
    match title.map(str::trim) {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => DEFAULT_TITLE.to_string(),
    }
}

pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::{normalize_title, Item, ItemValidationError, DEFAULT_TITLE};

    #[test]
    fn missing_or_blank_title_defaults() {
        assert_eq!(normalize_title(None), DEFAULT_TITLE);
        assert_eq!(normalize_title(Some("   ")), DEFAULT_TITLE);
        assert_eq!(normalize_title(Some(" Session 1 ")), "Session 1");
    }

    #[test]
    fn new_item_has_no_notes_and_distinct_id() {
        let first = Item::new(None);
        let second = Item::new(None);
        assert!(first.notes.is_empty());
        assert_ne!(first.id, second.id);
        assert!(first.created_at > 0);
    }

    #[test]
    fn validate_rejects_blank_title_and_negative_timestamp() {
        let mut item = Item::with_timestamp(Some("ok"), 10);
        assert!(item.validate().is_ok());

        item.title = " ".to_string();
        assert_eq!(item.validate(), Err(ItemValidationError::BlankTitle));

        item.title = "ok".to_string();
        item.created_at = -1;
        assert_eq!(
            item.validate(),
            Err(ItemValidationError::NegativeCreatedAt(-1))
        );
    }
}
