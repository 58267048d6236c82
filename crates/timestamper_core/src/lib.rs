//! Core domain logic for Timestamper.
//! This crate is the single source of truth for business invariants.

pub mod config;
pub mod db;
pub mod event;
pub mod logging;
pub mod model;
pub mod repo;
pub mod schedule;
pub mod service;
pub mod stopwatch;
pub mod timefmt;
pub mod view;

pub use config::{default_data_dir, resolve_path, AppConfig, ConfigError};
pub use logging::{init_logging, LogLevel, LoggingError};
pub use model::item::{Item, ItemId, ItemValidationError, DEFAULT_TITLE};
pub use repo::item_repo::{ItemRepository, RepoError, RepoResult, SqliteItemRepository};
pub use schedule::{Clock, IntervalTimer, ManualClock, SystemClock};
pub use service::item_service::{ItemService, ItemServiceError, ServiceResult, StoreEvent};
pub use stopwatch::{Stopwatch, StopwatchControl, StopwatchEvent, StopwatchMode};
pub use timefmt::{format_hms, format_hms_secs, relative_prefix};
pub use view::detail::{DetailSnapshot, DetailView, QuickOffset};
pub use view::list::{ListRow, ListView};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
