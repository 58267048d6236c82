//! Application configuration.
//!
//! # Responsibility
//! - Provide defaults for storage path, logging and tick interval.
//! - Overlay values from an optional JSON file.
//! - Validate the merged result before anything is opened.
//!
//! # Invariants
//! - Fields missing from a config file keep their defaults.
//! - Relative paths in a config file are relative to the file's directory.
//! - `tick_interval_ms` is within `1..=60_000`.

use crate::logging::LogLevel;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DB_FILE_NAME: &str = "timestamper.sqlite3";
pub const LOG_DIR_NAME: &str = "logs";
pub const DATA_DIR_NAME: &str = "timestamper";
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 1000;
const MAX_TICK_INTERVAL_MS: u64 = 60_000;

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    /// The platform reports no per-user data directory.
    NoDataDir,
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "failed to parse config `{}`: {source}", path.display())
            }
            Self::NoDataDir => write!(
                f,
                "no user data directory found; pass --data-dir or set TIMESTAMPER_HOME"
            ),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::NoDataDir | Self::Invalid(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub log_dir: PathBuf,
    pub log_level: LogLevel,
    pub tick_interval_ms: u64,
}

/// On-disk shape; every field optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    db_path: Option<PathBuf>,
    log_dir: Option<PathBuf>,
    log_level: Option<LogLevel>,
    tick_interval_ms: Option<u64>,
}

impl AppConfig {
    /// Defaults rooted at `data_dir`.
    pub fn in_data_dir(data_dir: &Path) -> Self {
        Self {
            db_path: data_dir.join(DB_FILE_NAME),
            log_dir: data_dir.join(LOG_DIR_NAME),
            log_level: LogLevel::default(),
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
        }
    }

    /// Applies the values present in the JSON file at `path`.
    pub fn overlay_file(mut self, path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file: ConfigFile =
            serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        if let Some(db_path) = file.db_path {
            self.db_path = resolve_path(&db_path, base);
        }
        if let Some(log_dir) = file.log_dir {
            self.log_dir = resolve_path(&log_dir, base);
        }
        if let Some(level) = file.log_level {
            self.log_level = level;
        }
        if let Some(tick_interval_ms) = file.tick_interval_ms {
            self.tick_interval_ms = tick_interval_ms;
        }
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_ms == 0 || self.tick_interval_ms > MAX_TICK_INTERVAL_MS {
            return Err(ConfigError::Invalid(format!(
                "tick_interval_ms must be within 1..={MAX_TICK_INTERVAL_MS}, got {}",
                self.tick_interval_ms
            )));
        }
        if self.db_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("db_path cannot be empty".to_string()));
        }
        if self.log_dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("log_dir cannot be empty".to_string()));
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

/// Per-user data directory, e.g. `~/.local/share/timestamper` on Linux.
pub fn default_data_dir() -> Result<PathBuf, ConfigError> {
    dirs::data_dir()
        .map(|dir| dir.join(DATA_DIR_NAME))
        .ok_or(ConfigError::NoDataDir)
}

/// Joins a relative `path` onto `base`; absolute paths pass through.
pub fn resolve_path(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::{
        default_data_dir, resolve_path, AppConfig, ConfigError, DATA_DIR_NAME,
        DEFAULT_TICK_INTERVAL_MS,
    };
    use crate::logging::LogLevel;
    use std::path::Path;
    use std::time::Duration;

    fn base() -> AppConfig {
        AppConfig::in_data_dir(Path::new("/var/lib/timestamper"))
    }

    #[test]
    fn defaults_are_valid() {
        let config = base();
        config.validate().expect("defaults should validate");
        assert_eq!(config.tick_interval(), Duration::from_millis(DEFAULT_TICK_INTERVAL_MS));
        assert!(config.db_path.ends_with("timestamper.sqlite3"));
        assert_eq!(config.log_level, LogLevel::default());
    }

    #[test]
    fn zero_tick_interval_is_rejected() {
        let mut config = base();
        config.tick_interval_ms = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn relative_log_dir_is_accepted() {
        let mut config = base();
        config.log_dir = "logs".into();
        config.validate().expect("relative log dir should validate");
    }

    #[test]
    fn default_data_dir_is_absolute_and_named() {
        let dir = default_data_dir().expect("test environment has a data directory");
        assert!(dir.is_absolute());
        assert!(dir.ends_with(DATA_DIR_NAME));
    }

    #[test]
    fn resolve_path_keeps_absolute_and_joins_relative() {
        let base = Path::new("/srv/app");
        assert_eq!(resolve_path(Path::new("/tmp/logs"), base), Path::new("/tmp/logs"));
        assert_eq!(resolve_path(Path::new("logs"), base), Path::new("/srv/app/logs"));
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "tick_interval_ms": 100 }"#).unwrap();

        let config = base().overlay_file(&path).unwrap();
        assert_eq!(config.tick_interval_ms, 100);
        assert_eq!(config.log_level, base().log_level);
        assert_eq!(config.db_path, base().db_path);
    }

    #[test]
    fn file_paths_are_relative_to_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{ "log_dir": "logs", "db_path": "/data/items.sqlite3", "log_level": "warn" }"#,
        )
        .unwrap();

        let config = base().overlay_file(&path).unwrap();
        assert_eq!(config.log_dir, dir.path().join("logs"));
        assert_eq!(config.db_path, Path::new("/data/items.sqlite3"));
        assert_eq!(config.log_level, LogLevel::Warn);
    }

    #[test]
    fn unknown_log_level_in_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "log_level": "verbose" }"#).unwrap();

        assert!(matches!(
            base().overlay_file(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn malformed_file_reports_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            base().overlay_file(&path),
            Err(ConfigError::Parse { .. })
        ));
    }
}
