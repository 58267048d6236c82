//! Terminal front end for Timestamper.
//!
//! # Responsibility
//! - Resolve configuration (file, environment, flags) and bootstrap logging.
//! - Open the item store explicitly and hand it to the list/detail views.
//! - Render screens as plain text and run interactive stopwatch sessions.

mod render;
mod session;

use clap::{Parser, Subcommand};
use log::{error, warn};
use std::error::Error;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use timestamper_core::db::open_db;
use timestamper_core::{
    default_data_dir, init_logging, resolve_path, AppConfig, DetailView, ItemId, ItemRepository,
    ItemService, ItemServiceError, ListView, LogLevel, SqliteItemRepository, SystemClock,
};

#[derive(Parser, Debug)]
#[command(name = "timestamper", version, about = "Stopwatch sessions with timestamped notes")]
struct Cli {
    /// Directory holding the database and logs unless overridden.
    /// Defaults to the platform's per-user data directory.
    #[arg(long, env = "TIMESTAMPER_HOME", global = true)]
    data_dir: Option<PathBuf>,

    /// JSON config file. Flags and environment variables override its values.
    #[arg(long, env = "TIMESTAMPER_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// SQLite database file.
    #[arg(long, env = "TIMESTAMPER_DB", global = true)]
    db: Option<PathBuf>,

    /// Directory for rolling log files.
    #[arg(long, env = "TIMESTAMPER_LOG_DIR", global = true)]
    log_dir: Option<PathBuf>,

    /// trace|debug|info|warn|error
    #[arg(long, env = "TIMESTAMPER_LOG_LEVEL", global = true)]
    log_level: Option<LogLevel>,

    /// Stopwatch tick interval in milliseconds (e.g. 1000 or 100).
    #[arg(long, env = "TIMESTAMPER_TICK_MS", global = true)]
    tick_ms: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List all items, oldest first.
    List,
    /// Create a new item.
    Add {
        #[arg(long)]
        title: Option<String>,
    },
    /// Print one item with its notes.
    Show { item: String },
    /// Append a note to an item.
    Note { item: String, text: String },
    /// Change an item's title.
    Rename { item: String, title: String },
    /// Delete an item and all of its notes.
    Delete {
        item: String,
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
    /// Open an interactive stopwatch session for an item.
    Session { item: String },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_exit module=cli status=error error={err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let config = resolve_config(&cli)?;
    if let Err(err) = init_logging(config.log_level, &config.log_dir) {
        eprintln!("warning: file logging disabled: {err}");
    }

    let conn = open_db(&config.db_path)?;
    let service = ItemService::new(SqliteItemRepository::try_new(&conn)?);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Command::List => {
            let list = ListView::open(&service);
            write!(out, "{}", render::list_screen(&list.rows(), list.error()))?;
        }
        Command::Add { title } => {
            let mut list = ListView::open(&service);
            let item = list.add_item(&service, title.as_deref())?;
            writeln!(out, "created {} ({})", item.title, item.id)?;
        }
        Command::Show { item } => {
            let detail = open_detail(&service, &item, &config)?;
            write!(out, "{}", render::detail_screen(&detail.snapshot()))?;
        }
        Command::Note { item, text } => {
            let mut detail = open_detail(&service, &item, &config)?;
            detail.append_note(&service, &text)?;
            write!(out, "{}", render::detail_screen(&detail.snapshot()))?;
        }
        Command::Rename { item, title } => {
            let mut detail = open_detail(&service, &item, &config)?;
            detail.rename(&service, &title)?;
            write!(out, "{}", render::detail_screen(&detail.snapshot()))?;
        }
        Command::Delete { item, yes } => {
            let mut detail = open_detail(&service, &item, &config)?;
            detail.request_delete();
            if !yes {
                write!(out, "{}", render::detail_screen(&detail.snapshot()))?;
                out.flush()?;
                let mut answer = String::new();
                io::stdin().lock().read_line(&mut answer)?;
                if !matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes") {
                    detail.cancel_delete();
                    writeln!(out, "cancelled")?;
                    return Ok(());
                }
            }
            detail.confirm_delete(&service)?;
            writeln!(out, "deleted")?;
        }
        Command::Session { item } => {
            let mut detail = open_detail(&service, &item, &config)?;
            session::run_session(&service, &mut detail, io::stdin().lock(), &mut out)?;
        }
    }

    Ok(())
}

/// Defaults, then the config file, then flags and environment.
/// Relative paths given on the command line are relative to the working directory.
fn resolve_config(cli: &Cli) -> Result<AppConfig, Box<dyn Error>> {
    let cwd = std::env::current_dir()?;
    let data_dir = match cli.data_dir.as_deref() {
        Some(dir) => resolve_path(dir, &cwd),
        None => default_data_dir()?,
    };

    let mut config = AppConfig::in_data_dir(&data_dir);
    if let Some(path) = cli.config.as_deref() {
        config = config.overlay_file(resolve_path(path, &cwd))?;
    }

    if let Some(db) = cli.db.as_deref() {
        config.db_path = resolve_path(db, &cwd);
    }
    if let Some(log_dir) = cli.log_dir.as_deref() {
        config.log_dir = resolve_path(log_dir, &cwd);
    }
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    if let Some(tick_ms) = cli.tick_ms {
        config.tick_interval_ms = tick_ms;
    }

    config.validate()?;
    Ok(config)
}

fn open_detail<R: ItemRepository>(
    service: &ItemService<R>,
    item_ref: &str,
    config: &AppConfig,
) -> Result<DetailView<SystemClock>, Box<dyn Error>> {
    let id = resolve_item_ref(service, item_ref)?;
    let detail = DetailView::open(service, id, SystemClock::new(), config.tick_interval())?;
    Ok(detail)
}

/// Accepts a full item UUID or a 1-based list position.
fn resolve_item_ref<R: ItemRepository>(
    service: &ItemService<R>,
    item_ref: &str,
) -> Result<ItemId, Box<dyn Error>> {
    let trimmed = item_ref.trim();
    if let Ok(id) = uuid::Uuid::parse_str(trimmed) {
        return Ok(id);
    }

    let position: usize = trimmed
        .parse()
        .map_err(|_| format!("`{trimmed}` is neither an item id nor a list position"))?;
    let mut list = ListView::open(service);
    if let Some(err) = list.error() {
        return Err(err.to_string().into());
    }
    match list.select_position(position) {
        Some(id) => Ok(id),
        None => {
            warn!("event=item_resolve module=cli status=error position={position}");
            Err(Box::new(ItemServiceError::InconsistentState(
                "no item at that list position",
            )))
        }
    }
}
