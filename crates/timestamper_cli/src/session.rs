//! Interactive detail-screen session.
//!
//! # Responsibility
//! - Parse one command per input line and apply it to a `DetailView`.
//! - Deliver due stopwatch ticks before every command.
//!
//! # Invariants
//! - Runs on a single thread; the stopwatch only advances inside `tick()`.
//! - Store failures stay on the view, are printed with the next screen, and
//!   the session keeps running.

use log::{debug, info};
use std::io::{self, BufRead, Write};
use timestamper_core::{
    Clock, DetailView, ItemRepository, ItemService, QuickOffset, StopwatchControl,
};

use crate::render::detail_screen;

const HELP: &str = "commands: start | pause | resume | reset | mark <60|30|10|0> | \
note [text] | rename <title> | status | delete | help | quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Control(StopwatchControl),
    Mark(QuickOffset),
    /// Submit the note input, optionally appending text to it first.
    Note(Option<String>),
    Rename(String),
    Status,
    Delete,
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> Result<SessionCommand, String> {
    let trimmed = line.trim();
    let (head, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (trimmed, ""),
    };

    let command = match head.to_ascii_lowercase().as_str() {
        "start" => SessionCommand::Control(StopwatchControl::Start),
        "pause" => SessionCommand::Control(StopwatchControl::Pause),
        "resume" => SessionCommand::Control(StopwatchControl::Resume),
        "reset" | "stop" => SessionCommand::Control(StopwatchControl::Reset),
        "mark" => {
            let seconds = if rest.is_empty() {
                0
            } else {
                rest.trim_start_matches('-')
                    .trim_end_matches('s')
                    .parse::<u64>()
                    .map_err(|_| format!("invalid offset `{rest}`"))?
            };
            let offset = QuickOffset::from_seconds(seconds)
                .ok_or_else(|| format!("offset must be one of 60|30|10|0, got {seconds}"))?;
            SessionCommand::Mark(offset)
        }
        "note" => SessionCommand::Note((!rest.is_empty()).then(|| rest.to_string())),
        "rename" if !rest.is_empty() => SessionCommand::Rename(rest.to_string()),
        "rename" => return Err("rename needs a title".to_string()),
        "status" | "" => SessionCommand::Status,
        "delete" => SessionCommand::Delete,
        "help" | "?" => SessionCommand::Help,
        "quit" | "exit" | "q" => SessionCommand::Quit,
        other => return Err(format!("unknown command `{other}`")),
    };
    Ok(command)
}

/// Runs the command loop until `quit`, end of input, or item deletion.
pub fn run_session<R, C, I, O>(
    service: &ItemService<R>,
    detail: &mut DetailView<C>,
    mut input: I,
    mut out: O,
) -> io::Result<()>
where
    R: ItemRepository,
    C: Clock,
    I: BufRead,
    O: Write,
{
    writeln!(out, "{}", detail_screen(&detail.snapshot()))?;
    writeln!(out, "{HELP}")?;

    let mut line = String::new();
    loop {
        line.clear();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        detail.tick();
        detail.sync(service);

        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(message) => {
                writeln!(out, "error: {message}")?;
                continue;
            }
        };

        match command {
            SessionCommand::Control(control) => {
                if !detail.control(control) {
                    writeln!(out, "`{}` is not available right now", control.label())?;
                }
            }
            SessionCommand::Mark(offset) => {
                detail.mark(offset);
            }
            SessionCommand::Note(text) => {
                if let Some(text) = text {
                    let combined = if detail.input_focused() {
                        format!("{}{text}", detail.note_input())
                    } else {
                        text
                    };
                    detail.set_note_input(combined);
                }
                if let Err(err) = detail.submit_note(service) {
                    debug!("event=session_note module=cli status=error error_code={}", err.code());
                }
            }
            SessionCommand::Rename(title) => {
                if let Err(err) = detail.rename(service, &title) {
                    debug!("event=session_rename module=cli status=error error_code={}", err.code());
                }
            }
            SessionCommand::Status => {}
            SessionCommand::Delete => {
                detail.request_delete();
                writeln!(out, "{}", detail_screen(&detail.snapshot()))?;
                line.clear();
                input.read_line(&mut line)?;
                if matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes") {
                    if let Err(err) = detail.confirm_delete(service) {
                        debug!(
                            "event=session_delete module=cli status=error error_code={}",
                            err.code()
                        );
                    }
                } else {
                    detail.cancel_delete();
                }
            }
            SessionCommand::Help => {
                writeln!(out, "{HELP}")?;
                continue;
            }
            SessionCommand::Quit => break,
        }

        detail.sync(service);
        writeln!(out, "{}", detail_screen(&detail.snapshot()))?;
        if detail.is_empty() {
            break;
        }
    }

    info!(
        "event=session_end module=cli status=ok elapsed_ms={}",
        detail.stopwatch().elapsed().as_millis()
    );
    Ok(())
}
