//! Elapsed-time display formatting.
//!
//! # Responsibility
//! - Render elapsed seconds as `HH:MM:SS`.
//! - Build relative-timestamp note prefixes for the "Add Timestamp" flow.
//!
//! # Invariants
//! - Fractional seconds are truncated, never rounded.
//! - Each field is at least two digits; hours may grow wider than two.
//! - Relative timestamps never go below zero.

const SECONDS_PER_HOUR: u64 = 3600;
const SECONDS_PER_MINUTE: u64 = 60;

/// Formats non-negative seconds as `HH:MM:SS`.
///
/// Negative, NaN and infinite inputs render as `00:00:00`.
pub fn format_hms(seconds: f64) -> String {
    let whole = if seconds.is_finite() && seconds > 0.0 {
        seconds.trunc() as u64
    } else {
        0
    };
    format_hms_secs(whole)
}

/// Formats whole seconds as `HH:MM:SS`.
pub fn format_hms_secs(seconds: u64) -> String {
    let hours = seconds / SECONDS_PER_HOUR;
    let minutes = (seconds % SECONDS_PER_HOUR) / SECONDS_PER_MINUTE;
    let secs = (seconds % SECONDS_PER_HOUR) % SECONDS_PER_MINUTE;
    format!("{hours:02}:{minutes:02}:{secs:02}")
}

/// Computes `max(0, elapsed - difference)` in whole seconds.
pub fn relative_seconds(elapsed_secs: u64, difference_secs: u64) -> u64 {
    elapsed_secs.saturating_sub(difference_secs)
}

/// Builds the note-input prefill `"<HH:MM:SS>: "` for a relative mark.
pub fn relative_prefix(elapsed_secs: u64, difference_secs: u64) -> String {
    format!(
        "{}: ",
        format_hms_secs(relative_seconds(elapsed_secs, difference_secs))
    )
}
