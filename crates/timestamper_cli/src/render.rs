//! Plain-text rendering of the list and detail screens.

use timestamper_core::{DetailSnapshot, ListRow, QuickOffset, StopwatchControl};

pub fn list_screen(rows: &[ListRow], error: Option<&str>) -> String {
    let mut out = String::new();
    if rows.is_empty() {
        out.push_str("No items yet. Create one with `timestamper add`.\n");
    }
    for row in rows {
        let marker = if row.selected { '>' } else { ' ' };
        out.push_str(&format!(
            "{marker}{:>3}. {}  ({} notes)\n      {}\n      id: {}\n",
            row.position, row.title, row.note_count, row.subtitle, row.id
        ));
    }
    if let Some(error) = error {
        out.push_str(&format!("error: {error}\n"));
    }
    out
}

pub fn detail_screen(snapshot: &DetailSnapshot) -> String {
    if snapshot.controls.is_empty() && snapshot.title.is_empty() {
        let mut out = String::from("(item deleted)\n");
        if let Some(error) = snapshot.error.as_deref() {
            out.push_str(&format!("error: {error}\n"));
        }
        return out;
    }

    let mut out = String::new();
    out.push_str(&format!("{}\n", snapshot.title));
    out.push_str(&format!("{}\n", "-".repeat(snapshot.title.chars().count().max(8))));
    out.push_str(&format!(
        "[{}] {:.1}s  {}   {}\n",
        snapshot.elapsed_display,
        snapshot.elapsed_seconds,
        snapshot.mode,
        controls_line(&snapshot.controls)
    ));

    if snapshot.notes.is_empty() {
        out.push_str("  (no notes)\n");
    }
    for (index, note) in snapshot.notes.iter().enumerate() {
        out.push_str(&format!("  {:>2}. {note}\n", index + 1));
    }

    let offsets = QuickOffset::ALL
        .iter()
        .map(|offset| offset.label())
        .collect::<Vec<_>>()
        .join(" ");
    out.push_str(&format!("Add Timestamp: {offsets}\n"));
    if snapshot.input_focused {
        out.push_str(&format!("> {}\n", snapshot.note_input));
    }
    if snapshot.delete_pending {
        out.push_str("Delete Item? Are you sure? [y/N]\n");
    }
    if let Some(error) = snapshot.error.as_deref() {
        out.push_str(&format!("error: {error}\n"));
    }
    out
}

fn controls_line(controls: &[StopwatchControl]) -> String {
    controls
        .iter()
        .map(|control| format!("[{}]", control.label()))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::{detail_screen, list_screen};
    use timestamper_core::{DetailSnapshot, StopwatchControl, StopwatchMode};

    fn snapshot() -> DetailSnapshot {
        DetailSnapshot {
            title: "Session 1".to_string(),
            elapsed_display: "00:01:35".to_string(),
            elapsed_seconds: 95.0,
            mode: StopwatchMode::Paused,
            controls: vec![StopwatchControl::Resume, StopwatchControl::Reset],
            notes: vec!["00:01:05: goal".to_string()],
            note_input: "00:01:25: ".to_string(),
            input_focused: true,
            delete_pending: false,
            error: None,
        }
    }

    #[test]
    fn detail_screen_shows_stopwatch_controls_and_notes() {
        let text = detail_screen(&snapshot());
        assert!(text.contains("[00:01:35] 95.0s  paused   [Resume] [Reset]"));
        assert!(text.contains(" 1. 00:01:05: goal"));
        assert!(text.contains("> 00:01:25: "));
        assert!(text.contains("-60s -30s -10s 0s"));
    }

    #[test]
    fn deleted_item_renders_empty_state() {
        let mut empty = snapshot();
        empty.title = String::new();
        empty.controls.clear();
        assert_eq!(detail_screen(&empty), "(item deleted)\n");
    }

    #[test]
    fn empty_list_has_hint() {
        assert!(list_screen(&[], None).contains("No items yet"));
        assert!(list_screen(&[], Some("boom")).contains("error: boom"));
    }
}
