use chrono::{Local, TimeZone};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::domain::{conversation::ConversationRecord, sort_policy::SortMode};

const MIN_TITLE_WIDTH: usize = 8;
const ELLIPSIS: char = '\u{2026}';

/// Renders the chat list front to back as plain text lines.
pub fn render(records: &[&ConversationRecord], mode: SortMode, width: usize) -> Vec<String> {
    let mut lines = vec![format!("sort mode: {mode}")];
    lines.extend(build_chat_list_lines(records, width));
    lines
}

fn build_chat_list_lines(records: &[&ConversationRecord], width: usize) -> Vec<String> {
    let (pinned, regular): (Vec<_>, Vec<_>) = records
        .iter()
        .copied()
        .partition(|record| record.pinned_rank().is_some());

    let mut lines = Vec::new();
    let has_pinned = !pinned.is_empty();

    if has_pinned {
        lines.push(section_header("Pinned"));
        lines.extend(pinned.iter().map(|record| chat_line(record, width)));
    }

    if !regular.is_empty() || !has_pinned {
        lines.push(section_header("All Chats"));
        lines.extend(regular.iter().map(|record| chat_line(record, width)));
    }

    lines
}

fn section_header(title: &str) -> String {
    format!("-- {title} --")
}

fn chat_line(record: &ConversationRecord, width: usize) -> String {
    let badge = match record.unread_count() {
        0 => String::new(),
        count => format!("({count})"),
    };
    let suffix = format!(" {badge:>6} {}", format_chat_timestamp(record.last_activity_ms()));
    let title_width = width
        .saturating_sub(UnicodeWidthStr::width(suffix.as_str()))
        .max(MIN_TITLE_WIDTH);

    format!("{}{suffix}", fit_to_width(record.title(), title_width))
}

/// Truncates with an ellipsis or pads with spaces to exactly `width` columns.
fn fit_to_width(text: &str, width: usize) -> String {
    if UnicodeWidthStr::width(text) <= width {
        let padding = width - UnicodeWidthStr::width(text);
        return format!("{text}{}", " ".repeat(padding));
    }

    let mut fitted = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let ch_width = UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + ch_width + 1 > width {
            break;
        }
        fitted.push(ch);
        used += ch_width;
    }
    fitted.push(ELLIPSIS);
    used += 1;

    format!("{fitted}{}", " ".repeat(width.saturating_sub(used)))
}

fn format_chat_timestamp(timestamp_ms: i64) -> String {
    let datetime = match Local.timestamp_millis_opt(timestamp_ms) {
        chrono::LocalResult::Single(dt) => dt,
        chrono::LocalResult::Ambiguous(dt, _) => dt,
        chrono::LocalResult::None => return "     ".to_owned(),
    };

    if datetime.date_naive() == Local::now().date_naive() {
        datetime.format("%H:%M").to_string()
    } else {
        datetime.format("%d.%m").to_string()
    }
}
