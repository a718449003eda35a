//! Helper functions and utilities
//!
//! Small text helpers shared by the handlers and services.

use chrono::{DateTime, Utc};

/// Format a registration timestamp the way admin listings show it
pub fn format_short_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%d/%m %H:%M").to_string()
}

/// Escape text for Telegram HTML parse mode
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Strip a leading `@` from a Telegram handle
pub fn strip_handle(handle: &str) -> &str {
    handle.trim().trim_start_matches('@')
}

/// Split command arguments into the first word and the remainder
pub fn split_first_word(args: &str) -> (&str, &str) {
    let args = args.trim();
    match args.split_once(char::is_whitespace) {
        Some((first, rest)) => (first, rest.trim_start()),
        None => (args, ""),
    }
}

/// Truncate text to a maximum number of characters with ellipsis
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let kept: String = text.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Telegram rejects messages longer than this
pub const MAX_MESSAGE_CHARS: usize = 4096;

/// Split a long report into chunks that fit one message, breaking at line ends
pub fn split_message(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in text.lines() {
        let line_len = line.chars().count();
        if current_len > 0 && current_len + 1 + line_len > max_chars {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push('\n');
            current_len += 1;
        }
        if line_len > max_chars {
            current.push_str(&truncate_text(line, max_chars));
            current_len += max_chars;
        } else {
            current.push_str(line);
            current_len += line_len;
        }
    }

    if !current.is_empty() || chunks.is_empty() {
        chunks.push(current);
    }
    chunks
}
