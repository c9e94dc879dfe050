use chrono::{DateTime, SecondsFormat, Utc};
use colored::Colorize;
use shelf::api::{CmdMessage, MessageLevel};
use shelf::error::{Result, ShelfError};
use shelf::model::Item;
use timeago::Formatter;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const LINE_WIDTH: usize = 100;
const ID_WIDTH: usize = 20;
const FORMAT_WIDTH: usize = 6;
const DATE_WIDTH: usize = 16;
const CSV_HEADER: &str = "id,title,memo,format,createdAt,updatedAt";

pub(super) fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => println!("{}", message.content.yellow()),
            MessageLevel::Error => println!("{}", message.content.red()),
        }
    }
}

pub(super) fn print_item_list(items: &[Item]) {
    if items.is_empty() {
        println!("No items found.");
        return;
    }
    for item in items {
        println!("{}", render_list_line(item));
    }
}

/// One `list` line: id, title, format, last update.
pub(super) fn render_list_line(item: &Item) -> String {
    let id = pad_to_width(&truncate_to_width(&item.id, ID_WIDTH), ID_WIDTH);
    let updated = item.updated_at.format("%Y-%m-%d %H:%M").to_string();

    let fixed = ID_WIDTH + FORMAT_WIDTH + DATE_WIDTH + 3;
    let available = LINE_WIDTH.saturating_sub(fixed);
    let title = pad_to_width(&truncate_to_width(&item.title, available), available);
    let format = format!("{:<width$}", item.format.as_str(), width = FORMAT_WIDTH);

    format!(
        "{} {} {} {}",
        id.yellow(),
        title,
        format.cyan(),
        updated.dimmed()
    )
}

pub(super) fn print_item(item: &Item, text: &str) {
    println!("{} {}", item.id.yellow(), item.title.bold());
    if let Some(memo) = &item.memo {
        println!("{} {}", "memo:".dimmed(), memo);
    }
    println!(
        "{} {}  {} {}",
        "format:".dimmed(),
        item.format,
        "source:".dimmed(),
        item.source_filename
    );
    println!(
        "{} {}  {} {}",
        "added:".dimmed(),
        format_time_ago(item.created_at),
        "updated:".dimmed(),
        format_time_ago(item.updated_at)
    );
    println!("--------------------------------");
    print!("{}", text);
    if !text.is_empty() && !text.ends_with('\n') {
        println!();
    }
}

pub(super) fn render_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| ShelfError::StorageFailure(e.into()))
}

/// CSV with a header row, fields quoted as RFC 4180 requires.
pub(super) fn render_csv(items: &[Item]) -> String {
    let mut out = String::with_capacity(CSV_HEADER.len() + 1 + items.len() * 80);
    out.push_str(CSV_HEADER);
    out.push_str("\r\n");

    for item in items {
        let created = timestamp(item.created_at);
        let updated = timestamp(item.updated_at);
        let fields: [&str; 6] = [
            &item.id,
            &item.title,
            item.memo.as_deref().unwrap_or(""),
            item.format.as_str(),
            &created,
            &updated,
        ];
        let row: Vec<String> = fields.iter().map(|f| csv_field(f)).collect();
        out.push_str(&row.join(","));
        out.push_str("\r\n");
    }
    out
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\r', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }

    let mut result = String::new();
    let mut current_width = 0;
    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            break;
        }
        result.push(c);
        current_width += char_width;
    }
    result.push('…');
    result
}

fn pad_to_width(s: &str, width: usize) -> String {
    let padding = width.saturating_sub(s.width());
    format!("{}{}", s, " ".repeat(padding))
}

fn format_time_ago(timestamp: DateTime<Utc>) -> String {
    let duration = Utc::now().signed_duration_since(timestamp);
    Formatter::new().convert(duration.to_std().unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use shelf::model::Format;

    fn item(id: &str, title: &str, memo: Option<&str>) -> Item {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        Item {
            id: id.into(),
            title: title.into(),
            memo: memo.map(str::to_string),
            format: Format::Epub,
            created_at: at,
            updated_at: at,
            source_filename: format!("{}.epub", id),
        }
    }

    #[test]
    fn csv_has_header_and_rows() {
        let csv = render_csv(&[item("a", "Plain", None)]);
        let lines: Vec<&str> = csv.split("\r\n").collect();
        assert_eq!(lines[0], CSV_HEADER);
        assert_eq!(
            lines[1],
            "a,Plain,,epub,2024-03-01T12:30:00Z,2024-03-01T12:30:00Z"
        );
        assert_eq!(lines[2], "");
    }

    #[test]
    fn csv_quotes_special_fields() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a, b"), "\"a, b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(csv_field("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn list_line_contains_fields() {
        colored::control::set_override(false);
        let line = render_list_line(&item("book_a", "My Book", None));
        assert!(line.starts_with("book_a "));
        assert!(line.contains("My Book"));
        assert!(line.contains("epub"));
        assert!(line.ends_with("2024-03-01 12:30"));
    }

    #[test]
    fn long_titles_are_truncated() {
        colored::control::set_override(false);
        let long = "x".repeat(200);
        let line = render_list_line(&item("a", &long, None));
        assert!(line.contains('…'));
        assert_eq!(line.width(), LINE_WIDTH);
    }

    #[test]
    fn truncation_respects_wide_chars() {
        let s = truncate_to_width("日本語のタイトル", 7);
        assert!(s.width() <= 7);
        assert!(s.ends_with('…'));
        assert_eq!(truncate_to_width("short", 10), "short");
    }

    #[test]
    fn json_is_pretty() {
        let json = render_json(&item("a", "T", Some("m"))).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["memo"], "m");
        assert!(json.contains('\n'));
    }
}
