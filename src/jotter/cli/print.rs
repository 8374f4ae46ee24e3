use chrono::{DateTime, Utc};
use colored::Colorize;
use jotter::api::{CmdMessage, MessageLevel};
use jotter::config::JotterConfig;
use jotter::index::DisplayNote;
use timeago::Formatter;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const LINE_WIDTH: usize = 100;
const TIME_WIDTH: usize = 14;

pub(super) fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => eprintln!("{}", message.content.yellow()),
            MessageLevel::Error => eprintln!("{}", message.content.red()),
        }
    }
}

pub(super) fn print_notes(notes: &[DisplayNote]) {
    if notes.is_empty() {
        println!("No notes found.");
        return;
    }

    for dn in notes {
        let idx_str = format!("{:>4}. ", dn.index);
        let time_ago = format_time_ago(dn.note.updated_at);

        let available = LINE_WIDTH.saturating_sub(idx_str.width() + TIME_WIDTH + 2);
        let title = truncate_to_width(&dn.title, available);
        let padding = available.saturating_sub(title.width());

        println!(
            "{}{}{}  {}",
            idx_str,
            title,
            " ".repeat(padding),
            time_ago.dimmed()
        );
    }
}

/// Each note under a header line, separated by a rule.
pub(super) fn print_rendered(notes: &[DisplayNote], rendered: &[String]) {
    if let [body] = rendered {
        println!("{}", body);
        return;
    }
    for (i, (dn, body)) in notes.iter().zip(rendered).enumerate() {
        if i > 0 {
            println!("\n================================\n");
        }
        println!("{} {}", dn.index.to_string().yellow(), dn.title.bold());
        println!("--------------------------------");
        println!("{}", body);
    }
}

pub(super) fn print_config(config: &JotterConfig) {
    for key in [
        "theme",
        "font",
        "autosave-ms",
        "overlay-tags",
        "paragraph-editable",
        "import-extensions",
    ] {
        if let Ok(value) = config.get(key) {
            println!("{} = {}", key.bold(), value);
        }
    }
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    let mut result = String::new();
    let mut current_width = 0;

    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            result.push('…');
            return result;
        }
        result.push(c);
        current_width += char_width;
    }

    result
}

fn format_time_ago(timestamp: DateTime<Utc>) -> String {
    let duration = Utc::now().signed_duration_since(timestamp);
    let time_str = Formatter::new().convert(duration.to_std().unwrap_or_default());
    format!("{:>width$}", time_str, width = TIME_WIDTH)
}
