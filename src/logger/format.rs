//! Log formatting and output with ANSI colors and text wrapping
//!
//! Handles:
//! - Colorized console output with tag and level formatting
//! - Text wrapping at word boundaries
//! - Dual output (console + file)
//! - Broken pipe handling for piped commands

use super::file::write_to_file;
use super::tags::LogTag;
use chrono::Local;
use colored::*;
use once_cell::sync::Lazy;
use std::io::{stdout, ErrorKind, Write};

/// Display configuration
const LOG_SHOW_DATE: bool = false;
const LOG_SHOW_TIME: bool = true;

/// Log format widths for alignment
const TAG_WIDTH: usize = 10;
const LOG_TYPE_WIDTH: usize = 8;
const BRACKET_SPACE_WIDTH: usize = 3;
const TOTAL_PREFIX_WIDTH: usize = TAG_WIDTH + LOG_TYPE_WIDTH + BRACKET_SPACE_WIDTH * 2;

/// Maximum line length before wrapping
const MAX_LINE_LENGTH: usize = 145;

/// Format and output a log message
pub fn format_and_log(tag: LogTag, log_type: &str, message: &str) {
    let now = Local::now();
    let date = now.format("%Y-%m-%d").to_string();
    let time = now.format("%H:%M:%S").to_string();

    let mut prefix = String::new();
    if LOG_SHOW_DATE && LOG_SHOW_TIME {
        prefix = format!("{} {} ", date, time);
    } else if LOG_SHOW_DATE {
        prefix = format!("{} ", date);
    } else if LOG_SHOW_TIME {
        prefix = format!("{} ", time);
    }

    let prefix = if !prefix.is_empty() {
        prefix.dimmed().to_string()
    } else {
        String::new()
    };

    // Format tag with color
    let tag_str = format_tag(&tag);

    // Format log type with color
    let log_type_str = format_log_type(log_type);

    // Build the base log line
    let base_line = format!("{}[{}] [{}] ", prefix, tag_str, log_type_str);

    let base_length = strip_ansi_codes(&base_line)
        .len()
        .max(TOTAL_PREFIX_WIDTH + prefix.len());
    let available_space = if MAX_LINE_LENGTH > base_length {
        MAX_LINE_LENGTH - base_length
    } else {
        50
    };

    // Split message into chunks that fit
    let message_chunks = wrap_text(message, available_space);

    // Print first line
    let console_line = format!("{}{}", base_line, message_chunks[0]);
    print_stdout_safe(&console_line);

    // Write to file
    let timestamp = now.format("%Y-%m-%d %H:%M:%S").to_string();
    let tag_clean = tag.to_plain_string();
    let file_line = format!(
        "{} [{}] [{}] {}",
        timestamp, tag_clean, log_type, message_chunks[0]
    );
    write_to_file(&file_line);

    // Print continuation lines
    if message_chunks.len() > 1 {
        let continuation_prefix = format!(
            "{}{}",
            " ".repeat(strip_ansi_codes(&prefix).len()),
            " ".repeat(TOTAL_PREFIX_WIDTH)
        );
        for chunk in &message_chunks[1..] {
            let console_continuation = format!("{}{}", continuation_prefix, chunk);
            print_stdout_safe(&console_continuation);

            let file_continuation =
                format!("{} [{}] [{}] {}", timestamp, tag_clean, log_type, chunk);
            write_to_file(&file_continuation);
        }
    }
}

/// Format a tag with appropriate color
fn format_tag(tag: &LogTag) -> ColoredString {
    match tag {
        LogTag::System => format!("{:<width$}", "SYSTEM", width = TAG_WIDTH)
            .bright_yellow()
            .bold(),
        LogTag::Config => format!("{:<width$}", "CONFIG", width = TAG_WIDTH)
            .bright_white()
            .bold(),
        LogTag::Auth => format!("{:<width$}", "AUTH", width = TAG_WIDTH)
            .bright_magenta()
            .bold(),
        LogTag::Channel => format!("{:<width$}", "CHANNEL", width = TAG_WIDTH)
            .bright_cyan()
            .bold(),
        LogTag::Media => format!("{:<width$}", "MEDIA", width = TAG_WIDTH)
            .bright_green()
            .bold(),
        LogTag::Storage => format!("{:<width$}", "STORAGE", width = TAG_WIDTH)
            .bright_blue()
            .bold(),
        LogTag::RateLimit => format!("{:<width$}", "RATELIMIT", width = TAG_WIDTH)
            .bright_red()
            .bold(),
        LogTag::Summary => format!("{:<width$}", "SUMMARY", width = TAG_WIDTH)
            .bright_white()
            .bold(),
    }
}

/// Format a log type (level) with appropriate color
fn format_log_type(log_type: &str) -> ColoredString {
    let padded = format!("{:<width$}", log_type, width = LOG_TYPE_WIDTH);
    match log_type {
        "ERROR" => padded.bright_red().bold(),
        "WARNING" => padded.yellow().bold(),
        "INFO" => padded.normal(),
        "DEBUG" => padded.dimmed(),
        "VERBOSE" => padded.dimmed(),
        _ => padded.normal(),
    }
}

/// Wrap text at word boundaries to fit within max_width
fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    if text.len() <= max_width {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current = word.to_string();
        } else if current.len() + 1 + word.len() <= max_width {
            current.push(' ');
            current.push_str(word);
        } else {
            chunks.push(current);
            current = word.to_string();
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    if chunks.is_empty() {
        chunks.push(text.to_string());
    }

    chunks
}

static ANSI_RE: Lazy<regex::Regex> =
    Lazy::new(|| regex::Regex::new(r"\x1b\[[0-9;]*m").expect("valid ANSI regex"));

/// Strip ANSI escape codes for length calculations
fn strip_ansi_codes(text: &str) -> String {
    ANSI_RE.replace_all(text, "").to_string()
}

/// Print to stdout, swallowing broken pipes (e.g. `telescrape | head`)
fn print_stdout_safe(line: &str) {
    let mut out = stdout();
    if let Err(e) = writeln!(out, "{}", line) {
        if e.kind() != ErrorKind::BrokenPipe {
            eprintln!("{}", line);
        }
    }
}
