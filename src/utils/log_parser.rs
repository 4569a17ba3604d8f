//! Raw log line parser
//!
//! Expected layout: `2025-12-05 10:15:30 ERROR OrderService - Failed to connect`
//! (timestamp, level, then the rest of the line as the message).

use chrono::{Local, NaiveDateTime};

use crate::models::LogEntry;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const TIMESTAMP_LEN: usize = 19;
const OUTPUT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

pub const UNKNOWN_LEVEL: &str = "UNKNOWN";

/// Parse one raw line. Lines that do not fit the layout are kept whole with level `UNKNOWN`.
pub fn parse_line(line: &str, service_name: Option<&str>) -> LogEntry {
    let service_name = service_name.map(str::to_string);

    match split_line(line) {
        Some((timestamp, level, message)) => LogEntry {
            id: None,
            timestamp: Some(timestamp.format(OUTPUT_FORMAT).to_string()),
            level: Some(level.to_string()),
            service_name,
            message: message.to_string(),
            raw_line: Some(line.to_string()),
        },
        None => LogEntry {
            id: None,
            timestamp: Some(Local::now().naive_local().format(OUTPUT_FORMAT).to_string()),
            level: Some(UNKNOWN_LEVEL.to_string()),
            service_name,
            message: line.to_string(),
            raw_line: Some(line.to_string()),
        },
    }
}

pub fn parse_lines(lines: &[String], service_name: Option<&str>) -> Vec<LogEntry> {
    lines.iter().map(|line| parse_line(line, service_name)).collect()
}

fn split_line(line: &str) -> Option<(NaiveDateTime, &str, &str)> {
    let ts = line.get(..TIMESTAMP_LEN)?;
    let timestamp = NaiveDateTime::parse_from_str(ts, TIMESTAMP_FORMAT).ok()?;

    // One separator character after the timestamp
    let remaining = line.get(TIMESTAMP_LEN + 1..)?.trim();
    let (level, message) = remaining.split_once(' ').unwrap_or((remaining, ""));

    Some((timestamp, level, message))
}
