//! Log rendering.
//!
//! Turns raw payloads and structured `{timestamp, message}` records into
//! displayable lines. Everything here is pure so it can be tested natively.

use chrono::{DateTime, Local, TimeZone};
use serde::Deserialize;

/// Severity guessed from a message body.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Info,
    Warn,
    Error,
    Debug,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::Debug => "debug",
        }
    }
}

/// Classify a message by keyword. Checked in priority order, so a message
/// mentioning both "error" and "warn" is an error.
pub fn classify(message: &str) -> Level {
    let lower = message.to_lowercase();
    if lower.contains("error") || lower.contains("failed") {
        Level::Error
    } else if lower.contains("warn") {
        Level::Warn
    } else if lower.contains("debug") {
        Level::Debug
    } else {
        Level::Info
    }
}

/// Escape HTML-significant characters. Not idempotent: escaping twice
/// double-escapes.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Format a point in time as a bracketed time of day, e.g. `[14:03:22]`.
pub fn format_timestamp<Tz: TimeZone>(time: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("[{}]", time.format("%H:%M:%S"))
}

pub fn format_now() -> String {
    format_timestamp(&Local::now())
}

/// Timestamp as sent by the server: epoch milliseconds or an RFC 3339 string.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum RecordTime {
    EpochMillis(f64),
    Text(String),
}

impl RecordTime {
    pub fn to_local(&self) -> Option<DateTime<Local>> {
        match self {
            RecordTime::EpochMillis(ms) if ms.is_finite() => {
                Local.timestamp_millis_opt(*ms as i64).single()
            }
            RecordTime::EpochMillis(_) => None,
            RecordTime::Text(s) => DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|t| t.with_timezone(&Local)),
        }
    }
}

/// A structured log record.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct LogRecord {
    pub timestamp: RecordTime,
    pub message: String,
}

/// A rendered log entry: severity, display time and the raw message.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub level: Level,
    pub time: String,
    pub message: String,
}

impl LogEntry {
    /// Class list for the entry container.
    pub fn class_name(&self) -> String {
        format!("log-entry log-{}", self.level.as_str())
    }

    /// Markup for the container's children. The message is escaped here and
    /// nowhere else.
    pub fn inner_html(&self) -> String {
        format!(
            "<span class=\"log-time\">{}</span> <span class=\"log-msg\">{}</span>",
            self.time,
            escape(&self.message)
        )
    }

    /// Visible text of the entry.
    #[cfg(test)]
    pub fn text(&self) -> String {
        format!("{} {}", self.time, self.message)
    }
}

/// Build a displayable entry from a structured record. A timestamp that
/// can't be interpreted is replaced by the time of receipt.
pub fn build_entry(record: &LogRecord) -> LogEntry {
    let time = match record.timestamp.to_local() {
        Some(t) => format_timestamp(&t),
        None => {
            log::warn!("Unreadable record timestamp: {:?}", record.timestamp);
            format_now()
        }
    };
    LogEntry {
        level: classify(&record.message),
        time,
        message: record.message.clone(),
    }
}

/// One line handed to the output sink.
#[derive(Debug, Clone, PartialEq)]
pub enum Line {
    /// Displayed verbatim as text content.
    Text(String),
    /// A rendered structured record.
    Entry(LogEntry),
}

impl Line {
    /// Interpret an inbound payload. Structured records become entries;
    /// anything else, including other JSON, is kept verbatim.
    pub fn from_payload(payload: &str) -> Self {
        if payload.trim_start().starts_with('{')
            && let Ok(record) = serde_json::from_str::<LogRecord>(payload)
        {
            return Line::Entry(build_entry(&record));
        }
        Line::Text(payload.to_string())
    }

    #[cfg(test)]
    pub fn text(&self) -> String {
        match self {
            Line::Text(t) => t.clone(),
            Line::Entry(e) => e.text(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn classify_is_order_sensitive() {
        assert_eq!(classify("Error: warn"), Level::Error);
        assert_eq!(classify("warn: nothing else"), Level::Warn);
        assert_eq!(classify("DEBUG mode"), Level::Debug);
        assert_eq!(classify("hello"), Level::Info);
        assert_eq!(classify("upload FAILED"), Level::Error);
        assert_eq!(classify("Warning: debug output"), Level::Warn);
        assert_eq!(classify(""), Level::Info);
    }

    #[test]
    fn escape_neutralizes_markup() {
        let escaped = escape("<b>&</b>");
        assert_eq!(escaped, "&lt;b&gt;&amp;&lt;/b&gt;");
        assert!(!escaped.contains('<'));
        assert!(!escaped.contains('>'));
        assert!(escaped.matches('&').count() == escaped.matches(';').count());
    }

    #[test]
    fn escape_is_not_idempotent() {
        assert_eq!(escape("&amp;"), "&amp;amp;");
        assert_eq!(escape("say \"hi\" it's"), "say &quot;hi&quot; it&#39;s");
    }

    #[test]
    fn timestamp_is_bracketed_time_of_day() {
        let t = Utc.with_ymd_and_hms(2024, 5, 1, 14, 3, 22).unwrap();
        assert_eq!(format_timestamp(&t), "[14:03:22]");
        let now = format_now();
        assert!(now.starts_with('[') && now.ends_with(']'));
        assert_eq!(now.len(), 10);
    }

    #[test]
    fn build_entry_contains_time_and_message() {
        let t = Local.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();
        let record = LogRecord {
            timestamp: RecordTime::EpochMillis(t.timestamp_millis() as f64),
            message: "hi".to_string(),
        };
        let entry = build_entry(&record);
        assert_eq!(entry.time, "[09:30:00]");
        assert_eq!(entry.level, Level::Info);
        assert_eq!(entry.class_name(), "log-entry log-info");
        assert!(entry.text().contains("[09:30:00]"));
        assert!(entry.text().contains("hi"));
    }

    #[test]
    fn entry_markup_escapes_message_once() {
        let entry = LogEntry {
            level: Level::Error,
            time: "[01:02:03]".to_string(),
            message: "<script>failed</script>".to_string(),
        };
        let html = entry.inner_html();
        assert!(html.contains("&lt;script&gt;failed&lt;/script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(html.starts_with("<span class=\"log-time\">[01:02:03]</span>"));
    }

    #[test]
    fn rfc3339_timestamps_are_accepted() {
        let record: LogRecord =
            serde_json::from_str(r#"{"timestamp":"2024-05-01T14:03:22Z","message":"x"}"#)
                .unwrap();
        let expected = Utc
            .with_ymd_and_hms(2024, 5, 1, 14, 3, 22)
            .unwrap()
            .with_timezone(&Local);
        assert_eq!(build_entry(&record).time, format_timestamp(&expected));
    }

    #[test]
    fn bad_timestamp_falls_back_to_receipt_time() {
        let record = LogRecord {
            timestamp: RecordTime::Text("yesterday-ish".to_string()),
            message: "warn: disk".to_string(),
        };
        let entry = build_entry(&record);
        assert_eq!(entry.level, Level::Warn);
        assert_eq!(entry.time.len(), 10);
    }

    #[test]
    fn payloads_are_verbatim_unless_structured() {
        assert_eq!(
            Line::from_payload("plain <b>line</b>"),
            Line::Text("plain <b>line</b>".to_string())
        );
        assert_eq!(
            Line::from_payload(r#"{"type":"cmd","data":"x"}"#),
            Line::Text(r#"{"type":"cmd","data":"x"}"#.to_string())
        );
        match Line::from_payload(r#"{"timestamp":0,"message":"debug tick"}"#) {
            Line::Entry(e) => assert_eq!(e.level, Level::Debug),
            other => panic!("expected entry, got {other:?}"),
        }
    }
}
