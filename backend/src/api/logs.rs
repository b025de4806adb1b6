//! Progress log for pipeline runs.
//!
//! Every entry is echoed to stderr and fanned out over a broadcast channel;
//! `GET /api/logs` relays the channel to browsers as Server-Sent Events.
//! The engine and report formatter never log; only the pipeline, the
//! server and the keep-alive task do.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Entries buffered per subscriber before the slowest one starts lagging.
const CHANNEL_CAPACITY: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl LogLevel {
    /// Marker printed before the message on stderr.
    fn marker(self) -> &'static str {
        match self {
            LogLevel::Info => "   ",
            LogLevel::Success => "   ✓",
            LogLevel::Warning => "   ⚠️",
            LogLevel::Error => "   ❌",
        }
    }
}

/// One progress line, as sent to SSE clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    /// Nesting depth, e.g. the legs under "Resolving route".
    #[serde(default)]
    pub indent: u8,
    /// RFC 3339, UTC.
    pub timestamp: String,
}

impl LogEntry {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            indent: 0,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn nested(mut self, indent: u8) -> Self {
        self.indent = indent;
        self
    }

    /// The stderr rendering of this entry.
    fn console_line(&self) -> String {
        format!(
            "{}{} {}",
            "   ".repeat(self.indent as usize),
            self.level.marker(),
            self.message
        )
    }
}

/// Process-wide log shared by the pipeline and the HTTP server.
pub static LOG_BROADCASTER: Lazy<LogBroadcaster> = Lazy::new(LogBroadcaster::new);

pub struct LogBroadcaster {
    sender: broadcast::Sender<LogEntry>,
}

impl LogBroadcaster {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Echo `entry` to stderr and deliver it to current subscribers.
    ///
    /// stdout is left alone so CLI output stays pipeable.
    pub fn log(&self, entry: LogEntry) {
        eprintln!("{}", entry.console_line());
        // No subscribers is the normal CLI case
        let _ = self.sender.send(entry);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LogEntry> {
        self.sender.subscribe()
    }
}

impl Default for LogBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

pub fn log_info(msg: impl Into<String>) {
    LOG_BROADCASTER.log(LogEntry::new(LogLevel::Info, msg));
}

pub fn log_success(msg: impl Into<String>) {
    LOG_BROADCASTER.log(LogEntry::new(LogLevel::Success, msg));
}

pub fn log_warning(msg: impl Into<String>) {
    LOG_BROADCASTER.log(LogEntry::new(LogLevel::Warning, msg));
}

pub fn log_error(msg: impl Into<String>) {
    LOG_BROADCASTER.log(LogEntry::new(LogLevel::Error, msg));
}

/// Info line nested `indent` levels deep.
pub fn log_info_indent(msg: impl Into<String>, indent: u8) {
    LOG_BROADCASTER.log(LogEntry::new(LogLevel::Info, msg).nested(indent));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscriber_receives_entries() {
        let broadcaster = LogBroadcaster::new();
        let mut rx = broadcaster.subscribe();

        broadcaster.log(LogEntry::new(LogLevel::Success, "Transformed 3 points").nested(1));

        let entry = rx.try_recv().unwrap();
        assert_eq!(entry.level, LogLevel::Success);
        assert_eq!(entry.message, "Transformed 3 points");
        assert_eq!(entry.indent, 1);
    }

    #[test]
    fn test_log_without_subscribers() {
        LogBroadcaster::new().log(LogEntry::new(LogLevel::Warning, "nobody listening"));
    }

    #[test]
    fn test_console_line_indents_legs() {
        let line = LogEntry::new(LogLevel::Info, "ПЗ-90.11 parameters loaded").nested(1).console_line();
        assert_eq!(line, "       ПЗ-90.11 parameters loaded");

        let line = LogEntry::new(LogLevel::Error, "Unknown system").console_line();
        assert_eq!(line, "   ❌ Unknown system");
    }

    #[test]
    fn test_entry_serialization() {
        let json = serde_json::to_value(LogEntry::new(LogLevel::Error, "boom")).unwrap();
        assert_eq!(json["level"], "error");
        assert_eq!(json["message"], "boom");
        assert_eq!(json["indent"], 0);
        assert!(json["timestamp"].is_string());
    }
}
