//! Log entry structure

use super::log_level::LogLevel;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;

thread_local! {
    static THREAD_NAME_CACHE: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Thread name, or its id when unnamed, cached per thread
fn current_thread_label() -> String {
    THREAD_NAME_CACHE.with(|cache| {
        cache
            .borrow_mut()
            .get_or_insert_with(|| {
                let thread = std::thread::current();
                thread
                    .name()
                    .map(String::from)
                    .unwrap_or_else(|| format!("{:?}", thread.id()))
            })
            .clone()
    })
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub level: LogLevel,
    /// Name of the logger that produced the entry
    pub logger: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub thread: String,
}

impl LogEntry {
    /// Escape line breaks and tabs so one entry stays on one line
    fn sanitize_message(message: &str) -> String {
        message
            .replace('\n', "\\n")
            .replace('\r', "\\r")
            .replace('\t', "\\t")
    }

    pub fn new(level: LogLevel, logger: impl Into<String>, message: String) -> Self {
        Self {
            level,
            logger: logger.into(),
            message: Self::sanitize_message(&message),
            timestamp: Utc::now(),
            thread: current_thread_label(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_is_sanitized() {
        let entry = LogEntry::new(
            LogLevel::Info,
            "io.foo",
            "line one\nERROR fake\tentry".to_string(),
        );
        assert_eq!(entry.message, "line one\\nERROR fake\\tentry");
        assert_eq!(entry.logger, "io.foo");
    }

    #[test]
    fn test_thread_label_uses_name() {
        let handle = std::thread::Builder::new()
            .name("apply-worker".into())
            .spawn(|| LogEntry::new(LogLevel::Debug, "x", String::new()).thread)
            .unwrap();
        assert_eq!(handle.join().unwrap(), "apply-worker");
    }
}
