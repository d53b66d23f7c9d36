//! JSON lines appender

use crate::core::{Appender, LogEntry, Result};
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

/// One line of output
#[derive(Serialize)]
struct JsonLine<'a> {
    timestamp: i64,
    level: &'a str,
    logger: &'a str,
    thread: &'a str,
    message: &'a str,
}

/// Writes each entry as a single-line JSON object (JSONL)
pub struct JsonAppender {
    writer: BufWriter<File>,
}

impl JsonAppender {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            writer: BufWriter::new(file),
        })
    }
}

impl Appender for JsonAppender {
    fn name(&self) -> &str {
        "json"
    }

    fn append(&mut self, entry: &LogEntry) -> Result<()> {
        let line = JsonLine {
            timestamp: entry.timestamp.timestamp_millis(),
            level: entry.level.to_str(),
            logger: &entry.logger,
            thread: &entry.thread,
            message: &entry.message,
        };

        serde_json::to_writer(&mut self.writer, &line)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LogLevel;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_json_appender_multiple_entries() -> Result<()> {
        let dir = tempdir()?;
        let log_path = dir.path().join("levels.jsonl");

        let mut appender = JsonAppender::new(&log_path)?;
        for i in 0..5 {
            let entry = LogEntry::new(LogLevel::Debug, "io.foo", format!("Iteration {}", i));
            appender.append(&entry)?;
        }
        appender.flush()?;

        let content = fs::read_to_string(&log_path)?;
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 5);

        for line in lines {
            let parsed: serde_json::Value = serde_json::from_str(line)?;
            assert_eq!(parsed["level"], "DEBUG");
            assert_eq!(parsed["logger"], "io.foo");
            assert!(parsed["timestamp"].is_i64());
        }

        Ok(())
    }
}
