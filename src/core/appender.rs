//! Appender trait for log output destinations

use super::{error::Result, log_entry::LogEntry};

/// Destination for entries that passed their logger's level
pub trait Appender: Send + Sync {
    fn append(&mut self, entry: &LogEntry) -> Result<()>;
    fn flush(&mut self) -> Result<()>;
    fn name(&self) -> &str;
}
