//! The logging subsystem as seen by the level manager

use super::{error::Result, log_level::LogLevel};

/// Name under which the root logger is reported
pub const ROOT_LOGGER_NAME: &str = "ROOT";

/// Read and change logger levels of one process
///
/// Implementations must be safe to mutate concurrently; the level manager
/// never holds a lock of its own around these calls.
pub trait LevelBackend: Send + Sync {
    /// Explicitly configured level, `None` when the logger inherits
    fn level(&self, name: &str) -> Option<LogLevel>;

    /// Level the logger actually filters at
    ///
    /// Total over any name: unknown loggers report what they would inherit.
    fn effective_level(&self, name: &str) -> LogLevel;

    /// Set or clear (`None`) the explicit level, creating the logger if needed
    fn set_level(&self, name: &str, level: Option<LogLevel>) -> Result<()>;

    /// Every known logger, sorted by name
    fn logger_names(&self) -> Vec<String>;
}

/// Whether `name` refers to the root logger
pub fn is_root(name: &str) -> bool {
    name.eq_ignore_ascii_case(ROOT_LOGGER_NAME)
}

/// Ancestors of a dotted logger name, nearest first
///
/// `"io.foo.bar"` yields `"io.foo"` then `"io"`.
pub fn ancestors(name: &str) -> impl Iterator<Item = &str> {
    name.char_indices()
        .rev()
        .filter(|&(_, c)| c == '.')
        .map(move |(idx, _)| &name[..idx])
        .filter(|parent| !parent.is_empty())
}
