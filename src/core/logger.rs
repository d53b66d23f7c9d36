//! Named logger handles
//!
//! A [`Logger`] is a cheap, cloneable handle onto one name in a
//! [`LoggerRegistry`](super::LoggerRegistry). Its threshold is looked up on
//! every call, so a level change made through the registry takes effect on the
//! next log call of every existing handle.

use super::{
    error::Result,
    log_entry::LogEntry,
    log_level::LogLevel,
    registry::RegistryInner,
};
use std::fmt;
use std::sync::Arc;

#[derive(Clone)]
pub struct Logger {
    name: Arc<str>,
    registry: Arc<RegistryInner>,
}

impl Logger {
    pub(crate) fn new(name: &str, registry: Arc<RegistryInner>) -> Self {
        Self {
            name: Arc::from(name),
            registry,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Explicitly configured level, if any
    pub fn level(&self) -> Option<LogLevel> {
        self.registry.level(&self.name)
    }

    pub fn effective_level(&self) -> LogLevel {
        self.registry.effective_level(&self.name)
    }

    pub fn set_level(&self, level: Option<LogLevel>) -> Result<()> {
        self.registry.set_level(&self.name, level)
    }

    #[inline]
    pub fn is_enabled(&self, level: LogLevel) -> bool {
        self.effective_level().enables(level)
    }

    pub fn log(&self, level: LogLevel, message: impl Into<String>) {
        if !self.is_enabled(level) {
            return;
        }

        let entry = LogEntry::new(level, &*self.name, message.into());
        self.registry.dispatcher().dispatch(entry);
    }

    #[inline]
    pub fn trace(&self, message: impl Into<String>) {
        self.log(LogLevel::Trace, message);
    }

    #[inline]
    pub fn debug(&self, message: impl Into<String>) {
        self.log(LogLevel::Debug, message);
    }

    #[inline]
    pub fn info(&self, message: impl Into<String>) {
        self.log(LogLevel::Info, message);
    }

    #[inline]
    pub fn warn(&self, message: impl Into<String>) {
        self.log(LogLevel::Warn, message);
    }

    #[inline]
    pub fn error(&self, message: impl Into<String>) {
        self.log(LogLevel::Error, message);
    }

    #[inline]
    pub fn fatal(&self, message: impl Into<String>) {
        self.log(LogLevel::Fatal, message);
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("level", &self.level())
            .field("effective_level", &self.effective_level())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::appenders::MemoryAppender;
    use crate::core::{LogLevel, LoggerRegistry};

    #[test]
    fn test_logger_filters_by_effective_level() {
        let memory = MemoryAppender::new();
        let registry = LoggerRegistry::builder()
            .root_level(LogLevel::Warn)
            .appender(memory.clone())
            .build();

        let logger = registry.logger("io.foo");
        logger.info("hidden");
        logger.warn("shown");

        assert_eq!(memory.messages(), vec!["shown".to_string()]);
    }

    #[test]
    fn test_level_change_reaches_existing_handles() {
        let memory = MemoryAppender::new();
        let registry = LoggerRegistry::builder().appender(memory.clone()).build();

        let logger = registry.logger("io.foo");
        logger.debug("before");
        registry.logger("io").set_level(Some(LogLevel::Debug)).unwrap();
        logger.debug("after");

        assert_eq!(memory.messages(), vec!["after".to_string()]);
        assert_eq!(logger.level(), None);
        assert_eq!(logger.effective_level(), LogLevel::Debug);
    }

    #[test]
    fn test_off_silences_everything() {
        let memory = MemoryAppender::new();
        let registry = LoggerRegistry::builder().appender(memory.clone()).build();

        let logger = registry.logger("noisy");
        logger.set_level(Some(LogLevel::Off)).unwrap();
        logger.fatal("nope");
        // Off and All are never entry severities
        logger.log(LogLevel::Off, "nope");

        assert!(memory.is_empty());
    }

    #[test]
    fn test_entries_carry_logger_name() {
        let memory = MemoryAppender::new();
        let registry = LoggerRegistry::builder().appender(memory.clone()).build();

        registry.logger("io.bar").error("boom");

        let entries = memory.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].logger, "io.bar");
        assert_eq!(entries[0].level, LogLevel::Error);
    }
}
