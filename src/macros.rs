//! Formatting macros for [`Logger`](crate::Logger) handles
//!
//! The message is only formatted when the logger's effective level lets the
//! entry through.
//!
//! ```
//! use log_level_manager::prelude::*;
//! use log_level_manager::{debug, info};
//!
//! let registry = LoggerRegistry::new();
//! let logger = registry.logger("io.foo");
//!
//! info!(logger, "listening on port {}", 8080);
//! // Below the inherited INFO threshold: not even formatted
//! debug!(logger, "expensive: {:?}", vec![1, 2, 3]);
//! ```

/// Log at an explicit level
///
/// ```
/// # use log_level_manager::prelude::*;
/// # let logger = LoggerRegistry::new().logger("demo");
/// use log_level_manager::log;
/// log!(logger, LogLevel::Warn, "retry {} of {}", 1, 3);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $($arg:tt)+) => {{
        let level = $level;
        if $logger.is_enabled(level) {
            $logger.log(level, format!($($arg)+));
        }
    }};
}

#[macro_export]
macro_rules! trace {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Trace, $($arg)+)
    };
}

#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Debug, $($arg)+)
    };
}

#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Info, $($arg)+)
    };
}

#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Warn, $($arg)+)
    };
}

#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Error, $($arg)+)
    };
}

#[macro_export]
macro_rules! fatal {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Fatal, $($arg)+)
    };
}

#[cfg(test)]
mod tests {
    use crate::appenders::MemoryAppender;
    use crate::core::{LogLevel, LoggerRegistry};
    use std::cell::Cell;

    #[test]
    fn test_level_macros() {
        let memory = MemoryAppender::new();
        let registry = LoggerRegistry::builder()
            .root_level(LogLevel::Trace)
            .appender(memory.clone())
            .build();
        let logger = registry.logger("macros");

        trace!(logger, "t {}", 1);
        debug!(logger, "d {}", 2);
        info!(logger, "i {}", 3);
        warn!(logger, "w {}", 4);
        error!(logger, "e {}", 5);
        fatal!(logger, "f {}", 6);
        log!(logger, LogLevel::Info, "plain");

        assert_eq!(
            memory.messages(),
            vec!["t 1", "d 2", "i 3", "w 4", "e 5", "f 6", "plain"]
        );
    }

    #[test]
    fn test_disabled_level_skips_formatting() {
        struct Counting<'a>(&'a Cell<u32>);

        impl std::fmt::Display for Counting<'_> {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                self.0.set(self.0.get() + 1);
                write!(f, "counted")
            }
        }

        let registry = LoggerRegistry::new();
        let logger = registry.logger("quiet");
        let calls = Cell::new(0);

        debug!(logger, "{}", Counting(&calls));
        assert_eq!(calls.get(), 0);

        info!(logger, "{}", Counting(&calls));
        assert_eq!(calls.get(), 1);
    }
}
