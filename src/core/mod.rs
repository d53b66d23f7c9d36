//! Core logger types and traits

pub mod appender;
pub mod backend;
pub mod dispatcher;
pub mod error;
pub mod log_entry;
pub mod log_level;
pub mod logger;
pub mod metrics;
pub mod overflow_policy;
pub mod registry;

pub use appender::Appender;
pub use backend::{LevelBackend, ROOT_LOGGER_NAME};
pub use dispatcher::{Dispatcher, DEFAULT_SHUTDOWN_TIMEOUT};
pub use error::{LoggerError, Result};
pub use log_entry::LogEntry;
pub use log_level::LogLevel;
pub use logger::Logger;
pub use metrics::{BusMetrics, LoggerMetrics};
pub use overflow_policy::{LogPriority, OverflowCallback, OverflowPolicy};
pub use registry::{LoggerRegistry, LoggerRegistryBuilder};
