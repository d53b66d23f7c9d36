//! # Log Level Manager
//!
//! Runtime logger levels for a fleet of cooperating process instances.
//!
//! - **Hierarchical loggers**: dot-separated names inherit the level of their
//!   nearest configured ancestor
//! - **Read anywhere**: report the current level of some or all loggers
//! - **Change everywhere**: level changes are broadcast to every instance, or
//!   kept local, and applied without blocking the request path
//! - **Pluggable**: the logging back-end and the message bus sit behind the
//!   [`LevelBackend`] and [`BroadcastChannel`](broadcast::BroadcastChannel) traits
//!
//! ```
//! use log_level_manager::prelude::*;
//! use serde_json::json;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let cluster = Cluster::new();
//! let (registry_a, bus_a) = (LoggerRegistry::new(), Arc::new(cluster.join()));
//! let (registry_b, bus_b) = (LoggerRegistry::new(), Arc::new(cluster.join()));
//!
//! let service_a = LogLevelService::new(Arc::new(registry_a.clone()), bus_a.clone());
//! let service_b = LogLevelService::new(Arc::new(registry_b.clone()), bus_b.clone());
//! service_a.start().unwrap();
//! service_b.start().unwrap();
//!
//! let body = json!([{"name": "io.foo", "level": "DEBUG"}]);
//! service_a.write(&Query::new().with_json_body(&body)).unwrap();
//!
//! assert!(bus_a.wait_idle(Duration::from_secs(1)));
//! assert!(bus_b.wait_idle(Duration::from_secs(1)));
//! let read = service_b.read(&Query::new().with_parameter("loggers", "io.foo"));
//! assert_eq!(read, vec![json!({"name": "io.foo", "level": "DEBUG"})]);
//! ```

pub mod appenders;
pub mod broadcast;
pub mod config;
pub mod core;
pub mod macros;
pub mod service;

pub mod prelude {
    #[cfg(feature = "console")]
    pub use crate::appenders::ConsoleAppender;
    pub use crate::appenders::{JsonAppender, MemoryAppender};
    pub use crate::broadcast::{BroadcastChannel, Cluster, EventBus, Handler};
    pub use crate::config::{ConfigResolver, LoggerConfiguration};
    pub use crate::core::{
        Appender, BusMetrics, LevelBackend, LogEntry, LogLevel, Logger, LoggerError,
        LoggerMetrics, LoggerRegistry, LoggerRegistryBuilder, OverflowPolicy, Result,
        DEFAULT_SHUTDOWN_TIMEOUT, ROOT_LOGGER_NAME,
    };
    pub use crate::service::{LogLevelService, Query, ServiceConfig};
}

#[cfg(feature = "console")]
pub use appenders::ConsoleAppender;
pub use appenders::{JsonAppender, MemoryAppender};
pub use config::{ConfigResolver, LoggerConfiguration};
pub use core::{
    Appender, BusMetrics, Dispatcher, LevelBackend, LogEntry, LogLevel, LogPriority, Logger,
    LoggerError, LoggerMetrics, LoggerRegistry, LoggerRegistryBuilder, OverflowCallback,
    OverflowPolicy, Result, DEFAULT_SHUTDOWN_TIMEOUT, ROOT_LOGGER_NAME,
};
pub use service::{LogLevelService, LogLevelServiceBuilder, Query, ServiceConfig};
