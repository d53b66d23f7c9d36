//! The log level service
//!
//! One service runs per instance. On [`start`](LogLevelService::start) it
//! subscribes a single handler on the change-level topic; that handler applies
//! every record of each message it receives to the local [`LevelBackend`].
//! [`write`](LogLevelService::write) publishes the request body on the topic
//! and returns without waiting for any instance to apply it.
//! [`read`](LogLevelService::read) only looks at the local backend.

use crate::broadcast::{BroadcastChannel, Handler};
use crate::config::{ConfigResolver, LoggerConfiguration};
use crate::core::{LevelBackend, Logger, LoggerError, LoggerRegistry, Result};
use crate::debug;
use crate::service::Query;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Names of the loggers to read, separated by comma, semicolon or space
pub const QUERY_PARAMETER_LOGGERS: &str = "loggers";

/// `"true"` limits a write to the current instance
pub const QUERY_PARAMETER_LOCAL: &str = "local";

pub const DEFAULT_TOPIC: &str = "LogLevelService.ChangeLogLevel";

const DEFAULT_DIAGNOSTICS_LOGGER: &str = "log_level_manager::service";

/// Service settings
///
/// Deserializes from e.g. `{"topic": "ops.ChangeLogLevel"}`; missing fields
/// take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Broadcast topic carrying level changes; must be unique to this service
    pub topic: String,
    /// Logger the service reports its own activity to
    pub diagnostics_logger: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            topic: DEFAULT_TOPIC.to_string(),
            diagnostics_logger: DEFAULT_DIAGNOSTICS_LOGGER.to_string(),
        }
    }
}

impl ServiceConfig {
    pub fn validate(&self) -> Result<()> {
        if self.topic.trim().is_empty() {
            return Err(LoggerError::config("ServiceConfig", "topic must not be empty"));
        }
        if self.diagnostics_logger.trim().is_empty() {
            return Err(LoggerError::config(
                "ServiceConfig",
                "diagnostics_logger must not be empty",
            ));
        }
        Ok(())
    }
}

pub struct LogLevelService {
    backend: Arc<dyn LevelBackend>,
    channel: Arc<dyn BroadcastChannel>,
    config: ServiceConfig,
    diagnostics: Logger,
    started: AtomicBool,
}

impl LogLevelService {
    pub const NAME: &'static str = "LogLevel";

    pub const NAMESPACE: &'static str = "_system";

    /// Service with the default configuration
    pub fn new(backend: Arc<dyn LevelBackend>, channel: Arc<dyn BroadcastChannel>) -> Self {
        let config = ServiceConfig::default();
        let diagnostics = LoggerRegistry::global().logger(&config.diagnostics_logger);
        Self {
            backend,
            channel,
            config,
            diagnostics,
            started: AtomicBool::new(false),
        }
    }

    pub fn builder() -> LogLevelServiceBuilder {
        LogLevelServiceBuilder::new()
    }

    /// `namespace/name` under which routing addresses this service
    pub fn qualified_name() -> String {
        format!("{}/{}", Self::NAMESPACE, Self::NAME)
    }

    pub fn topic(&self) -> &str {
        &self.config.topic
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    /// Subscribe the apply handler; calling it again is a no-op
    pub fn start(&self) -> Result<()> {
        if self
            .started
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Ok(());
        }

        let backend = Arc::clone(&self.backend);
        let diagnostics = self.diagnostics.clone();
        let handler: Handler = Arc::new(move |payload: &Value| {
            apply_levels(backend.as_ref(), &diagnostics, payload);
        });

        if let Err(e) = self.channel.subscribe(&self.config.topic, handler) {
            self.started.store(false, Ordering::SeqCst);
            return Err(e);
        }
        debug!(self.diagnostics, "subscribed to '{}'", self.config.topic);
        Ok(())
    }

    /// Remove the apply handler; returns whether the service was running
    pub fn stop(&self) -> bool {
        if !self.started.swap(false, Ordering::SeqCst) {
            return false;
        }
        self.channel.unsubscribe(&self.config.topic)
    }

    /// Wire records for the loggers named in `loggers`, or for all loggers
    pub fn read(&self, query: &Query) -> Vec<Value> {
        ConfigResolver::new(self.backend.as_ref())
            .resolve(query.parameter(QUERY_PARAMETER_LOGGERS))
            .iter()
            .map(LoggerConfiguration::to_record)
            .collect()
    }

    /// Publish the body's records to every instance, or only this one
    ///
    /// Returns once the bus accepted the message. Records are validated by
    /// each receiving instance, not here.
    pub fn write(&self, query: &Query) -> Result<()> {
        let records = decode_body(query.body())?;
        let local_only = query.parameter(QUERY_PARAMETER_LOCAL) == Some("true");
        let count = records.len();

        self.channel
            .publish(&self.config.topic, Value::Array(records), local_only)?;

        debug!(
            self.diagnostics,
            "published {} level change(s) on '{}' (local_only={})",
            count,
            self.config.topic,
            local_only
        );
        Ok(())
    }
}

/// Empty or missing bodies carry no records
fn decode_body(body: Option<&[u8]>) -> Result<Vec<Value>> {
    let Some(body) = body.filter(|b| !b.iter().all(u8::is_ascii_whitespace)) else {
        return Ok(Vec::new());
    };

    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Array(records)) => Ok(records),
        Ok(other) => Err(LoggerError::invalid_request(format!(
            "body must be a JSON array of logger records, got {}",
            json_kind(&other)
        ))),
        Err(e) => Err(LoggerError::invalid_request(format!("body is not valid JSON: {}", e))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Apply every record of one change message, in order
///
/// Malformed records and refused changes are reported and skipped; the rest
/// of the message still applies. Everything is reported at debug level so that
/// changing levels cannot feed back into a flood of its own diagnostics.
fn apply_levels(backend: &dyn LevelBackend, diagnostics: &Logger, payload: &Value) -> usize {
    let Some(records) = payload.as_array() else {
        debug!(diagnostics, "ignoring level change message that is not an array");
        return 0;
    };

    let mut applied = 0;
    for (index, record) in records.iter().enumerate() {
        let config = match LoggerConfiguration::from_record(record) {
            Ok(config) => config,
            Err(e) => {
                debug!(diagnostics, "skipping record {}: {}", index, e);
                continue;
            }
        };

        if config.apply_configured_level(backend) {
            applied += 1;
        } else {
            debug!(
                diagnostics,
                "backend refused level {:?} for '{}'",
                config.level(),
                config.name()
            );
        }
    }
    applied
}

/// Builder for [`LogLevelService`]
///
/// # Example
///
/// ```
/// use log_level_manager::prelude::*;
/// use std::sync::Arc;
///
/// let registry = LoggerRegistry::new();
/// let service = LogLevelService::builder()
///     .backend(Arc::new(registry.clone()))
///     .channel(Arc::new(EventBus::new()))
///     .topic("ops.ChangeLogLevel")
///     .diagnostics(registry.logger("ops.levels"))
///     .build()
///     .unwrap();
///
/// service.start().unwrap();
/// assert_eq!(service.topic(), "ops.ChangeLogLevel");
/// ```
#[derive(Default)]
pub struct LogLevelServiceBuilder {
    backend: Option<Arc<dyn LevelBackend>>,
    channel: Option<Arc<dyn BroadcastChannel>>,
    config: ServiceConfig,
    diagnostics: Option<Logger>,
}

impl LogLevelServiceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "builder methods return a new value"]
    pub fn backend(mut self, backend: Arc<dyn LevelBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn channel(mut self, channel: Arc<dyn BroadcastChannel>) -> Self {
        self.channel = Some(channel);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn config(mut self, config: ServiceConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn topic(mut self, topic: impl Into<String>) -> Self {
        self.config.topic = topic.into();
        self
    }

    /// Report to `logger` instead of the configured logger of the global registry
    #[must_use = "builder methods return a new value"]
    pub fn diagnostics(mut self, logger: Logger) -> Self {
        self.diagnostics = Some(logger);
        self
    }

    pub fn build(self) -> Result<LogLevelService> {
        self.config.validate()?;
        let backend = self
            .backend
            .ok_or_else(|| LoggerError::config("LogLevelService", "no level backend set"))?;
        let channel = self
            .channel
            .ok_or_else(|| LoggerError::config("LogLevelService", "no broadcast channel set"))?;
        let diagnostics = self.diagnostics.unwrap_or_else(|| {
            LoggerRegistry::global().logger(&self.config.diagnostics_logger)
        });

        Ok(LogLevelService {
            backend,
            channel,
            config: self.config,
            diagnostics,
            started: AtomicBool::new(false),
        })
    }
}
