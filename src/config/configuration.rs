//! One logger's name and level
//!
//! Wire records have exactly two fields:
//!
//! ```json
//! { "name": "io.foo", "level": "DEBUG" }
//! ```
//!
//! `level` is the display token of a [`LogLevel`], or `""` when nothing is
//! known about the logger's level.

use crate::core::{LevelBackend, LogLevel, LoggerError, Result, ROOT_LOGGER_NAME};
use serde_json::{json, Map, Value};
use std::panic::{catch_unwind, AssertUnwindSafe};

pub const NAME_FIELD: &str = "name";
pub const LEVEL_FIELD: &str = "level";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggerConfiguration {
    name: String,
    /// Explicitly configured level; `None` means inherited
    level: Option<LogLevel>,
    /// Level the logger filters at, as seen when this value was created
    effective: Option<LogLevel>,
}

impl LoggerConfiguration {
    /// Configuration that sets `name` to `level`
    pub fn new(name: impl Into<String>, level: LogLevel) -> Result<Self> {
        let name: String = name.into();
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(LoggerError::malformed("logger name must not be empty"));
        }
        Ok(Self {
            name,
            level: Some(level),
            effective: Some(level),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn level(&self) -> Option<LogLevel> {
        self.level
    }

    /// Configured level, else the effective level captured at snapshot time
    pub fn effective_level(&self) -> Option<LogLevel> {
        self.level.or(self.effective)
    }

    /// Parse a wire record
    ///
    /// A missing, `null` or empty `level` yields an inherited configuration.
    /// Level tokens are case-insensitive.
    pub fn from_record(record: &Value) -> Result<Self> {
        let fields = record
            .as_object()
            .ok_or_else(|| LoggerError::malformed("record is not an object"))?;

        let name = match fields.get(NAME_FIELD) {
            Some(Value::String(name)) if !name.trim().is_empty() => name.trim().to_string(),
            Some(Value::String(_)) => return Err(LoggerError::malformed("'name' is empty")),
            Some(_) => return Err(LoggerError::malformed("'name' is not a string")),
            None => return Err(LoggerError::malformed("record has no 'name'")),
        };

        let level = match fields.get(LEVEL_FIELD) {
            None | Some(Value::Null) => None,
            Some(Value::String(token)) if token.trim().is_empty() => None,
            Some(Value::String(token)) => Some(token.parse::<LogLevel>().map_err(|_| {
                LoggerError::malformed(format!(
                    "unrecognized level '{}' for logger '{}'",
                    token, name
                ))
            })?),
            Some(_) => {
                return Err(LoggerError::malformed(format!(
                    "'level' of logger '{}' is not a string",
                    name
                )))
            }
        };

        Ok(Self {
            name,
            level,
            effective: level,
        })
    }

    pub fn to_record(&self) -> Value {
        let level = self.effective_level().map(|l| l.to_str()).unwrap_or("");
        let mut record = Map::with_capacity(2);
        record.insert(NAME_FIELD.to_string(), json!(self.name));
        record.insert(LEVEL_FIELD.to_string(), json!(level));
        Value::Object(record)
    }

    /// Set this logger's level in `backend`
    ///
    /// `None` clears the explicit level so the logger inherits again. Unknown
    /// loggers are created. Never fails, even if the backend panics; returns
    /// whether the backend accepted the change.
    pub fn apply_configured_level(&self, backend: &dyn LevelBackend) -> bool {
        catch_unwind(AssertUnwindSafe(|| backend.set_level(&self.name, self.level)))
            .is_ok_and(|result| result.is_ok())
    }

    /// Snapshot of one logger's current state
    ///
    /// Total over any name; an empty name means the root logger.
    pub fn get_logger_configuration(backend: &dyn LevelBackend, name: &str) -> Self {
        let name = if name.is_empty() { ROOT_LOGGER_NAME } else { name };
        Self {
            name: name.to_string(),
            level: backend.level(name),
            effective: Some(backend.effective_level(name)),
        }
    }

    /// Snapshots of every logger the backend knows, sorted by name
    pub fn get_logger_configurations(backend: &dyn LevelBackend) -> Vec<Self> {
        let mut names = backend.logger_names();
        names.sort();
        names
            .iter()
            .map(|name| Self::get_logger_configuration(backend, name))
            .collect()
    }
}
