//! Structured request handed over by the routing layer

use serde_json::Value;
use std::collections::HashMap;

/// Named parameters plus an optional opaque body
///
/// # Example
///
/// ```
/// use log_level_manager::Query;
///
/// let query = Query::new()
///     .with_parameter("loggers", "io.foo;io.bar")
///     .with_body(br#"[{"name":"io.foo","level":"DEBUG"}]"#.to_vec());
///
/// assert_eq!(query.parameter("loggers"), Some("io.foo;io.bar"));
/// assert_eq!(query.parameter("local"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    parameters: HashMap<String, String>,
    body: Option<Vec<u8>>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Body holding the serialized form of `value`
    #[must_use]
    pub fn with_json_body(self, value: &Value) -> Self {
        self.with_body(value.to_string())
    }

    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters.get(name).map(String::as_str)
    }

    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }
}
