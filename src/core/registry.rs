//! The in-process logging subsystem
//!
//! Loggers form a hierarchy by dotted name: `io.foo.bar` is a child of
//! `io.foo`, which is a child of `io`, which is a child of the root logger.
//! A logger without an explicit level inherits the level of its nearest
//! configured ancestor, and ultimately the root level. Obtaining a logger
//! registers it together with its ancestors, so listings show the whole tree.

use super::{
    appender::Appender,
    backend::{ancestors, is_root, LevelBackend, ROOT_LOGGER_NAME},
    dispatcher::Dispatcher,
    error::{LoggerError, Result},
    log_level::LogLevel,
    logger::Logger,
    metrics::LoggerMetrics,
    overflow_policy::{OverflowCallback, OverflowPolicy},
};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

static GLOBAL_REGISTRY: OnceLock<LoggerRegistry> = OnceLock::new();

pub(crate) struct RegistryInner {
    root_level: RwLock<LogLevel>,
    /// Known non-root loggers and their explicit level
    levels: RwLock<BTreeMap<String, Option<LogLevel>>>,
    dispatcher: Dispatcher,
}

impl RegistryInner {
    pub(crate) fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub(crate) fn level(&self, name: &str) -> Option<LogLevel> {
        let name = name.trim();
        if is_root(name) {
            return Some(*self.root_level.read());
        }
        self.levels.read().get(name).copied().flatten()
    }

    pub(crate) fn effective_level(&self, name: &str) -> LogLevel {
        let name = name.trim();
        if !is_root(name) {
            let levels = self.levels.read();
            let configured = std::iter::once(name)
                .chain(ancestors(name))
                .find_map(|candidate| levels.get(candidate).copied().flatten());
            if let Some(level) = configured {
                return level;
            }
        }
        *self.root_level.read()
    }

    /// Surrounding whitespace is not part of a logger name
    pub(crate) fn set_level(&self, name: &str, level: Option<LogLevel>) -> Result<()> {
        let name = name.trim();
        if is_root(name) {
            let level = level.ok_or_else(|| {
                LoggerError::config("LoggerRegistry", "the root logger level cannot be cleared")
            })?;
            *self.root_level.write() = level;
            return Ok(());
        }
        validate_name(name)?;

        let mut levels = self.levels.write();
        Self::register_locked(&mut levels, name);
        levels.insert(name.to_string(), level);
        Ok(())
    }

    fn register(&self, name: &str) {
        if is_root(name) || name.is_empty() || self.levels.read().contains_key(name) {
            return;
        }
        Self::register_locked(&mut self.levels.write(), name);
    }

    fn register_locked(levels: &mut BTreeMap<String, Option<LogLevel>>, name: &str) {
        for known in std::iter::once(name).chain(ancestors(name)) {
            levels.entry(known.to_string()).or_insert(None);
        }
    }

    fn names(&self) -> Vec<String> {
        let levels = self.levels.read();
        let mut names = Vec::with_capacity(levels.len() + 1);
        names.push(ROOT_LOGGER_NAME.to_string());
        names.extend(levels.keys().cloned());
        names.sort();
        names
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(LoggerError::config("LoggerRegistry", "logger name must not be empty"));
    }
    Ok(())
}

/// Registry of named loggers sharing one dispatcher
///
/// Cloning is cheap; clones share all state.
///
/// # Example
///
/// ```
/// use log_level_manager::prelude::*;
///
/// let registry = LoggerRegistry::builder()
///     .root_level(LogLevel::Info)
///     .level("io.foo", LogLevel::Debug)
///     .build();
///
/// assert_eq!(registry.effective_level("io.foo.bar"), LogLevel::Debug);
/// assert_eq!(registry.effective_level("io.bar"), LogLevel::Info);
/// ```
#[derive(Clone)]
pub struct LoggerRegistry {
    inner: Arc<RegistryInner>,
}

impl LoggerRegistry {
    /// Registry with a synchronous dispatcher, no appenders and root at `Info`
    #[must_use]
    pub fn new() -> Self {
        Self::with_dispatcher(Dispatcher::new(), LogLevel::Info)
    }

    fn with_dispatcher(dispatcher: Dispatcher, root_level: LogLevel) -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                root_level: RwLock::new(root_level),
                levels: RwLock::new(BTreeMap::new()),
                dispatcher,
            }),
        }
    }

    #[must_use]
    pub fn builder() -> LoggerRegistryBuilder {
        LoggerRegistryBuilder::new()
    }

    /// Build a registry from a directive string held in an environment variable
    ///
    /// An unset variable yields the default registry.
    pub fn from_env(var: &str) -> Result<Self> {
        match std::env::var(var) {
            Ok(directives) => Ok(Self::builder().directives(&directives)?.build()),
            Err(_) => Ok(Self::new()),
        }
    }

    /// Process-wide registry used for the crate's own diagnostics
    ///
    /// Starts out with no appenders; call [`LoggerRegistry::install_global`]
    /// early to route diagnostics somewhere.
    pub fn global() -> &'static LoggerRegistry {
        GLOBAL_REGISTRY.get_or_init(LoggerRegistry::new)
    }

    /// Make `registry` the process-wide registry
    ///
    /// Fails if [`LoggerRegistry::global`] was already initialized.
    pub fn install_global(registry: LoggerRegistry) -> Result<()> {
        GLOBAL_REGISTRY
            .set(registry)
            .map_err(|_| LoggerError::config("LoggerRegistry", "global registry already set"))
    }

    /// Get a handle for `name`, registering it and its ancestors
    ///
    /// An empty name or `ROOT` returns the root logger.
    pub fn logger(&self, name: &str) -> Logger {
        let name = name.trim();
        if name.is_empty() || is_root(name) {
            return Logger::new(ROOT_LOGGER_NAME, Arc::clone(&self.inner));
        }
        self.inner.register(name);
        Logger::new(name, Arc::clone(&self.inner))
    }

    pub fn root(&self) -> Logger {
        self.logger(ROOT_LOGGER_NAME)
    }

    pub fn contains(&self, name: &str) -> bool {
        let name = name.trim();
        is_root(name) || self.inner.levels.read().contains_key(name)
    }

    pub fn add_appender(&self, appender: Box<dyn Appender>) {
        self.inner.dispatcher.add_appender(appender);
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        self.inner.dispatcher.metrics()
    }

    pub fn flush(&self) -> Result<()> {
        self.inner.dispatcher.flush()
    }

    /// Drain pending entries and stop the async worker, if any
    pub fn shutdown(&self, timeout: Duration) -> bool {
        self.inner.dispatcher.shutdown(timeout)
    }
}

impl Default for LoggerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl LevelBackend for LoggerRegistry {
    fn level(&self, name: &str) -> Option<LogLevel> {
        self.inner.level(name)
    }

    fn effective_level(&self, name: &str) -> LogLevel {
        self.inner.effective_level(name)
    }

    fn set_level(&self, name: &str, level: Option<LogLevel>) -> Result<()> {
        self.inner.set_level(name, level)
    }

    fn logger_names(&self) -> Vec<String> {
        self.inner.names()
    }
}

/// Builder for [`LoggerRegistry`]
///
/// # Example
///
/// ```
/// use log_level_manager::prelude::*;
///
/// let registry = LoggerRegistry::builder()
///     .directives("warn,io.foo=debug;io.bar=off")
///     .unwrap()
///     .async_mode(1000)
///     .overflow_policy(OverflowPolicy::AlertAndDrop)
///     .build();
///
/// assert_eq!(registry.effective_level("io.bar.baz"), LogLevel::Off);
/// ```
pub struct LoggerRegistryBuilder {
    root_level: LogLevel,
    levels: Vec<(String, LogLevel)>,
    appenders: Vec<Box<dyn Appender>>,
    async_buffer: Option<usize>,
    overflow_policy: OverflowPolicy,
    on_overflow: Option<OverflowCallback>,
}

impl LoggerRegistryBuilder {
    pub fn new() -> Self {
        Self {
            root_level: LogLevel::Info,
            levels: Vec::new(),
            appenders: Vec::new(),
            async_buffer: None,
            overflow_policy: OverflowPolicy::AlertAndDrop,
            on_overflow: None,
        }
    }

    #[must_use = "builder methods return a new value"]
    pub fn root_level(mut self, level: LogLevel) -> Self {
        self.root_level = level;
        self
    }

    /// Initial explicit level for one logger
    #[must_use = "builder methods return a new value"]
    pub fn level(mut self, name: impl Into<String>, level: LogLevel) -> Self {
        let name = name.into();
        if is_root(&name) {
            self.root_level = level;
        } else {
            self.levels.push((name, level));
        }
        self
    }

    /// Apply `level` or `name=level` directives separated by `,` or `;`
    ///
    /// A bare level sets the root. Later directives win.
    pub fn directives(mut self, directives: &str) -> Result<Self> {
        for directive in directives.split([',', ';']).map(str::trim) {
            if directive.is_empty() {
                continue;
            }
            match directive.split_once('=') {
                Some((name, level)) => {
                    let name = name.trim();
                    validate_name(name)?;
                    let level = level.trim().parse::<LogLevel>().map_err(|_| {
                        LoggerError::config(
                            "LoggerRegistry",
                            format!("invalid level in directive '{}'", directive),
                        )
                    })?;
                    self = self.level(name, level);
                }
                None => {
                    self.root_level = directive.parse::<LogLevel>().map_err(|_| {
                        LoggerError::config(
                            "LoggerRegistry",
                            format!("invalid root level directive '{}'", directive),
                        )
                    })?;
                }
            }
        }
        Ok(self)
    }

    #[must_use = "builder methods return a new value"]
    pub fn appender<A: Appender + 'static>(mut self, appender: A) -> Self {
        self.appenders.push(Box::new(appender));
        self
    }

    /// Write entries on a worker thread through a queue of `buffer_size`
    #[must_use = "builder methods return a new value"]
    pub fn async_mode(mut self, buffer_size: usize) -> Self {
        self.async_buffer = Some(buffer_size);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn overflow_policy(mut self, policy: OverflowPolicy) -> Self {
        self.overflow_policy = policy;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn on_overflow(mut self, callback: OverflowCallback) -> Self {
        self.on_overflow = Some(callback);
        self
    }

    pub fn build(self) -> LoggerRegistry {
        let dispatcher = match self.async_buffer {
            Some(size) => Dispatcher::with_async(size, self.overflow_policy, self.on_overflow),
            None => Dispatcher::new(),
        };
        for appender in self.appenders {
            dispatcher.add_appender(appender);
        }

        let registry = LoggerRegistry::with_dispatcher(dispatcher, self.root_level);
        {
            let mut levels = registry.inner.levels.write();
            for (name, level) in self.levels {
                RegistryInner::register_locked(&mut levels, &name);
                levels.insert(name, Some(level));
            }
        }
        registry
    }
}

impl Default for LoggerRegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}
