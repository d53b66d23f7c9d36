//! Turns the `loggers` request parameter into configuration snapshots

use super::LoggerConfiguration;
use crate::core::LevelBackend;

/// Characters separating logger names in the `loggers` parameter
///
/// There is no quoting or escaping: a logger whose name contains one of these
/// cannot be addressed individually.
pub const LOGGER_NAME_DELIMITERS: [char; 3] = [',', ';', ' '];

/// Split on runs of delimiters, dropping empty tokens, keeping order and repeats
pub fn split_logger_names(parameter: &str) -> Vec<&str> {
    parameter
        .split(LOGGER_NAME_DELIMITERS)
        .filter(|token| !token.is_empty())
        .collect()
}

pub struct ConfigResolver<'a> {
    backend: &'a dyn LevelBackend,
}

impl<'a> ConfigResolver<'a> {
    pub fn new(backend: &'a dyn LevelBackend) -> Self {
        Self { backend }
    }

    /// Snapshots for the named loggers, or for every logger if none are named
    ///
    /// A parameter made only of delimiters names no logger and yields an
    /// empty result.
    pub fn resolve(&self, loggers: Option<&str>) -> Vec<LoggerConfiguration> {
        match loggers {
            None | Some("") => LoggerConfiguration::get_logger_configurations(self.backend),
            Some(parameter) => split_logger_names(parameter)
                .into_iter()
                .map(|name| LoggerConfiguration::get_logger_configuration(self.backend, name))
                .collect(),
        }
    }
}
