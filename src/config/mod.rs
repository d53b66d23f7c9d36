//! Logger level snapshots and their wire records

pub mod configuration;
pub mod resolver;

pub use configuration::LoggerConfiguration;
pub use resolver::{split_logger_names, ConfigResolver, LOGGER_NAME_DELIMITERS};
