//! Read and change logger levels across instances

pub mod log_level;
pub mod query;

pub use log_level::{
    LogLevelService, LogLevelServiceBuilder, ServiceConfig, DEFAULT_TOPIC,
    QUERY_PARAMETER_LOCAL, QUERY_PARAMETER_LOGGERS,
};
pub use query::Query;
