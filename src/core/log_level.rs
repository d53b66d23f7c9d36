//! Log level definitions
//!
//! A single ordered enumeration serves both as the severity of a log entry and
//! as the threshold configured on a logger. `All` and `Off` only make sense as
//! thresholds: `All` lets everything through, `Off` silences the logger.

use super::error::LoggerError;
use super::overflow_policy::LogPriority;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
#[derive(Default)]
pub enum LogLevel {
    All = 0,
    Trace = 1,
    Debug = 2,
    #[default]
    Info = 3,
    Warn = 4,
    Error = 5,
    Fatal = 6,
    Off = 7,
}

impl LogLevel {
    /// Every level, lowest to highest
    pub const ALL_LEVELS: [LogLevel; 8] = [
        LogLevel::All,
        LogLevel::Trace,
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
        LogLevel::Fatal,
        LogLevel::Off,
    ];

    pub fn to_str(&self) -> &'static str {
        match self {
            LogLevel::All => "ALL",
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Fatal => "FATAL",
            LogLevel::Off => "OFF",
        }
    }

    /// Whether an entry can be emitted at this level
    ///
    /// `All` and `Off` are threshold markers, never entry severities.
    #[inline]
    pub fn is_entry_level(&self) -> bool {
        !matches!(self, LogLevel::All | LogLevel::Off)
    }

    /// Whether an entry at `entry` passes a logger whose threshold is `self`
    #[inline]
    pub fn enables(&self, entry: LogLevel) -> bool {
        entry.is_entry_level() && entry >= *self
    }

    /// Preservation priority of an entry at this level when the queue is full
    pub fn priority(&self) -> LogPriority {
        match self {
            LogLevel::Warn => LogPriority::High,
            LogLevel::Error | LogLevel::Fatal => LogPriority::Critical,
            _ => LogPriority::Normal,
        }
    }

    #[cfg(feature = "console")]
    pub fn color_code(&self) -> colored::Color {
        use colored::Color::*;
        match self {
            LogLevel::All | LogLevel::Trace => BrightBlack,
            LogLevel::Debug => Blue,
            LogLevel::Info => Green,
            LogLevel::Warn => Yellow,
            LogLevel::Error => Red,
            LogLevel::Fatal | LogLevel::Off => BrightRed,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

impl FromStr for LogLevel {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "ALL" => Ok(LogLevel::All),
            "TRACE" => Ok(LogLevel::Trace),
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARN" | "WARNING" => Ok(LogLevel::Warn),
            "ERROR" => Ok(LogLevel::Error),
            "FATAL" => Ok(LogLevel::Fatal),
            "OFF" => Ok(LogLevel::Off),
            _ => Err(LoggerError::InvalidLevel(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_tokens() {
        assert_eq!("debug".parse::<LogLevel>().unwrap(), LogLevel::Debug);
        assert_eq!("WARNING".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert_eq!("Off".parse::<LogLevel>().unwrap(), LogLevel::Off);
        assert_eq!("ALL".parse::<LogLevel>().unwrap(), LogLevel::All);
    }

    #[test]
    fn test_parse_unknown_token() {
        let err = "BOGUS".parse::<LogLevel>().unwrap_err();
        assert!(matches!(err, LoggerError::InvalidLevel(ref s) if s == "BOGUS"));
        assert!("".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_threshold_semantics() {
        assert!(LogLevel::Info.enables(LogLevel::Warn));
        assert!(LogLevel::Info.enables(LogLevel::Info));
        assert!(!LogLevel::Info.enables(LogLevel::Debug));
        assert!(LogLevel::All.enables(LogLevel::Trace));
        assert!(!LogLevel::Off.enables(LogLevel::Fatal));
        // Markers never pass as entries
        assert!(!LogLevel::All.enables(LogLevel::Off));
    }

    #[test]
    fn test_serde_uses_display_tokens() {
        let json = serde_json::to_string(&LogLevel::Debug).unwrap();
        assert_eq!(json, "\"DEBUG\"");
        let level: LogLevel = serde_json::from_str("\"OFF\"").unwrap();
        assert_eq!(level, LogLevel::Off);
    }
}
