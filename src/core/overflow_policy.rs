//! What the async dispatcher does when its queue is full

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Policy for handling a full dispatcher queue
///
/// # Example
///
/// ```
/// use log_level_manager::OverflowPolicy;
/// use std::time::Duration;
///
/// let policy = OverflowPolicy::default();
/// assert_eq!(policy, OverflowPolicy::AlertAndDrop);
///
/// let policy = OverflowPolicy::BlockWithTimeout(Duration::from_millis(100));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OverflowPolicy {
    /// Drop the new entry and count it
    DropNewest,

    /// Wait until the worker makes room
    ///
    /// Applies backpressure to the logging call site.
    Block,

    /// Wait up to the given duration, then drop
    BlockWithTimeout(Duration),

    /// Drop, report on stderr and invoke the overflow callback
    #[default]
    AlertAndDrop,
}

impl fmt::Display for OverflowPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverflowPolicy::DropNewest => write!(f, "DropNewest"),
            OverflowPolicy::Block => write!(f, "Block"),
            OverflowPolicy::BlockWithTimeout(d) => write!(f, "BlockWithTimeout({:?})", d),
            OverflowPolicy::AlertAndDrop => write!(f, "AlertAndDrop"),
        }
    }
}

/// Preservation priority of an entry under overflow
///
/// `Critical` entries (Error, Fatal) bypass the policy and are written
/// synchronously.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub enum LogPriority {
    #[default]
    Normal = 0,
    High = 1,
    Critical = 2,
}

/// Called with the running total of dropped entries
pub type OverflowCallback = Arc<dyn Fn(u64) + Send + Sync>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LogLevel;

    #[test]
    fn test_overflow_policy_display() {
        assert_eq!(OverflowPolicy::DropNewest.to_string(), "DropNewest");
        assert_eq!(
            OverflowPolicy::BlockWithTimeout(Duration::from_millis(100)).to_string(),
            "BlockWithTimeout(100ms)"
        );
        assert_eq!(OverflowPolicy::default().to_string(), "AlertAndDrop");
    }

    #[test]
    fn test_priority_by_level() {
        assert_eq!(LogLevel::Trace.priority(), LogPriority::Normal);
        assert_eq!(LogLevel::Info.priority(), LogPriority::Normal);
        assert_eq!(LogLevel::Warn.priority(), LogPriority::High);
        assert_eq!(LogLevel::Error.priority(), LogPriority::Critical);
        assert_eq!(LogLevel::Fatal.priority(), LogPriority::Critical);
        assert!(LogPriority::Normal < LogPriority::Critical);
    }
}
