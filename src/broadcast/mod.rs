//! Publish/subscribe transport between process instances
//!
//! [`BroadcastChannel`] is what the level service needs from a message bus.
//! [`EventBus`] implements it for one instance; joining several buses to a
//! [`Cluster`] makes non-local publishes reach all of them.

pub mod cluster;
pub mod event_bus;

pub use cluster::Cluster;
pub use event_bus::EventBus;

use crate::core::Result;
use serde_json::Value;
use std::sync::Arc;

/// Callback invoked with each message delivered on a topic
///
/// Runs on the instance's dispatcher thread and must return quickly.
pub type Handler = Arc<dyn Fn(&Value) + Send + Sync>;

pub trait BroadcastChannel: Send + Sync {
    /// Register the handler for `topic` on this instance
    ///
    /// Fails with [`LoggerError::AlreadySubscribed`](crate::LoggerError::AlreadySubscribed)
    /// if one is registered already.
    fn subscribe(&self, topic: &str, handler: Handler) -> Result<()>;

    /// Remove the handler for `topic`, returning whether one was registered
    fn unsubscribe(&self, topic: &str) -> bool;

    /// Hand `payload` to the transport and return without waiting for delivery
    ///
    /// With `local_only` only this instance's subscriber receives it,
    /// otherwise every instance's subscriber does, this one included.
    fn publish(&self, topic: &str, payload: Value, local_only: bool) -> Result<()>;
}
