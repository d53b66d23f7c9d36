//! A set of event buses that see each other's cluster-wide publishes

use super::event_bus::{BusShared, EventBus};
use parking_lot::RwLock;
use serde_json::Value;
use std::sync::{Arc, Weak};

/// Cluster membership shared by every joined bus
///
/// Members are held weakly; a bus that is dropped or shut down simply stops
/// receiving. Fan-out to other instances is best effort: a member that can no
/// longer accept a message is skipped, and only the publishing instance's own
/// transport state decides whether `publish` fails.
///
/// # Example
///
/// ```
/// use log_level_manager::broadcast::Cluster;
///
/// let cluster = Cluster::new();
/// let first = cluster.join();
/// let second = cluster.join();
/// assert_eq!(cluster.members(), 2);
///
/// drop(second);
/// assert_eq!(cluster.members(), 1);
/// # drop(first);
/// ```
#[derive(Clone, Default)]
pub struct Cluster {
    members: Arc<RwLock<Vec<Weak<BusShared>>>>,
}

impl Cluster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new instance bus that is a member of this cluster
    pub fn join(&self) -> EventBus {
        let bus = EventBus::spawn(Some(self.clone()));
        {
            let mut members = self.members.write();
            members.retain(is_live);
            members.push(Arc::downgrade(bus.shared()));
        }
        bus
    }

    /// Number of members still accepting messages
    pub fn members(&self) -> usize {
        self.members
            .read()
            .iter()
            .filter_map(Weak::upgrade)
            .filter(|member| member.is_open())
            .count()
    }

    /// Queue `payload` on every live member except `publisher`, returning how
    /// many accepted it
    pub(crate) fn fan_out(&self, topic: &str, payload: Arc<Value>, publisher: u64) -> usize {
        let live: Vec<Arc<BusShared>> = {
            let mut members = self.members.write();
            members.retain(is_live);
            members
                .iter()
                .filter_map(Weak::upgrade)
                .filter(|member| member.id() != publisher)
                .collect()
        };

        live.iter()
            .filter(|member| match member.enqueue(topic, Arc::clone(&payload)) {
                Ok(()) => true,
                Err(e) => {
                    eprintln!("[LOGGER WARNING] Skipping bus {}: {}", member.id(), e);
                    false
                }
            })
            .count()
    }
}

fn is_live(member: &Weak<BusShared>) -> bool {
    member.upgrade().is_some_and(|m| m.is_open())
}
