//! One instance's event bus
//!
//! Deliveries are queued on an unbounded channel and handled one at a time by
//! a dedicated dispatcher thread, so `publish` never waits on a handler and
//! handlers of one instance never run concurrently with each other.

use super::{cluster::Cluster, BroadcastChannel, Handler};
use crate::core::dispatcher::panic_message;
use crate::core::{BusMetrics, Logger, LoggerError, LoggerRegistry, Result, DEFAULT_SHUTDOWN_TIMEOUT};
use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

const DIAGNOSTICS_LOGGER: &str = "log_level_manager::broadcast";

static NEXT_BUS_ID: AtomicU64 = AtomicU64::new(1);

struct Delivery {
    topic: String,
    payload: Arc<Value>,
}

/// State reachable from the dispatcher thread and from the cluster
pub(crate) struct BusShared {
    id: u64,
    sender: RwLock<Option<Sender<Delivery>>>,
    subscribers: RwLock<HashMap<String, Handler>>,
    /// Queued or in-flight deliveries
    pending: AtomicUsize,
    metrics: BusMetrics,
    diagnostics: RwLock<Logger>,
}

impl BusShared {
    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    pub(crate) fn is_open(&self) -> bool {
        self.sender.read().is_some()
    }

    /// Queue a delivery for this instance's dispatcher
    pub(crate) fn enqueue(&self, topic: &str, payload: Arc<Value>) -> Result<()> {
        let sender = self.sender.read();
        let sender = sender
            .as_ref()
            .ok_or_else(|| LoggerError::transport(topic, "event bus is shut down"))?;

        self.pending.fetch_add(1, Ordering::SeqCst);
        let delivery = Delivery {
            topic: topic.to_string(),
            payload,
        };
        sender.send(delivery).map_err(|_| {
            self.pending.fetch_sub(1, Ordering::SeqCst);
            LoggerError::transport(topic, "event bus dispatcher has stopped")
        })
    }

    fn run(self: Arc<Self>, receiver: Receiver<Delivery>) {
        while let Ok(delivery) = receiver.recv() {
            self.deliver(&delivery);
            self.pending.fetch_sub(1, Ordering::SeqCst);
        }
    }

    fn deliver(&self, delivery: &Delivery) {
        // Clone out so the handler may touch the subscriber table
        let handler = self.subscribers.read().get(&delivery.topic).cloned();
        let Some(handler) = handler else {
            self.metrics.record_undeliverable();
            self.diagnostics.read().trace(format!(
                "bus {}: no subscriber for topic '{}', message dropped",
                self.id, delivery.topic
            ));
            return;
        };

        match catch_unwind(AssertUnwindSafe(|| handler(&delivery.payload))) {
            Ok(()) => {
                self.metrics.record_delivered();
            }
            Err(panic) => {
                self.metrics.record_handler_failure();
                self.diagnostics.read().error(format!(
                    "bus {}: handler for topic '{}' panicked: {}",
                    self.id,
                    delivery.topic,
                    panic_message(panic.as_ref())
                ));
            }
        }
    }
}

/// Event bus of one process instance
///
/// # Example
///
/// ```
/// use log_level_manager::broadcast::{BroadcastChannel, EventBus};
/// use serde_json::{json, Value};
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::time::Duration;
///
/// let bus = EventBus::new();
/// let seen = Arc::new(AtomicUsize::new(0));
/// let counter = Arc::clone(&seen);
/// bus.subscribe("greetings", Arc::new(move |_: &Value| {
///     counter.fetch_add(1, Ordering::SeqCst);
/// })).unwrap();
///
/// bus.publish("greetings", json!("hello"), true).unwrap();
/// assert!(bus.wait_idle(Duration::from_secs(1)));
/// assert_eq!(seen.load(Ordering::SeqCst), 1);
/// ```
pub struct EventBus {
    shared: Arc<BusShared>,
    worker: Mutex<Option<thread::JoinHandle<()>>>,
    cluster: Option<Cluster>,
}

impl EventBus {
    /// Standalone bus: every publish is local
    #[must_use]
    pub fn new() -> Self {
        Self::spawn(None)
    }

    pub(crate) fn spawn(cluster: Option<Cluster>) -> Self {
        let (sender, receiver) = unbounded();
        let id = NEXT_BUS_ID.fetch_add(1, Ordering::Relaxed);
        let shared = Arc::new(BusShared {
            id,
            sender: RwLock::new(Some(sender)),
            subscribers: RwLock::new(HashMap::new()),
            pending: AtomicUsize::new(0),
            metrics: BusMetrics::new(),
            diagnostics: RwLock::new(LoggerRegistry::global().logger(DIAGNOSTICS_LOGGER)),
        });

        let worker_shared = Arc::clone(&shared);
        let worker = thread::Builder::new()
            .name(format!("event-bus-{}", id))
            .spawn(move || worker_shared.run(receiver));

        let worker = match worker {
            Ok(handle) => Some(handle),
            Err(e) => {
                // A bus without a dispatcher cannot deliver anything
                eprintln!("[LOGGER ERROR] Failed to spawn event bus thread: {}", e);
                shared.sender.write().take();
                None
            }
        };

        Self {
            shared,
            worker: Mutex::new(worker),
            cluster,
        }
    }

    /// Send this bus's own diagnostics to `logger`
    #[must_use]
    pub fn with_diagnostics(self, logger: Logger) -> Self {
        *self.shared.diagnostics.write() = logger;
        self
    }

    pub fn id(&self) -> u64 {
        self.shared.id
    }

    pub(crate) fn shared(&self) -> &Arc<BusShared> {
        &self.shared
    }

    pub fn is_open(&self) -> bool {
        self.shared.is_open()
    }

    pub fn is_clustered(&self) -> bool {
        self.cluster.is_some()
    }

    pub fn has_subscriber(&self, topic: &str) -> bool {
        self.shared.subscribers.read().contains_key(topic)
    }

    pub fn metrics(&self) -> &BusMetrics {
        &self.shared.metrics
    }

    /// Deliveries queued on this instance and not yet handled
    pub fn pending(&self) -> usize {
        self.shared.pending.load(Ordering::SeqCst)
    }

    /// Wait until every queued delivery has been handled
    ///
    /// Returns `false` if deliveries are still pending after `timeout`.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        let start = Instant::now();
        while self.pending() > 0 {
            if start.elapsed() >= timeout {
                return false;
            }
            thread::sleep(Duration::from_millis(1));
        }
        true
    }

    /// Stop accepting messages, drain the queue and join the dispatcher
    ///
    /// Returns `false` if the dispatcher did not finish within `timeout`.
    pub fn shutdown(&self, timeout: Duration) -> bool {
        drop(self.shared.sender.write().take());

        let Some(handle) = self.worker.lock().take() else {
            return true;
        };

        let start = Instant::now();
        while !handle.is_finished() {
            if start.elapsed() >= timeout {
                eprintln!(
                    "[LOGGER WARNING] Event bus {} did not drain within {:?}",
                    self.shared.id, timeout
                );
                return false;
            }
            thread::sleep(Duration::from_millis(1));
        }
        if let Err(e) = handle.join() {
            eprintln!("[LOGGER ERROR] Event bus {} dispatcher panicked: {:?}", self.shared.id, e);
            return false;
        }
        true
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for EventBus {
    fn drop(&mut self) {
        self.shutdown(DEFAULT_SHUTDOWN_TIMEOUT);
    }
}

impl BroadcastChannel for EventBus {
    fn subscribe(&self, topic: &str, handler: Handler) -> Result<()> {
        let mut subscribers = self.shared.subscribers.write();
        if subscribers.contains_key(topic) {
            return Err(LoggerError::already_subscribed(topic));
        }
        subscribers.insert(topic.to_string(), handler);
        Ok(())
    }

    fn unsubscribe(&self, topic: &str) -> bool {
        self.shared.subscribers.write().remove(topic).is_some()
    }

    fn publish(&self, topic: &str, payload: Value, local_only: bool) -> Result<()> {
        let payload = Arc::new(payload);

        // Only this instance's own transport decides success
        self.shared.enqueue(topic, Arc::clone(&payload))?;

        if let Some(cluster) = self.cluster.as_ref().filter(|_| !local_only) {
            let reached = cluster.fan_out(topic, payload, self.shared.id) + 1;
            self.shared.diagnostics.read().trace(format!(
                "bus {}: published on '{}' to {} instance(s)",
                self.shared.id, topic, reached
            ));
        }

        self.shared.metrics.record_published();
        Ok(())
    }
}
