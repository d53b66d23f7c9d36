//! Hands accepted entries to the appenders
//!
//! Every named logger of a registry shares one dispatcher. In synchronous mode
//! entries are written on the calling thread; in async mode they go through a
//! bounded channel to a worker thread that writes them in batches.

use super::{
    appender::Appender,
    error::Result,
    log_entry::LogEntry,
    metrics::LoggerMetrics,
    overflow_policy::{LogPriority, OverflowCallback, OverflowPolicy},
};
use crossbeam_channel::{bounded, Receiver, SendTimeoutError, Sender, TrySendError};
use parking_lot::RwLock;
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Default shutdown timeout for the async worker (5 seconds)
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

const BATCH_SIZE: usize = 50;

type Appenders = Arc<RwLock<Vec<Box<dyn Appender>>>>;

pub struct Dispatcher {
    appenders: Appenders,
    sender: RwLock<Option<Sender<LogEntry>>>,
    worker: parking_lot::Mutex<Option<thread::JoinHandle<()>>>,
    metrics: Arc<LoggerMetrics>,
    overflow_policy: OverflowPolicy,
    on_overflow: Option<OverflowCallback>,
}

impl Dispatcher {
    /// Synchronous dispatcher: appenders run on the logging thread
    #[must_use]
    pub fn new() -> Self {
        Self {
            appenders: Arc::new(RwLock::new(Vec::new())),
            sender: RwLock::new(None),
            worker: parking_lot::Mutex::new(None),
            metrics: Arc::new(LoggerMetrics::new()),
            overflow_policy: OverflowPolicy::AlertAndDrop,
            on_overflow: None,
        }
    }

    /// Async dispatcher with a bounded queue of `buffer_size` entries
    #[must_use]
    pub fn with_async(
        buffer_size: usize,
        overflow_policy: OverflowPolicy,
        on_overflow: Option<OverflowCallback>,
    ) -> Self {
        let (sender, receiver) = bounded(buffer_size.max(1));
        let appenders: Appenders = Arc::new(RwLock::new(Vec::new()));
        let metrics = Arc::new(LoggerMetrics::new());

        let worker_appenders = Arc::clone(&appenders);
        let worker_metrics = Arc::clone(&metrics);
        let handle = thread::Builder::new()
            .name("log-dispatcher".into())
            .spawn(move || Self::run_worker(receiver, worker_appenders, worker_metrics));

        let (sender, worker) = match handle {
            Ok(handle) => (Some(sender), Some(handle)),
            Err(e) => {
                // Without a worker we stay correct by writing synchronously
                eprintln!(
                    "[LOGGER ERROR] Failed to spawn dispatcher thread, using sync mode: {}",
                    e
                );
                (None, None)
            }
        };

        Self {
            appenders,
            sender: RwLock::new(sender),
            worker: parking_lot::Mutex::new(worker),
            metrics,
            overflow_policy,
            on_overflow,
        }
    }

    fn run_worker(receiver: Receiver<LogEntry>, appenders: Appenders, metrics: Arc<LoggerMetrics>) {
        let mut batch = Vec::with_capacity(BATCH_SIZE);

        // recv() fails once every sender is gone: queue drained, exit
        while let Ok(entry) = receiver.recv() {
            batch.push(entry);
            while batch.len() < BATCH_SIZE {
                match receiver.try_recv() {
                    Ok(entry) => batch.push(entry),
                    Err(_) => break,
                }
            }

            let mut guard = appenders.write();
            for entry in &batch {
                Self::write_entry(&mut guard, entry, &metrics);
            }
            Self::flush_all(&mut guard);
            batch.clear();
        }
    }

    /// Write one entry to every appender, isolating failures per appender
    fn write_entry(
        appenders: &mut [Box<dyn Appender>],
        entry: &LogEntry,
        metrics: &LoggerMetrics,
    ) {
        let mut has_error = false;

        for appender in appenders.iter_mut() {
            match catch_unwind(AssertUnwindSafe(|| appender.append(entry))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    eprintln!("[LOGGER ERROR] Appender '{}' failed: {}", appender.name(), e);
                    has_error = true;
                }
                Err(panic) => {
                    eprintln!(
                        "[LOGGER CRITICAL] Appender '{}' panicked: {}. \
                         Other appenders continue to function.",
                        appender.name(),
                        panic_message(panic.as_ref())
                    );
                    has_error = true;
                }
            }
        }

        if has_error {
            metrics.record_dropped();
        } else {
            metrics.record_logged();
        }
    }

    fn flush_all(appenders: &mut [Box<dyn Appender>]) {
        for appender in appenders.iter_mut() {
            match catch_unwind(AssertUnwindSafe(|| appender.flush())) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    eprintln!("[LOGGER ERROR] Appender '{}' flush failed: {}", appender.name(), e)
                }
                Err(panic) => eprintln!(
                    "[LOGGER CRITICAL] Appender '{}' panicked during flush: {}",
                    appender.name(),
                    panic_message(panic.as_ref())
                ),
            }
        }
    }

    pub fn add_appender(&self, appender: Box<dyn Appender>) {
        self.appenders.write().push(appender);
    }

    pub fn appender_count(&self) -> usize {
        self.appenders.read().len()
    }

    pub fn is_async(&self) -> bool {
        self.sender.read().is_some()
    }

    /// Queue or write an entry that already passed its logger's level
    pub fn dispatch(&self, entry: LogEntry) {
        let sender = self.sender.read();
        let Some(sender) = sender.as_ref() else {
            let mut appenders = self.appenders.write();
            Self::write_entry(&mut appenders, &entry, &self.metrics);
            return;
        };

        let priority = entry.level.priority();
        match sender.try_send(entry) {
            Ok(()) => {}
            Err(TrySendError::Full(entry)) => self.handle_overflow(sender, entry, priority),
            // Shutting down
            Err(TrySendError::Disconnected(_)) => {}
        }
    }

    fn handle_overflow(&self, sender: &Sender<LogEntry>, entry: LogEntry, priority: LogPriority) {
        self.metrics.record_queue_full();

        if priority == LogPriority::Critical {
            self.metrics.record_critical_preserved();
            let mut appenders = self.appenders.write();
            Self::write_entry(&mut appenders, &entry, &self.metrics);
            return;
        }

        match &self.overflow_policy {
            OverflowPolicy::DropNewest => {
                self.metrics.record_dropped();
            }
            OverflowPolicy::Block => {
                self.metrics.record_block();
                let _ = sender.send(entry);
            }
            OverflowPolicy::BlockWithTimeout(timeout) => {
                self.metrics.record_block();
                if let Err(SendTimeoutError::Timeout(_)) = sender.send_timeout(entry, *timeout) {
                    self.alert_and_drop();
                }
            }
            OverflowPolicy::AlertAndDrop => self.alert_and_drop(),
        }
    }

    fn alert_and_drop(&self) {
        let dropped = self.metrics.record_dropped() + 1;

        // First drop, then every thousandth
        if dropped == 1 || dropped % 1000 == 0 {
            eprintln!(
                "[LOGGER WARNING] Queue full, {} logs dropped. \
                 Consider increasing buffer size or using a different overflow policy.",
                dropped
            );
            if let Some(ref callback) = self.on_overflow {
                callback(dropped);
            }
        }
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        &self.metrics
    }

    pub fn flush(&self) -> Result<()> {
        let mut appenders = self.appenders.write();
        for appender in appenders.iter_mut() {
            appender.flush()?;
        }
        Ok(())
    }

    /// Close the queue, wait for the worker to drain it, then flush
    ///
    /// Returns `false` if the worker did not finish within `timeout` or the
    /// final flush failed. Calling it again is a no-op that only flushes.
    pub fn shutdown(&self, timeout: Duration) -> bool {
        drop(self.sender.write().take());

        if let Some(handle) = self.worker.lock().take() {
            let start = Instant::now();
            while !handle.is_finished() {
                if start.elapsed() >= timeout {
                    eprintln!(
                        "[LOGGER WARNING] Dispatcher did not finish within {:?}. \
                         Some logs may be lost.",
                        timeout
                    );
                    return false;
                }
                thread::sleep(Duration::from_millis(5));
            }
            if let Err(e) = handle.join() {
                eprintln!("[LOGGER ERROR] Dispatcher thread panicked: {:?}", e);
                return false;
            }
        }

        if let Err(e) = self.flush() {
            eprintln!("[LOGGER ERROR] Failed to flush during shutdown: {}", e);
            return false;
        }
        true
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        self.shutdown(DEFAULT_SHUTDOWN_TIMEOUT);

        let dropped = self.metrics.dropped_count();
        if dropped > 0 {
            eprintln!(
                "[LOGGER WARNING] Dispatcher shutting down with {} dropped logs (drop rate: {:.2}%)",
                dropped,
                self.metrics.drop_rate()
            );
        }
    }
}

/// Best-effort text of a panic payload
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
