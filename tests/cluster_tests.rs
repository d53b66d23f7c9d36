//! Cluster-wide level changes
//!
//! These tests verify:
//! - Cluster-wide writes reach every instance, the publisher included
//! - Local-only writes stay on the publishing instance
//! - Malformed records do not block their siblings
//! - Reads reflect the effective level on each instance
//! - Transport failures are reported to the writer

use log_level_manager::prelude::*;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

const WAIT: Duration = Duration::from_secs(2);

/// One process instance: its logging subsystem, its bus and its service
struct Instance {
    registry: LoggerRegistry,
    bus: Arc<EventBus>,
    service: LogLevelService,
}

impl Instance {
    fn join(cluster: &Cluster) -> Self {
        let registry = LoggerRegistry::new();
        let bus = Arc::new(cluster.join());
        let service = LogLevelService::builder()
            .backend(Arc::new(registry.clone()))
            .channel(bus.clone())
            .diagnostics(registry.logger("levels"))
            .build()
            .expect("valid service configuration");
        service.start().expect("service starts");
        Self {
            registry,
            bus,
            service,
        }
    }

    fn read(&self, loggers: &str) -> Vec<Value> {
        self.service
            .read(&Query::new().with_parameter("loggers", loggers))
    }
}

fn start_cluster(size: usize) -> (Cluster, Vec<Instance>) {
    let cluster = Cluster::new();
    let instances = (0..size).map(|_| Instance::join(&cluster)).collect();
    (cluster, instances)
}

fn settle(instances: &[Instance]) {
    for instance in instances {
        assert!(instance.bus.wait_idle(WAIT), "bus {} did not settle", instance.bus.id());
    }
}

fn write_body(body: Value) -> Query {
    Query::new().with_json_body(&body)
}

#[test]
fn test_cluster_write_reaches_every_instance() {
    let (_cluster, instances) = start_cluster(3);

    instances[0]
        .service
        .write(&write_body(json!([{"name": "io.foo", "level": "DEBUG"}])))
        .unwrap();
    settle(&instances);

    for instance in &instances {
        assert_eq!(
            instance.read("io.foo"),
            vec![json!({"name": "io.foo", "level": "DEBUG"})]
        );
        assert_eq!(instance.registry.level("io.foo"), Some(LogLevel::Debug));
    }
}

#[test]
fn test_local_false_is_cluster_wide() {
    let (_cluster, instances) = start_cluster(2);

    let query = write_body(json!([{"name": "io.foo", "level": "TRACE"}]))
        .with_parameter("local", "false");
    instances[1].service.write(&query).unwrap();
    settle(&instances);

    assert_eq!(instances[0].registry.level("io.foo"), Some(LogLevel::Trace));
    assert_eq!(instances[1].registry.level("io.foo"), Some(LogLevel::Trace));
}

#[test]
fn test_local_write_stays_on_publisher() {
    let (_cluster, instances) = start_cluster(3);

    let query = write_body(json!([{"name": "io.foo", "level": "ERROR"}]))
        .with_parameter("local", "true");
    instances[1].service.write(&query).unwrap();
    settle(&instances);

    assert_eq!(instances[1].registry.level("io.foo"), Some(LogLevel::Error));
    assert_eq!(instances[0].registry.level("io.foo"), None);
    assert_eq!(instances[2].registry.level("io.foo"), None);
    assert_eq!(
        instances[0].read("io.foo"),
        vec![json!({"name": "io.foo", "level": "INFO"})]
    );
}

#[test]
fn test_malformed_record_does_not_block_siblings() {
    let (_cluster, instances) = start_cluster(2);

    let body = json!([
        {"name": "io.foo", "level": "WARN"},
        {"level": "BOGUS"},
        {"name": "io.bar", "level": "NOT-A-LEVEL"},
        "not even an object",
        {"name": "io.baz", "level": "off"},
    ]);
    instances[0].service.write(&write_body(body)).unwrap();
    settle(&instances);

    for instance in &instances {
        assert_eq!(
            instance.read("io.foo;io.bar;io.baz"),
            vec![
                json!({"name": "io.foo", "level": "WARN"}),
                json!({"name": "io.bar", "level": "INFO"}),
                json!({"name": "io.baz", "level": "OFF"}),
            ]
        );
    }
}

#[test]
fn test_records_apply_in_order() {
    let (_cluster, instances) = start_cluster(2);

    let body = json!([
        {"name": "io.foo", "level": "DEBUG"},
        {"name": "io.foo", "level": "ERROR"},
        {"name": "io.foo", "level": "TRACE"},
    ]);
    instances[0].service.write(&write_body(body)).unwrap();
    settle(&instances);

    for instance in &instances {
        assert_eq!(instance.registry.level("io.foo"), Some(LogLevel::Trace));
    }
}

#[test]
fn test_repeated_write_is_idempotent() {
    let (_cluster, instances) = start_cluster(2);
    let body = json!([{"name": "io.foo", "level": "DEBUG"}]);

    for _ in 0..3 {
        instances[0].service.write(&write_body(body.clone())).unwrap();
    }
    settle(&instances);

    for instance in &instances {
        assert_eq!(instance.registry.level("io.foo"), Some(LogLevel::Debug));
    }
}

#[test]
fn test_parent_level_is_inherited_across_cluster() {
    let (_cluster, instances) = start_cluster(2);
    instances[1].registry.logger("io.foo.bar");

    instances[0]
        .service
        .write(&write_body(json!([{"name": "io.foo", "level": "WARN"}])))
        .unwrap();
    settle(&instances);

    let read = instances[1].read("io.foo.bar");
    assert_eq!(read, vec![json!({"name": "io.foo.bar", "level": "WARN"})]);
    assert!(!instances[1].registry.logger("io.foo.bar").is_enabled(LogLevel::Info));
}

#[test]
fn test_clearing_a_level_restores_inheritance() {
    let (_cluster, instances) = start_cluster(2);

    instances[0]
        .service
        .write(&write_body(json!([{"name": "io.foo", "level": "TRACE"}])))
        .unwrap();
    settle(&instances);
    instances[1]
        .service
        .write(&write_body(json!([{"name": "io.foo", "level": ""}])))
        .unwrap();
    settle(&instances);

    for instance in &instances {
        assert_eq!(instance.registry.level("io.foo"), None);
        assert_eq!(
            instance.read("io.foo"),
            vec![json!({"name": "io.foo", "level": "INFO"})]
        );
    }
}

#[test]
fn test_read_all_lists_known_loggers_sorted() {
    let (_cluster, instances) = start_cluster(1);
    let instance = &instances[0];
    instance.registry.logger("zeta");
    instance.registry.logger("alpha.beta");

    let names: Vec<String> = instance
        .service
        .read(&Query::new())
        .iter()
        .map(|record| record["name"].as_str().unwrap_or_default().to_string())
        .collect();

    // "levels" is the diagnostics logger created by the instance itself
    assert_eq!(names, vec!["ROOT", "alpha", "alpha.beta", "levels", "zeta"]);
}

#[test]
fn test_write_after_bus_shutdown_fails() {
    let (_cluster, instances) = start_cluster(2);
    assert!(instances[0].bus.shutdown(WAIT));

    let err = instances[0]
        .service
        .write(&write_body(json!([{"name": "io.foo", "level": "DEBUG"}])))
        .unwrap_err();
    assert!(matches!(err, LoggerError::Transport { .. }));

    // The surviving instance still works
    instances[1]
        .service
        .write(&write_body(json!([{"name": "io.foo", "level": "DEBUG"}])))
        .unwrap();
    assert!(instances[1].bus.wait_idle(WAIT));
    assert_eq!(instances[1].registry.level("io.foo"), Some(LogLevel::Debug));
}

#[test]
fn test_stopped_instance_ignores_broadcasts() {
    let (_cluster, instances) = start_cluster(2);
    assert!(instances[1].service.stop());

    instances[0]
        .service
        .write(&write_body(json!([{"name": "io.foo", "level": "DEBUG"}])))
        .unwrap();
    settle(&instances);

    assert_eq!(instances[0].registry.level("io.foo"), Some(LogLevel::Debug));
    assert_eq!(instances[1].registry.level("io.foo"), None);
    assert_eq!(instances[1].bus.metrics().undeliverable(), 1);
}

#[test]
fn test_concurrent_writers_last_write_wins_per_instance() {
    let (_cluster, instances) = start_cluster(3);
    let instances = Arc::new(instances);

    let writers: Vec<_> = (0..3)
        .map(|i| {
            let instances = Arc::clone(&instances);
            std::thread::spawn(move || {
                let level = ["DEBUG", "WARN", "ERROR"][i];
                for _ in 0..20 {
                    instances[i]
                        .service
                        .write(&write_body(json!([{"name": "io.race", "level": level}])))
                        .expect("publish accepted");
                }
            })
        })
        .collect();
    for writer in writers {
        writer.join().expect("writer thread panicked");
    }
    settle(&instances);

    // No ordering between writers, but every instance ends on one of them
    for instance in instances.iter() {
        let level = instance.registry.level("io.race");
        assert!(
            matches!(level, Some(LogLevel::Debug | LogLevel::Warn | LogLevel::Error)),
            "unexpected level {:?}",
            level
        );
    }
}
