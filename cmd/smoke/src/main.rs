//! Smoke test: simulated backend, poll(2)-driven consumer loop.
//!
//! Producer threads complete requests from the backend side while the main
//! thread plays the foreign event loop: poll the bridge descriptor, drain,
//! repeat.
//!
//! # Environment Variables
//!
//! - `SMOKE_PRODUCERS` - producer thread count (default 4)
//! - `SMOKE_PER_PRODUCER` - completions per producer (default 250)
//! - `RQB_LOG_LEVEL=debug` - bridge debug logging

use reqbridge::backend::SimBackend;
use reqbridge::env::env_get;
use reqbridge::wake::wait_readable;
use reqbridge::{DeviceInfo, DeviceManager};
use std::sync::Arc;

fn main() {
    reqbridge::init_logging();

    let producers: usize = env_get("SMOKE_PRODUCERS", 4);
    let per_producer: usize = env_get("SMOKE_PER_PRODUCER", 250);
    let expected = producers * per_producer;

    let backend = Arc::new(SimBackend::new(vec![
        DeviceInfo {
            id: "/base/sim0".into(),
            model: "Sim Cam A".into(),
            streams: 2,
        },
        DeviceInfo {
            id: "/base/sim1".into(),
            model: "Sim Cam B".into(),
            streams: 1,
        },
    ]));

    let manager = DeviceManager::new(backend.clone()).expect("bridge setup failed");
    manager.start().expect("manager start failed");

    println!("backend {} with {} device(s):", manager.version(), manager.devices().len());
    for dev in manager.devices() {
        println!("  {} ({}, {} stream(s))", dev.id, dev.model, dev.streams);
    }

    backend.spawn_producers(producers, per_producer);

    let fd = manager.event_fd();
    let mut received = 0usize;
    let mut batches = 0usize;
    let mut spurious = 0usize;
    while received < expected {
        if !wait_readable(fd, Some(500)).expect("poll failed") {
            continue;
        }
        let batch = manager.ready_requests();
        if batch.is_empty() {
            spurious += 1;
            continue;
        }
        received += batch.len();
        batches += 1;
    }

    let pending = manager.stop().expect("manager stop failed");
    println!(
        "received {} completions in {} batches ({} spurious wakeups), {} pending at stop",
        received, batches, spurious, pending
    );
    assert_eq!(received, expected);
    assert_eq!(pending, 0);
    println!("OK");
}
