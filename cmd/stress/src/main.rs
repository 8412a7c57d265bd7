//! Stress: hammer the bridge from many producer threads and verify
//! exactly-once, per-producer-ordered delivery under a polling consumer.
//!
//! Drives the `Bridge` directly, without a manager, to expose the raw
//! producer/consumer handoff.
//!
//! # Environment Variables
//!
//! - `STRESS_PRODUCERS` - producer thread count (default 8)
//! - `STRESS_PER_PRODUCER` - completions per producer (default 100000)

use reqbridge::env::env_get;
use reqbridge::wake::wait_readable;
use reqbridge::{Bridge, CompletedRequest, CompletionSink, RequestStatus, RequestToken};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

fn main() {
    reqbridge::init_logging();

    let producers: u64 = env_get("STRESS_PRODUCERS", 8);
    let per_producer: u64 = env_get("STRESS_PER_PRODUCER", 100_000);
    let expected = producers * per_producer;

    let bridge = Arc::new(Bridge::new().expect("bridge setup failed"));
    bridge.start().expect("bridge start failed");

    let started = Instant::now();
    let mut handles = Vec::new();
    for t in 0..producers {
        let bridge = Arc::clone(&bridge);
        handles.push(
            thread::Builder::new()
                .name(format!("stress-producer-{}", t))
                .spawn(move || {
                    for i in 0..per_producer {
                        bridge.on_completed(CompletedRequest::new(
                            RequestToken::new((t << 32) | i),
                            RequestStatus::Complete,
                        ));
                    }
                })
                .expect("failed to spawn producer"),
        );
    }

    // Single consumer: poll, drain, verify per-producer order.
    let fd = bridge.event_fd();
    let mut next = vec![0u64; producers as usize];
    let mut received = 0u64;
    let mut batches = 0u64;
    let mut largest_batch = 0usize;
    while received < expected {
        if !wait_readable(fd, Some(1000)).expect("poll failed") {
            panic!("wakeup missed: {} of {} received", received, expected);
        }
        let batch = bridge.drain();
        largest_batch = largest_batch.max(batch.len());
        if !batch.is_empty() {
            batches += 1;
        }
        for req in batch {
            let raw = req.token.as_u64();
            let t = (raw >> 32) as usize;
            let i = raw & 0xffff_ffff;
            assert_eq!(i, next[t], "producer {} lost or duplicated a handle", t);
            next[t] += 1;
            received += 1;
        }
    }

    for h in handles {
        h.join().expect("producer panicked");
    }
    let elapsed = started.elapsed();

    let pending = bridge.stop().expect("bridge stop failed");
    assert_eq!(pending, 0);
    assert_eq!(received, expected);
    assert_eq!(bridge.rejected(), 0);

    println!(
        "{} completions from {} producers in {:.3}s ({:.0}/s), {} batches, largest {}",
        received,
        producers,
        elapsed.as_secs_f64(),
        received as f64 / elapsed.as_secs_f64(),
        batches,
        largest_batch
    );
    println!("OK");
}
