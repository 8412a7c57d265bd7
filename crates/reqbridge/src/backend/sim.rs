//! Simulated backend.
//!
//! Producer threads stand in for a hardware pipeline's completion threads.
//! `remove_sink` honors the Backend contract the hard way: it raises the
//! shutdown flag and joins every producer before dropping the sink, so no
//! completion callback can still be executing after it returns.

use super::{Backend, DeviceInfo};
use reqbridge_core::completion::{CompletedRequest, CompletionSink, RequestStatus, RequestToken};
use reqbridge_core::error::{BridgeError, BridgeResult};
use reqbridge_core::rdebug;

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

struct SinkSlot {
    sink: Option<Arc<dyn CompletionSink>>,
    producers: Vec<JoinHandle<()>>,
}

/// In-process backend double with real producer threads.
pub struct SimBackend {
    devices: Vec<DeviceInfo>,
    slot: Mutex<SinkSlot>,
    running: AtomicBool,
    shutdown: AtomicBool,
    /// Global completion sequence counter.
    seq: AtomicU64,
    /// Refuse `start()` — registration-failure testing knob.
    unavailable: bool,
}

impl SimBackend {
    pub fn new(devices: Vec<DeviceInfo>) -> Self {
        Self {
            devices,
            slot: Mutex::new(SinkSlot {
                sink: None,
                producers: Vec::new(),
            }),
            running: AtomicBool::new(false),
            shutdown: AtomicBool::new(false),
            seq: AtomicU64::new(0),
            unavailable: false,
        }
    }

    /// A backend whose device layer is down: `start()` always fails.
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::new(Vec::new())
        }
    }

    /// Deliver one completion on the calling thread.
    ///
    /// Returns false if no sink is installed. Callers other than the
    /// spawned producers must not race `remove_sink`.
    pub fn complete(&self, token: u64, status: RequestStatus, cookie: u64) -> bool {
        let sink = self.slot.lock().unwrap().sink.clone();
        match sink {
            Some(s) => {
                let sequence = self.seq.fetch_add(1, Ordering::Relaxed);
                s.on_completed(CompletedRequest {
                    token: RequestToken::new(token),
                    status,
                    sequence,
                    cookie,
                });
                true
            }
            None => false,
        }
    }

    /// Spawn `threads` producer threads, each completing `per_thread`
    /// requests as fast as it can. Tokens encode (thread index << 32 |
    /// iteration) so consumers can check per-producer ordering.
    pub fn spawn_producers(self: &Arc<Self>, threads: usize, per_thread: usize) {
        for t in 0..threads {
            let be = Arc::clone(self);
            let handle = thread::Builder::new()
                .name(format!("sim-producer-{}", t))
                .spawn(move || {
                    for i in 0..per_thread {
                        if be.shutdown.load(Ordering::Acquire) {
                            rdebug!("sim-producer-{} stopping early at {}", t, i);
                            break;
                        }
                        let token = ((t as u64) << 32) | i as u64;
                        be.complete(token, RequestStatus::Complete, 0);
                        if i % 64 == 0 {
                            thread::yield_now();
                        }
                    }
                })
                .expect("failed to spawn sim producer");
            self.slot.lock().unwrap().producers.push(handle);
        }
    }
}

impl Backend for SimBackend {
    fn start(&self) -> BridgeResult<()> {
        if self.unavailable {
            return Err(BridgeError::RegistrationFailed("device unavailable"));
        }
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(BridgeError::AlreadyRunning);
        }
        Ok(())
    }

    fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    fn install_sink(&self, sink: Arc<dyn CompletionSink>) -> BridgeResult<()> {
        let mut slot = self.slot.lock().unwrap();
        if slot.sink.is_some() {
            return Err(BridgeError::RegistrationFailed("sink already installed"));
        }
        self.shutdown.store(false, Ordering::Release);
        slot.sink = Some(sink);
        Ok(())
    }

    fn remove_sink(&self) {
        self.shutdown.store(true, Ordering::Release);
        // Join without holding the lock; producers take it in complete().
        let producers = {
            let mut slot = self.slot.lock().unwrap();
            std::mem::take(&mut slot.producers)
        };
        for handle in producers {
            let _ = handle.join();
        }
        self.slot.lock().unwrap().sink = None;
    }

    fn devices(&self) -> Vec<DeviceInfo> {
        self.devices.clone()
    }

    fn version(&self) -> String {
        format!("sim-backend {}", env!("CARGO_PKG_VERSION"))
    }
}
