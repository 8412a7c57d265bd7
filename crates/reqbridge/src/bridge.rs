//! The completion bridge.
//!
//! Owns the completion queue and the wake signal, and is the completion
//! sink the backend fires from its worker threads. The consumer side is one
//! pollable descriptor plus `drain()`.
//!
//! Level-trigger protocol (`drain`):
//!
//! 1. clear the descriptor
//! 2. atomically drain the queue
//! 3. if the queue is non-empty again, re-signal
//!
//! A producer enqueues before it signals, so a signal consumed by step 1
//! belongs to a handle already visible to step 2. A push landing after
//! step 2 re-arms the descriptor with its own signal; step 3 additionally
//! re-checks under the queue's length so the descriptor can never end up
//! quiescent while work is pending. The cost is an occasional benign
//! spurious wakeup when a handle and its signal are split across a drain.

use crate::config::BridgeConfig;
use crate::wake::WakeSignal;
use reqbridge_core::completion::{CompletedRequest, CompletionSink};
use reqbridge_core::error::{BridgeError, BridgeResult};
use reqbridge_core::queue::CompletionQueue;
use reqbridge_core::{rdebug, rerror, rwarn};

use std::os::unix::io::RawFd;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Mutex;

/// Bridge lifecycle states. Strictly one-way: `Created → Running → Stopped`.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeState {
    Created = 0,
    Running = 1,
    Stopped = 2,
}

impl BridgeState {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => BridgeState::Created,
            1 => BridgeState::Running,
            _ => BridgeState::Stopped,
        }
    }
}

/// Completion bridge between backend worker threads and one consumer.
pub struct Bridge {
    queue: CompletionQueue<CompletedRequest>,
    wake: WakeSignal,
    state: AtomicU8,

    /// Completions observed outside Running. Reachable only if a backend
    /// violates the `remove_sink` join contract; counted, never enqueued.
    rejected: AtomicU64,

    /// Serializes drain calls. Concurrent drains are a usage violation
    /// (single-consumer contract); this degrades them to duplicate-empty
    /// batches instead of split ones.
    drain_lock: Mutex<()>,

    warn_on_pending: bool,
}

impl Bridge {
    /// Create a bridge with default configuration.
    ///
    /// Fails if the OS readiness primitive cannot be created; no partial
    /// state is left behind.
    pub fn new() -> BridgeResult<Self> {
        Self::with_config(&BridgeConfig::default())
    }

    pub fn with_config(config: &BridgeConfig) -> BridgeResult<Self> {
        Ok(Self {
            queue: CompletionQueue::with_capacity(config.queue_capacity),
            wake: WakeSignal::new()?,
            state: AtomicU8::new(BridgeState::Created as u8),
            rejected: AtomicU64::new(0),
            drain_lock: Mutex::new(()),
            warn_on_pending: config.warn_on_pending,
        })
    }

    #[inline]
    pub fn state(&self) -> BridgeState {
        BridgeState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// The pollable readiness descriptor: readable ⇔ completions pending.
    #[inline]
    pub fn event_fd(&self) -> RawFd {
        self.wake.fd()
    }

    /// `Created → Running`. Completions are accepted from here on.
    pub fn start(&self) -> BridgeResult<()> {
        self.state
            .compare_exchange(
                BridgeState::Created as u8,
                BridgeState::Running as u8,
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .map_err(|cur| match BridgeState::from_u8(cur) {
                BridgeState::Running => BridgeError::AlreadyRunning,
                _ => BridgeError::Stopped,
            })?;
        rdebug!("bridge running (event fd {})", self.wake.fd());
        Ok(())
    }

    /// `Running → Stopped`. Returns the number of undrained completions.
    ///
    /// The caller must have unregistered from the backend first (see
    /// `DeviceManager::stop`), so no callback is in flight when this runs.
    /// Undrained handles are reported, not dropped: `pending()` keeps
    /// counting them and one final `drain()` still returns them.
    pub fn stop(&self) -> BridgeResult<usize> {
        self.state
            .compare_exchange(
                BridgeState::Running as u8,
                BridgeState::Stopped as u8,
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .map_err(|cur| match BridgeState::from_u8(cur) {
                BridgeState::Stopped => BridgeError::Stopped,
                _ => BridgeError::NotRunning,
            })?;
        let pending = self.queue.len();
        if pending > 0 && self.warn_on_pending {
            rwarn!(
                "bridge stopped with {} undrained completion(s); a final drain() can still collect them",
                pending
            );
        }
        Ok(pending)
    }

    /// Consumer entry point: remove and return everything pending, in
    /// arrival order, and reset the readiness descriptor if that emptied
    /// the queue.
    ///
    /// Must be called from the single consumer thread. After `stop` it
    /// returns whatever remains once; thereafter the bridge is inert.
    pub fn drain(&self) -> Vec<CompletedRequest> {
        let _guard = self.drain_lock.lock().unwrap();

        // Clear first: a producer that signals after this read re-arms the
        // descriptor on its own.
        if let Err(e) = self.wake.clear() {
            rwarn!("wake clear failed: {}", e);
        }
        let batch = self.queue.drain_all();
        // Re-check: anything that slipped in since the drain keeps (or
        // regains) a readable descriptor.
        if !self.queue.is_empty() {
            if let Err(e) = self.wake.signal() {
                rerror!("wake re-signal failed, consumer may stall: {}", e);
            }
        }
        batch
    }

    /// Number of completions currently queued (undrained).
    #[inline]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Number of completions rejected outside the Running state.
    #[inline]
    pub fn rejected(&self) -> u64 {
        self.rejected.load(Ordering::Relaxed)
    }
}

impl CompletionSink for Bridge {
    /// Backend-facing completion handler. Runs on whatever thread the
    /// backend chooses; does O(1) work only: enqueue, then signal.
    fn on_completed(&self, req: CompletedRequest) {
        if self.state.load(Ordering::Acquire) != BridgeState::Running as u8 {
            let total = self.rejected.fetch_add(1, Ordering::Relaxed) + 1;
            rwarn!(
                "completion for request {} arrived outside Running (total rejected: {})",
                req.token.as_u64(),
                total
            );
            return;
        }
        self.queue.push(req);
        if let Err(e) = self.wake.signal() {
            rerror!("wake signal failed, consumer may stall: {}", e);
        }
    }
}
