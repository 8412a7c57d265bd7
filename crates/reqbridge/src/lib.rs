//! # reqbridge - asynchronous completion bridge
//!
//! Capture requests finish on arbitrary backend worker threads; the consumer
//! is a single foreign event loop that can only observe readiness through a
//! pollable descriptor. This crate bridges the two: completed work is
//! delivered in order, exactly once, and the descriptor is level-triggered
//! on queue non-emptiness.
//!
//! ```text
//! backend worker threads                      consumer event loop
//!  ┌──────────┐ ┌──────────┐                   ┌────────────────┐
//!  │ worker 0 │ │ worker 1 │  ...               │ poll(event_fd) │
//!  └────┬─────┘ └────┬─────┘                   └───────┬────────┘
//!       │ on_completed│                                │ readable
//!       ▼             ▼                                ▼
//!  ┌─────────────────────────────┐   signal()   ┌─────────────┐
//!  │ Bridge: CompletionQueue ────┼─────────────►│ WakeSignal  │
//!  │         (FIFO, exactly once)│◄─────────────┤ (eventfd)   │
//!  └─────────────────────────────┘   drain()    └─────────────┘
//! ```
//!
//! ## Guarantees
//!
//! - **No loss**: every completion pushed while the bridge runs is returned
//!   by some `drain`, exactly once.
//! - **FIFO**: arrival order at the queue lock is delivery order.
//! - **Level-triggered readiness**: the descriptor is readable whenever the
//!   queue is non-empty; a push racing a drain's clear step never causes a
//!   missed wakeup.
//! - **Clean shutdown**: stop synchronizes with in-flight completion
//!   callbacks and reports (never silently drops) undrained work.
//!
//! ## Quick Start
//!
//! ```ignore
//! use reqbridge::backend::SimBackend;
//! use reqbridge::wake::wait_readable;
//! use reqbridge::{DeviceInfo, DeviceManager};
//! use std::sync::Arc;
//!
//! let backend = Arc::new(SimBackend::new(vec![DeviceInfo {
//!     id: "/base/sim0".into(),
//!     model: "Sim Cam".into(),
//!     streams: 1,
//! }]));
//! let manager = DeviceManager::new(backend.clone())?;
//! manager.start()?;
//!
//! backend.spawn_producers(4, 100);
//! let mut received = 0;
//! while received < 400 {
//!     if wait_readable(manager.event_fd(), Some(500))? {
//!         received += manager.ready_requests().len();
//!     }
//! }
//! manager.stop()?;
//! ```

pub mod backend;
pub mod bridge;
pub mod config;
pub mod export;
pub mod manager;
pub mod wake;

// Re-export core types
pub use reqbridge_core::{
    BridgeError, BridgeResult, CompletedRequest, CompletionQueue, CompletionSink, RequestStatus,
    RequestToken,
};

// Re-export logging macros and helpers
pub use reqbridge_core::{rdebug, rerror, rinfo, rtrace, rwarn};
pub use reqbridge_core::{env, init_logging, set_flush_enabled, set_log_level, LogLevel};

pub use backend::{Backend, DeviceInfo};
pub use bridge::{Bridge, BridgeState};
pub use config::BridgeConfig;
pub use manager::DeviceManager;
pub use wake::{wait_readable, WakeSignal};
