//! Bridge configuration.
//!
//! Compile-time defaults with runtime environment overrides, builder style.
//!
//! Environment variables (all optional):
//!
//! - `RQB_QUEUE_CAPACITY` - initial completion-queue capacity
//! - `RQB_WARN_PENDING` - warn when stopping with undrained completions
//!   (default on)

use reqbridge_core::env::{env_get, env_get_bool};

/// Default initial capacity of the completion queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Initial completion-queue capacity (the queue itself is unbounded).
    pub queue_capacity: usize,
    /// Warn-log when the bridge stops with undrained completions.
    pub warn_on_pending: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

impl BridgeConfig {
    /// Defaults with environment overrides applied.
    pub fn from_env() -> Self {
        Self {
            queue_capacity: env_get("RQB_QUEUE_CAPACITY", DEFAULT_QUEUE_CAPACITY),
            warn_on_pending: env_get_bool("RQB_WARN_PENDING", true),
        }
    }

    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    pub fn warn_on_pending(mut self, warn: bool) -> Self {
        self.warn_on_pending = warn;
        self
    }
}
