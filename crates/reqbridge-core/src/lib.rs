//! # reqbridge-core
//!
//! Platform-agnostic core of the reqbridge completion bridge.
//!
//! This crate contains no OS-specific code. The pollable wake signal and
//! everything else that touches file descriptors lives in the `reqbridge`
//! crate.
//!
//! ## Modules
//!
//! - `completion` - opaque request handles and the completion-sink trait
//! - `queue` - thread-safe completion FIFO
//! - `error` - error types
//! - `log` - leveled stderr logging macros
//! - `env` - environment variable utilities

pub mod completion;
pub mod env;
pub mod error;
pub mod log;
pub mod queue;

// Re-exports for convenience
pub use completion::{CompletedRequest, CompletionSink, RequestStatus, RequestToken};
pub use env::{env_get, env_get_bool};
pub use error::{BridgeError, BridgeResult};
pub use log::{init as init_logging, set_flush_enabled, set_log_level, LogLevel};
pub use queue::CompletionQueue;
