//! Backend seam.
//!
//! The bridge treats the device backend as an external collaborator behind
//! this narrow trait: a completion-sink registration pair, a start/stop
//! lifecycle, and three stateless passthrough queries.

use reqbridge_core::completion::CompletionSink;
use reqbridge_core::error::BridgeResult;
use std::sync::Arc;

pub mod sim;
pub use sim::SimBackend;

/// One enumerable capture device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    /// Stable device identifier.
    pub id: String,
    /// Human-readable model name.
    pub model: String,
    /// Number of concurrently capturable streams.
    pub streams: usize,
}

/// The device backend, as seen by the bridge.
///
/// Thread safety of the passthrough queries is the backend's own business;
/// the bridge adds no locking around them.
pub trait Backend: Send + Sync {
    /// Bring the backend up. Fails if the device layer is unavailable or
    /// the backend is already running.
    fn start(&self) -> BridgeResult<()>;

    /// Tear the backend down. Only valid after `remove_sink`.
    fn stop(&self);

    /// Install the completion sink. The backend may invoke
    /// `sink.on_completed` from any of its worker threads, several
    /// concurrently. Fails if a sink is already installed.
    fn install_sink(&self, sink: Arc<dyn CompletionSink>) -> BridgeResult<()>;

    /// Remove the sink. Must not return while any `on_completed` call is
    /// still executing; once it returns the backend delivers nothing more.
    fn remove_sink(&self);

    /// Enumerate currently available devices.
    fn devices(&self) -> Vec<DeviceInfo>;

    /// Look up a device by identifier.
    fn device(&self, id: &str) -> Option<DeviceInfo> {
        self.devices().into_iter().find(|d| d.id == id)
    }

    /// Backend version string.
    fn version(&self) -> String;
}
