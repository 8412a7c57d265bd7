//! Bridge error types.

use std::fmt;

/// Result type for bridge operations
pub type BridgeResult<T> = std::result::Result<T, BridgeError>;

/// Errors that can occur in bridge operations
#[derive(Debug)]
pub enum BridgeError {
    /// Bridge or backend is already running.
    AlreadyRunning,

    /// Bridge or backend is not running.
    NotRunning,

    /// Bridge was stopped; bridges are single-use and cannot be restarted.
    Stopped,

    /// Backend refused the completion-sink registration.
    RegistrationFailed(&'static str),

    /// Device lookup failed.
    DeviceNotFound(String),

    /// Frame data inconsistent with the stream configuration (export path).
    BadFrame(&'static str),

    /// I/O failure (export path).
    Io(std::io::Error),

    /// OS error with errno.
    Os(i32),
}

impl fmt::Display for BridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyRunning => write!(f, "already running"),
            Self::NotRunning => write!(f, "not running"),
            Self::Stopped => write!(f, "bridge already stopped"),
            Self::RegistrationFailed(why) => write!(f, "registration failed: {}", why),
            Self::DeviceNotFound(id) => write!(f, "device not found: {}", id),
            Self::BadFrame(why) => write!(f, "bad frame: {}", why),
            Self::Io(e) => write!(f, "i/o error: {}", e),
            Self::Os(e) => write!(f, "OS error: errno {}", e),
        }
    }
}

impl std::error::Error for BridgeError {}

impl From<std::io::Error> for BridgeError {
    fn from(e: std::io::Error) -> Self {
        BridgeError::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let e = BridgeError::Stopped;
        assert_eq!(format!("{}", e), "bridge already stopped");

        let e = BridgeError::DeviceNotFound("/base/sim0".into());
        assert_eq!(format!("{}", e), "device not found: /base/sim0");

        let e = BridgeError::Os(11);
        assert_eq!(format!("{}", e), "OS error: errno 11");
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let e: BridgeError = io.into();
        assert!(matches!(e, BridgeError::Io(_)));
    }
}
