//! Completion handles and the sink seam between backend and bridge.

/// Opaque, non-owning reference to one completed capture request.
///
/// The bridge only transports tokens; it never interprets, dereferences, or
/// frees what they refer to. The lifetime of the underlying request object
/// is governed by the backend/consumer contract, outside this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestToken(u64);

impl RequestToken {
    #[inline]
    pub const fn new(raw: u64) -> Self {
        RequestToken(raw)
    }

    #[inline]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

/// Completion status, carried inside the handle.
///
/// A failed completion is transported exactly like a successful one; the
/// bridge never turns a producer-side failure into a bridge-level error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestStatus {
    /// Request completed with valid data.
    Complete,

    /// Request was cancelled before completing.
    Cancelled,

    /// Request completed with a backend error (errno-style code).
    Error(i32),
}

/// One completed unit of backend work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletedRequest {
    /// Handle to the completed request.
    pub token: RequestToken,

    /// How the request finished.
    pub status: RequestStatus,

    /// Backend completion sequence number.
    pub sequence: u64,

    /// Caller-supplied correlation value, passed through untouched.
    pub cookie: u64,
}

impl CompletedRequest {
    pub fn new(token: RequestToken, status: RequestStatus) -> Self {
        Self {
            token,
            status,
            sequence: 0,
            cookie: 0,
        }
    }
}

/// Receives completion notifications from the backend.
///
/// **Contract:**
/// - `on_completed` may be invoked from any backend worker thread, and from
///   several threads concurrently.
/// - It must never block: O(1) enqueue plus wakeup only. In particular it
///   must not call back into the backend.
pub trait CompletionSink: Send + Sync {
    /// One request finished on some backend thread.
    fn on_completed(&self, req: CompletedRequest);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_roundtrip() {
        let t = RequestToken::new(0xdead_beef);
        assert_eq!(t.as_u64(), 0xdead_beef);
        assert_eq!(t, RequestToken::new(0xdead_beef));
    }

    #[test]
    fn test_status_is_data_not_error() {
        // Failure completions are plain data on the handle.
        let req = CompletedRequest::new(RequestToken::new(1), RequestStatus::Error(5));
        assert_eq!(req.status, RequestStatus::Error(5));
        assert_eq!(req.sequence, 0);
    }
}
