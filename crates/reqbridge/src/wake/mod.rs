//! Level-triggered wake signal.
//!
//! One pollable descriptor, readable exactly while the signal is in the
//! signaled state. `signal()` coalesces: any number of calls before the
//! consumer clears collapse into a single wakeup. `clear()` consumes the
//! OS-level signal.
//!
//! Linux uses an eventfd; other POSIX platforms fall back to a non-blocking
//! pipe. External behavior (level-triggered, coalesced) is identical.

use cfg_if::cfg_if;

cfg_if! {
    if #[cfg(target_os = "linux")] {
        mod eventfd;
        pub use eventfd::WakeSignal;
    } else if #[cfg(unix)] {
        mod pipe;
        pub use pipe::WakeSignal;
    } else {
        compile_error!("reqbridge requires a POSIX platform (eventfd or pipe)");
    }
}

use nix::poll::{poll, PollFd, PollFlags, PollTimeout};
use reqbridge_core::error::{BridgeError, BridgeResult};
use std::os::fd::BorrowedFd;
use std::os::unix::io::RawFd;

/// Wait until `fd` is readable.
///
/// `timeout_ms = None` blocks indefinitely; `Some(0)` is a non-blocking
/// readability probe. Returns `Ok(false)` on timeout. EINTR is retried.
pub fn wait_readable(fd: RawFd, timeout_ms: Option<u16>) -> BridgeResult<bool> {
    // Safety: the caller guarantees fd stays open for the duration of the call.
    let borrowed = unsafe { BorrowedFd::borrow_raw(fd) };
    let timeout = match timeout_ms {
        Some(ms) => PollTimeout::from(ms),
        None => PollTimeout::NONE,
    };
    loop {
        let mut fds = [PollFd::new(borrowed, PollFlags::POLLIN)];
        match poll(&mut fds, timeout) {
            Ok(0) => return Ok(false),
            Ok(_) => {
                let revents = fds[0].revents().unwrap_or(PollFlags::empty());
                return Ok(revents.contains(PollFlags::POLLIN));
            }
            Err(nix::errno::Errno::EINTR) => continue,
            Err(e) => return Err(BridgeError::Os(e as i32)),
        }
    }
}
