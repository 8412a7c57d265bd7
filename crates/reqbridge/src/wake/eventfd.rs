//! eventfd-backed wake signal (Linux).
//!
//! A write adds to the eventfd counter, a read drains it to zero, so any
//! number of `signal()` calls before the consumer clears collapse into one
//! wakeup. EAGAIN on write means the counter is saturated, which already
//! implies a pending signal.

use reqbridge_core::error::{BridgeError, BridgeResult};
use std::os::unix::io::RawFd;

pub struct WakeSignal {
    fd: RawFd,
}

impl WakeSignal {
    pub fn new() -> BridgeResult<Self> {
        let fd = unsafe { libc::eventfd(0, libc::EFD_NONBLOCK | libc::EFD_CLOEXEC) };
        if fd < 0 {
            return Err(BridgeError::Os(errno()));
        }
        Ok(Self { fd })
    }

    /// The pollable descriptor. Readable while signaled.
    #[inline]
    pub fn fd(&self) -> RawFd {
        self.fd
    }

    /// Transition to signaled. Idempotent, never blocks.
    pub fn signal(&self) -> BridgeResult<()> {
        let val: u64 = 1;
        let ret = unsafe {
            libc::write(
                self.fd,
                &val as *const u64 as *const libc::c_void,
                std::mem::size_of::<u64>(),
            )
        };
        if ret < 0 {
            let errno = errno();
            // EAGAIN: counter would overflow, so a signal is already pending.
            if errno == libc::EAGAIN {
                return Ok(());
            }
            return Err(BridgeError::Os(errno));
        }
        Ok(())
    }

    /// Consume the OS-level signal. EAGAIN means already quiescent.
    pub fn clear(&self) -> BridgeResult<()> {
        let mut val: u64 = 0;
        let ret = unsafe {
            libc::read(
                self.fd,
                &mut val as *mut u64 as *mut libc::c_void,
                std::mem::size_of::<u64>(),
            )
        };
        if ret < 0 {
            let errno = errno();
            if errno == libc::EAGAIN {
                return Ok(());
            }
            return Err(BridgeError::Os(errno));
        }
        Ok(())
    }
}

impl Drop for WakeSignal {
    fn drop(&mut self) {
        if self.fd >= 0 {
            unsafe {
                libc::close(self.fd);
            }
            self.fd = -1;
        }
    }
}

#[inline]
fn errno() -> i32 {
    unsafe { *libc::__errno_location() }
}
