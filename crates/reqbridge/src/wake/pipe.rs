//! Pipe-backed wake signal (non-Linux POSIX).
//!
//! The read end is the pollable descriptor. Signaling writes one byte; a
//! full pipe (EAGAIN) already guarantees readability, so the write coalesces
//! away. `clear()` drains everything that accumulated.

use reqbridge_core::error::{BridgeError, BridgeResult};
use std::os::unix::io::RawFd;

pub struct WakeSignal {
    read_fd: RawFd,
    write_fd: RawFd,
}

impl WakeSignal {
    pub fn new() -> BridgeResult<Self> {
        let mut fds = [0 as libc::c_int; 2];
        if unsafe { libc::pipe(fds.as_mut_ptr()) } < 0 {
            return Err(BridgeError::Os(last_errno()));
        }
        for &fd in &fds {
            if set_nonblock_cloexec(fd).is_err() {
                unsafe {
                    libc::close(fds[0]);
                    libc::close(fds[1]);
                }
                return Err(BridgeError::Os(last_errno()));
            }
        }
        Ok(Self {
            read_fd: fds[0],
            write_fd: fds[1],
        })
    }

    /// The pollable descriptor (read end). Readable while signaled.
    #[inline]
    pub fn fd(&self) -> RawFd {
        self.read_fd
    }

    /// Transition to signaled. Idempotent, never blocks.
    pub fn signal(&self) -> BridgeResult<()> {
        let byte = 1u8;
        let ret = unsafe { libc::write(self.write_fd, &byte as *const u8 as *const libc::c_void, 1) };
        if ret < 0 {
            let errno = last_errno();
            // Pipe full: plenty of unread signal bytes already pending.
            if errno == libc::EAGAIN {
                return Ok(());
            }
            return Err(BridgeError::Os(errno));
        }
        Ok(())
    }

    /// Consume the OS-level signal, draining all accumulated bytes.
    pub fn clear(&self) -> BridgeResult<()> {
        let mut buf = [0u8; 64];
        loop {
            let ret =
                unsafe { libc::read(self.read_fd, buf.as_mut_ptr() as *mut libc::c_void, buf.len()) };
            if ret < 0 {
                let errno = last_errno();
                if errno == libc::EAGAIN {
                    return Ok(()); // drained
                }
                return Err(BridgeError::Os(errno));
            }
            if (ret as usize) < buf.len() {
                return Ok(());
            }
        }
    }
}

impl Drop for WakeSignal {
    fn drop(&mut self) {
        unsafe {
            if self.read_fd >= 0 {
                libc::close(self.read_fd);
            }
            if self.write_fd >= 0 {
                libc::close(self.write_fd);
            }
        }
        self.read_fd = -1;
        self.write_fd = -1;
    }
}

fn set_nonblock_cloexec(fd: RawFd) -> std::io::Result<()> {
    unsafe {
        let flags = libc::fcntl(fd, libc::F_GETFL);
        if flags < 0 || libc::fcntl(fd, libc::F_SETFL, flags | libc::O_NONBLOCK) < 0 {
            return Err(std::io::Error::last_os_error());
        }
        let fdflags = libc::fcntl(fd, libc::F_GETFD);
        if fdflags < 0 || libc::fcntl(fd, libc::F_SETFD, fdflags | libc::FD_CLOEXEC) < 0 {
            return Err(std::io::Error::last_os_error());
        }
    }
    Ok(())
}

#[inline]
fn last_errno() -> i32 {
    std::io::Error::last_os_error().raw_os_error().unwrap_or(-1)
}
