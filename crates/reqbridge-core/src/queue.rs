//! Thread-safe completion FIFO.
//!
//! Many producers, one consumer. The total order among concurrent pushes is
//! the order in which callers acquire the internal lock; no ordering is
//! promised across producer threads beyond that. `drain_all` removes the
//! entire queue atomically, so a push racing a drain lands in the *next*
//! drain, never lost and never split across batches.
//!
//! The lock is held only for O(1) queue manipulation (O(n) pointer moves on
//! drain); it is never held across callbacks or I/O.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Unbounded FIFO of completed work handles.
pub struct CompletionQueue<T> {
    queue: Mutex<VecDeque<T>>,
    /// Mirror of queue length for lock-free `len()`.
    len: AtomicUsize,
}

impl<T> CompletionQueue<T> {
    pub fn new() -> Self {
        Self::with_capacity(64)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            queue: Mutex::new(VecDeque::with_capacity(capacity)),
            len: AtomicUsize::new(0),
        }
    }

    /// Append to the tail. Callable from any number of producer threads.
    pub fn push(&self, item: T) {
        let mut q = self.queue.lock().unwrap();
        q.push_back(item);
        self.len.store(q.len(), Ordering::Release);
    }

    /// Atomically remove and return every queued item in FIFO order.
    ///
    /// Single-consumer operation, but safe to run concurrently with `push`:
    /// a push that happens-after the removal point stays queued for the next
    /// drain.
    pub fn drain_all(&self) -> Vec<T> {
        let mut q = self.queue.lock().unwrap();
        if q.is_empty() {
            return Vec::new();
        }
        let out: Vec<T> = q.drain(..).collect();
        self.len.store(0, Ordering::Release);
        out
    }

    /// Current queue length, without taking the lock.
    #[inline]
    pub fn len(&self) -> usize {
        self.len.load(Ordering::Acquire)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Default for CompletionQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_fifo_order() {
        let q = CompletionQueue::new();
        q.push(1u32);
        q.push(2);
        q.push(3);
        assert_eq!(q.len(), 3);
        assert_eq!(q.drain_all(), vec![1, 2, 3]);
        assert!(q.is_empty());
    }

    #[test]
    fn test_drain_empty() {
        let q: CompletionQueue<u32> = CompletionQueue::new();
        assert!(q.drain_all().is_empty());
        assert!(q.drain_all().is_empty());
    }

    #[test]
    fn test_push_after_drain_lands_in_next_drain() {
        let q = CompletionQueue::new();
        q.push(1u32);
        assert_eq!(q.drain_all(), vec![1]);
        q.push(2);
        assert_eq!(q.drain_all(), vec![2]);
    }

    /// No loss, no duplication, per-producer order preserved, with the
    /// consumer draining concurrently with the producers.
    #[test]
    fn test_concurrent_push_drain() {
        const THREADS: u64 = 8;
        const PER_THREAD: u64 = 1000;

        let q = Arc::new(CompletionQueue::new());
        let mut producers = vec![];

        for t in 0..THREADS {
            let q = Arc::clone(&q);
            producers.push(thread::spawn(move || {
                for i in 0..PER_THREAD {
                    q.push((t << 32) | i);
                    if i % 64 == 0 {
                        thread::yield_now();
                    }
                }
            }));
        }

        // Drain while producers run, then once more after they finish.
        let mut seen: Vec<u64> = Vec::with_capacity((THREADS * PER_THREAD) as usize);
        while seen.len() < (THREADS * PER_THREAD) as usize {
            seen.extend(q.drain_all());
            thread::yield_now();
        }
        for p in producers {
            p.join().unwrap();
        }
        seen.extend(q.drain_all());

        assert_eq!(seen.len(), (THREADS * PER_THREAD) as usize);

        // Each producer's pushes are happens-before ordered, so its items
        // must appear as an increasing subsequence of the drained stream.
        let mut next = [0u64; THREADS as usize];
        for item in seen {
            let t = (item >> 32) as usize;
            let i = item & 0xffff_ffff;
            assert_eq!(i, next[t], "producer {} out of order or duplicated", t);
            next[t] += 1;
        }
        for t in 0..THREADS as usize {
            assert_eq!(next[t], PER_THREAD);
        }
    }
}
