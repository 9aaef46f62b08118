/*!
 * Buffer Pooling for Hot Paths
 * Reduces allocation pressure by reusing output buffers between calls
 */

use super::limits::{POOL_RETAIN_MAX, SHARED_POOL_SLOTS};
use crossbeam_queue::ArrayQueue;
use std::cell::Cell;
use std::sync::Arc;

thread_local! {
    /// One spare buffer per thread. A thread's next serialization call picks
    /// it up; two concurrent calls can never observe the same allocation
    /// because `take` empties the slot.
    static SPARE: Cell<Option<Vec<u8>>> = const { Cell::new(None) };
}

/// Get a buffer from the thread-local slot or allocate a new one
///
/// The returned buffer is empty with at least `capacity` bytes reserved.
#[inline]
pub fn acquire(capacity: usize) -> Vec<u8> {
    let mut buf = SPARE.with(|slot| slot.take()).unwrap_or_default();
    buf.clear();
    if buf.capacity() < capacity {
        buf.reserve_exact(capacity - buf.len());
    }
    buf
}

/// Return a buffer to the thread-local slot
///
/// Oversized buffers (capacity above `POOL_RETAIN_MAX`) are dropped instead,
/// so one pathological payload cannot pin memory on the thread forever.
#[inline]
pub fn release(mut buf: Vec<u8>) {
    if buf.capacity() > POOL_RETAIN_MAX {
        return;
    }
    buf.clear();
    SPARE.with(|slot| slot.set(Some(buf)));
}

/// Cross-thread buffer pool for callers that serialize from short-lived
/// threads (where a thread-local slot never pays off)
///
/// Slower than the thread-local slot but still cheaper than allocating.
pub struct SharedPool {
    buffers: Arc<ArrayQueue<Vec<u8>>>,
}

impl SharedPool {
    pub fn new() -> Self {
        Self {
            buffers: Arc::new(ArrayQueue::new(SHARED_POOL_SLOTS)),
        }
    }

    /// Get a buffer from the pool, allocating on miss
    pub fn get(&self, capacity: usize) -> Vec<u8> {
        match self.buffers.pop() {
            Some(mut buf) => {
                buf.clear();
                if buf.capacity() < capacity {
                    buf.reserve_exact(capacity);
                }
                buf
            }
            None => Vec::with_capacity(capacity),
        }
    }

    /// Return a buffer to the pool; dropped silently when full or oversized
    pub fn put(&self, mut buf: Vec<u8>) {
        if buf.capacity() > POOL_RETAIN_MAX {
            return;
        }
        buf.clear();
        let _ = self.buffers.push(buf);
    }
}

impl Default for SharedPool {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for SharedPool {
    fn clone(&self) -> Self {
        Self {
            buffers: Arc::clone(&self.buffers),
        }
    }
}
