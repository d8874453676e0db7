//! Capacity accounting for local workers.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Bounded count of connections served concurrently by local workers.
#[derive(Debug, Clone)]
pub struct WorkerPool {
    active: Arc<AtomicUsize>,
    capacity: usize,
}

impl WorkerPool {
    /// Creates a pool admitting at most `capacity` concurrent workers.
    pub fn new(capacity: usize) -> Self {
        Self {
            active: Arc::new(AtomicUsize::new(0)),
            capacity,
        }
    }

    /// Claims a slot, or returns `None` when the pool is full.
    pub fn try_acquire(&self) -> Option<WorkerPermit> {
        self.active
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |active| {
                (active < self.capacity).then_some(active + 1)
            })
            .ok()
            .map(|_| WorkerPermit {
                active: Arc::clone(&self.active),
            })
    }

    /// Workers currently holding a permit.
    pub fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Maximum concurrent workers.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Slot in a [`WorkerPool`], released on drop.
#[derive(Debug)]
pub struct WorkerPermit {
    active: Arc<AtomicUsize>,
}

impl Drop for WorkerPermit {
    fn drop(&mut self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
    }
}
