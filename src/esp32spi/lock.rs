//! Bus lock strategies
//!
//! The lock is held for a whole transaction, from `begin_write` to
//! `end_write`, so it cannot be a scoped guard: acquire and release are two
//! separate calls. Builds without the `hal-locks` feature use [`NoLock`] and
//! leave serialization to the caller.

use std::sync::{Condvar, Mutex, PoisonError};

/// Acquire/release contract shared by every lock strategy
pub trait BusLock: Send + Sync {
    /// Block until the bus is ours. No timeout.
    fn acquire(&self);

    /// Hand the bus back
    fn release(&self);
}

/// Lock that does nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NoLock;

impl BusLock for NoLock {
    #[inline]
    fn acquire(&self) {}

    #[inline]
    fn release(&self) {}
}

/// Blocking lock with explicit release, built on a mutex-guarded flag.
#[derive(Debug, Default)]
pub struct BlockingLock {
    held: Mutex<bool>,
    released: Condvar,
}

impl BlockingLock {
    pub const fn new() -> Self {
        Self {
            held: Mutex::new(false),
            released: Condvar::new(),
        }
    }

    /// Whether some transaction currently owns the bus
    pub fn is_held(&self) -> bool {
        *self.held.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl BusLock for BlockingLock {
    fn acquire(&self) {
        let mut held = self.held.lock().unwrap_or_else(PoisonError::into_inner);
        while *held {
            held = self
                .released
                .wait(held)
                .unwrap_or_else(PoisonError::into_inner);
        }
        *held = true;
    }

    fn release(&self) {
        let mut held = self.held.lock().unwrap_or_else(PoisonError::into_inner);
        debug_assert!(*held, "bus lock released without being acquired");
        *held = false;
        drop(held);
        self.released.notify_one();
    }
}

/// Lock strategy picked by the `hal-locks` feature
#[cfg(feature = "hal-locks")]
pub type DefaultLock = BlockingLock;

/// Lock strategy picked by the `hal-locks` feature
#[cfg(not(feature = "hal-locks"))]
pub type DefaultLock = NoLock;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn acquire_release_roundtrip() {
        let lock = BlockingLock::new();
        assert!(!lock.is_held());
        lock.acquire();
        assert!(lock.is_held());
        lock.release();
        assert!(!lock.is_held());
    }

    #[test]
    fn second_acquire_blocks_until_release() {
        let lock = Arc::new(BlockingLock::new());
        let entered = Arc::new(AtomicBool::new(false));
        lock.acquire();

        let waiter = {
            let lock = Arc::clone(&lock);
            let entered = Arc::clone(&entered);
            thread::spawn(move || {
                lock.acquire();
                entered.store(true, Ordering::SeqCst);
                lock.release();
            })
        };

        thread::sleep(Duration::from_millis(50));
        assert!(!entered.load(Ordering::SeqCst));

        lock.release();
        waiter.join().expect("waiter panicked");
        assert!(entered.load(Ordering::SeqCst));
    }

    #[test]
    fn no_lock_never_blocks() {
        let lock = NoLock;
        lock.acquire();
        lock.acquire();
        lock.release();
    }
}
