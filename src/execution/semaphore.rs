use std::sync::{Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// A small, blocking counting semaphore.
///
/// Bounds how many parsed chunks are being folded at once.
pub struct Semaphore {
    permits: Mutex<usize>,
    cv: Condvar,
}

impl Semaphore {
    /// `permits` must be non-zero; the engine validates this before building one.
    pub fn new(permits: usize) -> Self {
        Self {
            permits: Mutex::new(permits.max(1)),
            cv: Condvar::new(),
        }
    }

    /// Acquire one permit, blocking until available.
    ///
    /// Returns a guard that gives the permit back when dropped, and the time spent waiting
    /// (zero if no wait was required).
    pub fn acquire(&self) -> (Permit<'_>, Duration) {
        let start = Instant::now();
        let mut waited = false;
        let mut g = self.permits.lock().unwrap_or_else(PoisonError::into_inner);
        while *g == 0 {
            waited = true;
            g = self.cv.wait(g).unwrap_or_else(PoisonError::into_inner);
        }
        *g -= 1;
        let waited = if waited { start.elapsed() } else { Duration::ZERO };
        (Permit { sem: self }, waited)
    }

    fn release(&self) {
        let mut g = self.permits.lock().unwrap_or_else(PoisonError::into_inner);
        *g += 1;
        self.cv.notify_one();
    }
}

/// One acquired permit.
pub struct Permit<'a> {
    sem: &'a Semaphore,
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        self.sem.release();
    }
}
