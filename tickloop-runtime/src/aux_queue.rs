//! Double-buffered queue of work submitted from outside the tick loop.

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Mutex-guarded pending list. The tick loop owns the spare buffer and swaps
/// it in on every drain, so allocations are reused between ticks.
pub(crate) struct AuxQueue<T> {
    pending: Mutex<Vec<T>>,
}

impl<T> Default for AuxQueue<T> {
    fn default() -> Self {
        Self {
            pending: Mutex::new(Vec::new()),
        }
    }
}

impl<T> AuxQueue<T> {
    fn pending(&self) -> MutexGuard<'_, Vec<T>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn push(&self, job: T) {
        self.pending().push(job);
    }

    /// Exchanges the pending list with `spare`.
    ///
    /// `spare` must be empty; afterwards it holds everything submitted so far,
    /// in submission order.
    pub(crate) fn swap(&self, spare: &mut Vec<T>) {
        debug_assert!(spare.is_empty());
        std::mem::swap(&mut *self.pending(), spare);
    }

    /// Puts `jobs` back ahead of everything submitted since they were taken.
    pub(crate) fn requeue_front(&self, mut jobs: Vec<T>) {
        let mut pending = self.pending();
        jobs.append(&mut pending);
        *pending = jobs;
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.pending().len()
    }
}
