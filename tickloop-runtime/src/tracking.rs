//! Live timers, intervals and immediates, plus the liveness counter.
//!
//! Everything here sits behind one mutex in the loop. Callbacks are taken out
//! before they run, so the lock is never held across user code.

use crate::job::{Callback, JobId, RepeatingCallback};
use crate::timers::{Immediate, Interval, Timer, Tracked};

pub(crate) struct Tracking<E> {
    /// Greater than zero means the tick loop must keep polling.
    pub(crate) job_count: i64,
    pub(crate) timers: Vec<Timer<E>>,
    pub(crate) intervals: Vec<Interval<E>>,
    pub(crate) immediates: Vec<Immediate<E>>,
}

impl<E> Default for Tracking<E> {
    fn default() -> Self {
        Self {
            job_count: 0,
            timers: Vec::new(),
            intervals: Vec::new(),
            immediates: Vec::new(),
        }
    }
}

/// Removes the item with `id` from `list`, keeping the order of the rest.
pub(crate) fn find_and_remove<T: Tracked>(list: &mut Vec<T>, id: JobId) -> Option<T> {
    let index = list.iter().position(|item| item.id() == id)?;
    Some(list.remove(index))
}

impl<E> Tracking<E> {
    /// Number of timers, intervals and immediates still scheduled.
    pub(crate) fn live(&self) -> usize {
        self.timers.len() + self.intervals.len() + self.immediates.len()
    }

    pub(crate) fn clear_timeout(&mut self, id: JobId) -> bool {
        let cleared = find_and_remove(&mut self.timers, id).is_some_and(|mut timer| timer.cancel());
        if cleared {
            self.job_count -= 1;
        }
        cleared
    }

    pub(crate) fn clear_interval(&mut self, id: JobId) -> bool {
        let cleared = find_and_remove(&mut self.intervals, id).is_some_and(|mut interval| interval.cancel());
        if cleared {
            self.job_count -= 1;
        }
        cleared
    }

    pub(crate) fn clear_immediate(&mut self, id: JobId) -> bool {
        let cleared = find_and_remove(&mut self.immediates, id).is_some_and(|mut immediate| immediate.cancel());
        if cleared {
            self.job_count -= 1;
        }
        cleared
    }

    /// Retires an elapsed timer and hands back its callback.
    pub(crate) fn take_timeout(&mut self, id: JobId) -> Option<Callback<E>> {
        let mut timer = find_and_remove(&mut self.timers, id)?;
        if !timer.job.cancel() {
            return None;
        }
        self.job_count -= 1;
        timer.job.take()
    }

    /// Retires a due immediate and hands back its callback.
    pub(crate) fn take_immediate(&mut self, id: JobId) -> Option<Callback<E>> {
        let mut immediate = find_and_remove(&mut self.immediates, id)?;
        if !immediate.cancel() {
            return None;
        }
        self.job_count -= 1;
        immediate.job.take()
    }

    /// Borrows an interval's callback for one run. The interval stays tracked.
    pub(crate) fn take_interval(&mut self, id: JobId) -> Option<RepeatingCallback<E>> {
        let interval = self.intervals.iter_mut().find(|i| i.id == id)?;
        if interval.job.is_cancelled() {
            return None;
        }
        interval.job.take()
    }

    /// Puts an interval's callback back, unless it was cleared while running.
    pub(crate) fn restore_interval(&mut self, id: JobId, callback: RepeatingCallback<E>) {
        if let Some(interval) = self.intervals.iter_mut().find(|i| i.id == id) {
            interval.job.restore(callback);
        }
    }

    /// Cancels every live job. Returns how many there were.
    pub(crate) fn cancel_all(&mut self) -> usize {
        let live = self.live();
        for mut timer in self.timers.drain(..) {
            if timer.cancel() {
                self.job_count -= 1;
            }
        }
        for mut interval in self.intervals.drain(..) {
            if interval.cancel() {
                self.job_count -= 1;
            }
        }
        for mut immediate in self.immediates.drain(..) {
            if immediate.cancel() {
                self.job_count -= 1;
            }
        }
        live
    }
}
