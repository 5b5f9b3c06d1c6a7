//! Timer functions in the shape scripts call them.
//!
//! Scripts pass delays as integer milliseconds and keep timers as plain
//! numbers. [`TimerBindings`] translates that into the loop's typed API.

use tickloop_runtime::{
    delay_from_millis, ImmediateHandle, IntervalHandle, Loop, TimerHandle,
};

/// `setTimeout` / `setInterval` / `setImmediate` and their `clear*` partners.
pub struct TimerBindings<E> {
    event_loop: Loop<E>,
}

impl<E> Clone for TimerBindings<E> {
    fn clone(&self) -> Self {
        Self {
            event_loop: self.event_loop.clone(),
        }
    }
}

impl<E: Send + 'static> TimerBindings<E> {
    pub fn new(event_loop: Loop<E>) -> Self {
        Self { event_loop }
    }

    /// Negative delays run as soon as possible.
    pub fn set_timeout<F>(&self, f: F, delay_ms: i64) -> u64
    where
        F: FnOnce(&mut E) + Send + 'static,
    {
        self.event_loop
            .set_timeout(f, delay_from_millis(delay_ms))
            .id()
            .as_u64()
    }

    pub fn clear_timeout(&self, id: u64) {
        self.event_loop.clear_timeout(TimerHandle::from_raw(id));
    }

    /// Zero and negative delays tick at the loop's minimum interval.
    pub fn set_interval<F>(&self, f: F, delay_ms: i64) -> u64
    where
        F: FnMut(&mut E) + Send + 'static,
    {
        self.event_loop
            .set_interval(f, delay_from_millis(delay_ms))
            .id()
            .as_u64()
    }

    pub fn clear_interval(&self, id: u64) {
        self.event_loop.clear_interval(IntervalHandle::from_raw(id));
    }

    pub fn set_immediate<F>(&self, f: F) -> u64
    where
        F: FnOnce(&mut E) + Send + 'static,
    {
        self.event_loop.set_immediate(f).id().as_u64()
    }

    pub fn clear_immediate(&self, id: u64) {
        self.event_loop.clear_immediate(ImmediateHandle::from_raw(id));
    }
}
