use super::builder::LoopBuilder;
use super::handle::StopHandle;
use super::session::Session;
use super::shared::{AuxJob, Shared};
use crate::error::LoopError;
use crate::job::{ImmediateHandle, IntervalHandle, TimerHandle};
use crate::timers::{self, Immediate, Interval, Timer};
use std::sync::mpsc as std_mpsc;
use std::sync::{Arc, PoisonError};
use std::thread;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::debug;

/// Single-threaded event loop hosting an engine of type `E`.
///
/// Every callback runs on one thread at a time with the engine borrowed as
/// `&mut E`, so the engine never needs to be `Sync` and cannot leak out of a
/// callback. The scheduling methods are safe to call from any thread, inside
/// or outside the loop. Cloning yields another handle to the same loop.
pub struct Loop<E> {
    pub(crate) shared: Arc<Shared<E>>,
}

impl<E> Clone for Loop<E> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<E> std::fmt::Debug for Loop<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Loop")
            .field("running", &self.is_running())
            .field("pending_jobs", &self.pending_jobs())
            .finish()
    }
}

impl<E: Send + 'static> Loop<E> {
    /// Create a loop with default settings.
    pub fn new(engine: E) -> Result<Self, LoopError> {
        LoopBuilder::new(engine).build()
    }

    pub fn builder(engine: E) -> LoopBuilder<E> {
        LoopBuilder::new(engine)
    }

    /// Calls `f`, then runs the loop on the current thread until there are no
    /// more timers, intervals or immediates.
    ///
    /// # Panics
    ///
    /// Panics if the loop is already running. Use [`Loop::run_on_loop`] to
    /// submit work to a running loop. Panics raised by callbacks propagate out
    /// of this call.
    pub fn run<F>(&self, f: F)
    where
        F: FnOnce(&mut E),
    {
        let mut session = Session::owned(&self.shared);
        session.enter();
        f(session.engine());
        session.run(false);
    }

    /// Starts the loop on a background thread. It keeps running, idle or not,
    /// until [`Loop::stop`] or [`Loop::stop_no_wait`] is called.
    ///
    /// # Panics
    ///
    /// Panics if the loop is already running.
    pub fn start(&self) -> Result<(), LoopError> {
        let session = Session::owned(&self.shared);
        self.spawn(session, None)
    }

    /// Like [`Loop::start`], but returns only once the loop thread has begun
    /// running.
    ///
    /// # Panics
    ///
    /// Panics if the loop is already running.
    pub fn start_in_foreground(&self) -> Result<(), LoopError> {
        let session = Session::owned(&self.shared);
        let (ready_tx, ready_rx) = std_mpsc::sync_channel(0);
        self.spawn(session, Some(ready_tx))?;
        // An error means the thread died before signalling; nothing to wait for.
        let _ = ready_rx.recv();
        Ok(())
    }

    fn spawn(&self, mut session: Session<'static, E>, ready: Option<std_mpsc::SyncSender<()>>) -> Result<(), LoopError> {
        thread::Builder::new()
            .name(self.shared.config.thread_name.clone())
            .spawn(move || {
                session.enter();
                if let Some(ready) = ready {
                    let _ = ready.send(());
                }
                session.run(true);
            })
            .map_err(LoopError::Spawn)?;
        debug!("event loop started in background");
        Ok(())
    }

    /// Stops the loop and waits for it to exit. Live timers, intervals and
    /// immediates are cancelled. After this returns no more callbacks run
    /// until the loop is started again.
    ///
    /// Returns the number of timers, intervals and immediates that were still
    /// pending. Calling it on a stopped loop only cancels pending jobs.
    ///
    /// # Panics
    ///
    /// Panics when called from the loop thread, where waiting would deadlock.
    /// Use [`Loop::stop_no_wait`] there.
    pub fn stop(&self) -> usize {
        let mut state = self.shared.state();
        if state.running && state.loop_thread == Some(thread::current().id()) {
            drop(state);
            panic!("stop() called from the event loop thread; use stop_no_wait()");
        }
        let pending = self.shared.cancel_all();
        if state.running {
            debug!(pending, "stopping event loop");
        }
        while state.running {
            self.shared.request_stop();
            state = self
                .shared
                .stopped
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
        pending
    }

    /// Tells the loop to stop and returns immediately. Live timers, intervals
    /// and immediates are cancelled. Safe to call from inside the loop.
    pub fn stop_no_wait(&self) {
        let state = self.shared.state();
        let pending = self.shared.cancel_all();
        if state.running {
            debug!(pending, "stop requested without waiting");
            self.shared.request_stop();
        }
    }

    /// Runs `f` on the loop as soon as possible, preserving submission order.
    ///
    /// If the loop is not running it is run with `f` as its entry point, as
    /// if by [`Loop::run`].
    pub fn run_on_loop<F>(&self, f: F)
    where
        F: FnOnce(&mut E) + Send + 'static,
    {
        let state = self.shared.state();
        if state.running {
            self.shared.aux.push(AuxJob::Call(Box::new(f)));
            drop(state);
            self.shared.wakeup();
        } else {
            drop(state);
            self.run(f);
        }
    }

    /// Runs `f` once on the loop after at least `delay` has elapsed.
    pub fn set_timeout<F>(&self, f: F, delay: Duration) -> TimerHandle
    where
        F: FnOnce(&mut E) + Send + 'static,
    {
        let id = self.shared.next_id();
        let mut tracking = self.shared.tracking();
        // Spawned under the lock so the fire can never overtake the registration.
        let task = self
            .shared
            .driver
            .spawn(timers::fire_after(delay, id, self.shared.jobs_tx.clone()));
        tracking.timers.push(Timer::new(id, Box::new(f), task));
        tracking.job_count += 1;
        TimerHandle(id)
    }

    /// Cancels a timer that has not fired yet. No-op otherwise.
    pub fn clear_timeout(&self, handle: TimerHandle) {
        self.shared.tracking().clear_timeout(handle.0);
    }

    /// Runs `f` on the loop every `delay` until cleared. A zero delay ticks at
    /// the configured minimum interval (1ms by default).
    pub fn set_interval<F>(&self, f: F, delay: Duration) -> IntervalHandle
    where
        F: FnMut(&mut E) + Send + 'static,
    {
        let period = if delay.is_zero() {
            self.shared.min_interval
        } else {
            delay
        };
        let id = self.shared.next_id();
        let (stop_tx, stop_rx) = oneshot::channel();
        let mut tracking = self.shared.tracking();
        self.shared.driver.spawn(timers::tick_every(
            period,
            id,
            self.shared.jobs_tx.clone(),
            stop_rx,
        ));
        tracking.intervals.push(Interval::new(id, Box::new(f), stop_tx));
        tracking.job_count += 1;
        IntervalHandle(id)
    }

    /// Stops an interval. A run already in progress completes; no further
    /// runs happen. No-op if already cleared.
    pub fn clear_interval(&self, handle: IntervalHandle) {
        self.shared.tracking().clear_interval(handle.0);
    }

    /// Runs `f` once on the loop as soon as possible.
    pub fn set_immediate<F>(&self, f: F) -> ImmediateHandle
    where
        F: FnOnce(&mut E) + Send + 'static,
    {
        let id = self.shared.next_id();
        {
            let mut tracking = self.shared.tracking();
            tracking.immediates.push(Immediate::new(id, Box::new(f)));
            tracking.job_count += 1;
        }
        self.shared.aux.push(AuxJob::Immediate(id));
        self.shared.wakeup();
        ImmediateHandle(id)
    }

    /// Cancels an immediate that has not run yet. No-op otherwise.
    pub fn clear_immediate(&self, handle: ImmediateHandle) {
        self.shared.tracking().clear_immediate(handle.0);
    }

    /// Lends the engine to `f` while the loop is stopped.
    ///
    /// Returns `None` while the loop is running (the engine belongs to the
    /// loop thread then) and for nested loops, which never own one.
    pub fn with_engine<R>(&self, f: impl FnOnce(&mut E) -> R) -> Option<R> {
        let mut state = self.shared.state();
        if state.running {
            return None;
        }
        state.engine.as_mut().map(f)
    }

    /// Handle that stops this loop without waiting, from any thread.
    pub fn stop_handle(&self) -> StopHandle<E> {
        StopHandle::new(self.clone())
    }
}

impl<E> Loop<E> {
    pub fn is_running(&self) -> bool {
        self.shared.state().running
    }

    /// True when called from the thread currently executing this loop's callbacks.
    pub fn is_loop_thread(&self) -> bool {
        self.shared.state().loop_thread == Some(thread::current().id())
    }

    /// Current value of the liveness counter: scheduled timers, intervals and
    /// immediates, plus one while a background loop is running.
    pub fn pending_jobs(&self) -> i64 {
        self.shared.job_count()
    }
}
