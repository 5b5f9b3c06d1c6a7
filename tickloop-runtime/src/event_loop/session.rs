use super::shared::Shared;
use crate::timers::Fire;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread;
use tokio::sync::mpsc;
use tracing::debug;

enum EngineSlot<'a, E> {
    Owned(Option<E>),
    Borrowed(&'a mut E),
}

/// One running period of a loop, from claim to exit.
///
/// Creating a session flips the loop to running and takes the engine and the
/// job receiver out of the stopped state. Dropping it puts them back, clears
/// `running` and wakes every `stop()` waiter, also when a callback unwinds.
pub(crate) struct Session<'a, E> {
    shared: Arc<Shared<E>>,
    engine: EngineSlot<'a, E>,
    jobs: Option<mpsc::Receiver<Fire>>,
}

impl<E> Session<'static, E> {
    /// Claims a loop that owns its engine.
    ///
    /// # Panics
    ///
    /// Panics if the loop is already running or has no engine of its own.
    pub(crate) fn owned(shared: &Arc<Shared<E>>) -> Self {
        let (engine, jobs) = claim(shared, true);
        Self {
            shared: Arc::clone(shared),
            engine: EngineSlot::Owned(engine),
            jobs: Some(jobs),
        }
    }
}

impl<'a, E> Session<'a, E> {
    /// Claims a loop that runs on an engine lent by its caller.
    ///
    /// # Panics
    ///
    /// Panics if the loop is already running.
    pub(crate) fn borrowed(shared: &Arc<Shared<E>>, engine: &'a mut E) -> Self {
        let (_, jobs) = claim(shared, false);
        Self {
            shared: Arc::clone(shared),
            engine: EngineSlot::Borrowed(engine),
            jobs: Some(jobs),
        }
    }

    /// Records the current thread as the one executing callbacks.
    pub(crate) fn enter(&mut self) {
        self.shared.state().loop_thread = Some(thread::current().id());
        debug!("event loop running");
    }

    pub(crate) fn engine(&mut self) -> &mut E {
        self.engine.get()
    }

    /// Ticks until the loop runs out of work or is asked to stop.
    pub(crate) fn run(&mut self, keep_alive: bool) {
        let Session {
            shared,
            engine,
            jobs,
        } = self;
        let Some(jobs) = jobs.as_mut() else {
            return;
        };
        futures::executor::block_on(shared.tick(engine.get(), jobs, keep_alive));
    }
}

impl<'a, E> EngineSlot<'a, E> {
    fn get(&mut self) -> &mut E {
        match self {
            EngineSlot::Owned(Some(engine)) => engine,
            EngineSlot::Owned(None) => unreachable!("engine is only returned when the session ends"),
            EngineSlot::Borrowed(engine) => &mut **engine,
        }
    }
}

impl<'a, E> Drop for Session<'a, E> {
    fn drop(&mut self) {
        let pending = self.shared.job_count();
        let mut state = self.shared.state();
        if let EngineSlot::Owned(engine) = &mut self.engine {
            if let Some(engine) = engine.take() {
                state.engine = Some(engine);
            }
        }
        if let Some(jobs) = self.jobs.take() {
            state.jobs = Some(jobs);
        }
        state.running = false;
        state.loop_thread = None;
        drop(state);
        self.shared.stopped.notify_all();
        debug!(pending, "event loop exited");
    }
}

/// Marks the loop running and hands out what a session needs.
fn claim<E>(shared: &Shared<E>, take_engine: bool) -> (Option<E>, mpsc::Receiver<Fire>) {
    let mut state = shared.state();
    if state.running {
        drop(state);
        panic!("event loop is already running");
    }
    let engine = if take_engine {
        match state.engine.take() {
            Some(engine) => Some(engine),
            None => {
                drop(state);
                panic!("event loop has no engine of its own; it can only run nested");
            }
        }
    } else {
        None
    };
    let Some(jobs) = state.jobs.take() else {
        state.engine = engine;
        drop(state);
        panic!("event loop job channel is missing");
    };
    state.running = true;
    shared.can_run.store(true, Ordering::Release);
    (engine, jobs)
}
