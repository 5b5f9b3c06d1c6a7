use crate::aux_queue::AuxQueue;
use crate::config::LoopConfig;
use crate::driver::TimerDriver;
use crate::job::{Callback, JobId};
use crate::timers::Fire;
use crate::tracking::Tracking;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::ThreadId;
use std::time::Duration;
use tokio::sync::{mpsc, Notify};

/// Work handed to the tick loop through the auxiliary queue.
pub(crate) enum AuxJob<E> {
    /// Closure submitted with `run_on_loop`.
    Call(Callback<E>),
    /// Immediate that became due.
    Immediate(JobId),
}

/// Lifecycle state guarded by the stop lock.
pub(crate) struct RunState<E> {
    pub(crate) running: bool,
    /// The engine while the loop is stopped. Nested loops never own one.
    pub(crate) engine: Option<E>,
    /// Receiving end of the job channel while the loop is stopped.
    pub(crate) jobs: Option<mpsc::Receiver<Fire>>,
    /// Thread executing callbacks while running.
    pub(crate) loop_thread: Option<ThreadId>,
}

/// State shared by every `Loop` clone, the tick thread and the stop handles.
pub(crate) struct Shared<E> {
    pub(crate) config: LoopConfig,
    pub(crate) min_interval: Duration,
    pub(crate) driver: TimerDriver,
    pub(crate) jobs_tx: mpsc::Sender<Fire>,
    pub(crate) wakeup: Notify,
    pub(crate) aux: AuxQueue<AuxJob<E>>,
    pub(crate) tracking: Mutex<Tracking<E>>,
    pub(crate) can_run: AtomicBool,
    pub(crate) state: Mutex<RunState<E>>,
    pub(crate) stopped: Condvar,
    next_id: AtomicU64,
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<E> Shared<E> {
    pub(crate) fn new(config: LoopConfig, driver: TimerDriver, engine: Option<E>) -> Self {
        // Capacity 1 is the closest tokio gets to an unbuffered channel: a
        // timer that fires while the loop is busy or stopped waits its turn.
        let (jobs_tx, jobs_rx) = mpsc::channel(1);
        let min_interval = config.min_interval();
        Self {
            config,
            min_interval,
            driver,
            jobs_tx,
            wakeup: Notify::new(),
            aux: AuxQueue::default(),
            tracking: Mutex::new(Tracking::default()),
            can_run: AtomicBool::new(false),
            state: Mutex::new(RunState {
                running: false,
                engine,
                jobs: Some(jobs_rx),
                loop_thread: None,
            }),
            stopped: Condvar::new(),
            next_id: AtomicU64::new(1),
        }
    }

    pub(crate) fn tracking(&self) -> MutexGuard<'_, Tracking<E>> {
        lock(&self.tracking)
    }

    pub(crate) fn state(&self) -> MutexGuard<'_, RunState<E>> {
        lock(&self.state)
    }

    pub(crate) fn next_id(&self) -> JobId {
        JobId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Coalescing wakeup: at most one signal is ever pending.
    pub(crate) fn wakeup(&self) {
        self.wakeup.notify_one();
    }

    pub(crate) fn job_count(&self) -> i64 {
        self.tracking().job_count
    }

    pub(crate) fn can_run(&self) -> bool {
        self.can_run.load(Ordering::Acquire)
    }

    /// Cancels every live timer, interval and immediate.
    pub(crate) fn cancel_all(&self) -> usize {
        self.tracking().cancel_all()
    }

    /// Asks a running loop to exit at its next wakeup.
    pub(crate) fn request_stop(&self) {
        self.can_run.store(false, Ordering::Release);
        self.wakeup();
    }
}
