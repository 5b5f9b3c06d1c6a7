//! Timer, interval and immediate jobs and the tasks that drive their firing.
//!
//! Timer and ticker tasks run on the loop's timer runtime. They never touch a
//! callback: they only send a [`Fire`] naming the job into the job channel, and
//! the tick loop looks the job up in its tracking lists.

use crate::job::{Callback, Job, JobId, RepeatingCallback};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

/// Message sent into the job channel when a timer or interval elapses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Fire {
    Timeout(JobId),
    Interval(JobId),
}

/// Jobs that can be found in a tracking list by id.
pub(crate) trait Tracked {
    fn id(&self) -> JobId;
}

pub(crate) struct Timer<E> {
    pub(crate) id: JobId,
    pub(crate) job: Job<Callback<E>>,
    task: JoinHandle<()>,
}

impl<E> Timer<E> {
    pub(crate) fn new(id: JobId, callback: Callback<E>, task: JoinHandle<()>) -> Self {
        Self {
            id,
            job: Job::new(callback),
            task,
        }
    }

    /// Cancels the job and its pending wakeup. False if already cancelled.
    pub(crate) fn cancel(&mut self) -> bool {
        if !self.job.cancel() {
            return false;
        }
        self.task.abort();
        true
    }
}

pub(crate) struct Interval<E> {
    pub(crate) id: JobId,
    pub(crate) job: Job<RepeatingCallback<E>>,
    stop: Option<oneshot::Sender<()>>,
}

impl<E> Interval<E> {
    pub(crate) fn new(id: JobId, callback: RepeatingCallback<E>, stop: oneshot::Sender<()>) -> Self {
        Self {
            id,
            job: Job::new(callback),
            stop: Some(stop),
        }
    }

    /// Cancels the job and stops its ticker. False if already cancelled.
    pub(crate) fn cancel(&mut self) -> bool {
        if !self.job.cancel() {
            return false;
        }
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        true
    }
}

pub(crate) struct Immediate<E> {
    pub(crate) id: JobId,
    pub(crate) job: Job<Callback<E>>,
}

impl<E> Immediate<E> {
    pub(crate) fn new(id: JobId, callback: Callback<E>) -> Self {
        Self {
            id,
            job: Job::new(callback),
        }
    }

    pub(crate) fn cancel(&mut self) -> bool {
        self.job.cancel()
    }
}

impl<E> Tracked for Timer<E> {
    fn id(&self) -> JobId {
        self.id
    }
}

impl<E> Tracked for Interval<E> {
    fn id(&self) -> JobId {
        self.id
    }
}

impl<E> Tracked for Immediate<E> {
    fn id(&self) -> JobId {
        self.id
    }
}

/// Sleeps for `delay`, then reports the timeout to the loop.
pub(crate) async fn fire_after(delay: Duration, id: JobId, jobs: mpsc::Sender<Fire>) {
    time::sleep(delay).await;
    let _ = jobs.send(Fire::Timeout(id)).await;
}

/// Reports the interval to the loop every `period` until `stop` fires.
pub(crate) async fn tick_every(
    period: Duration,
    id: JobId,
    jobs: mpsc::Sender<Fire>,
    mut stop: oneshot::Receiver<()>,
) {
    let mut ticker = time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    // The first tick completes immediately.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = &mut stop => break,
            _ = ticker.tick() => {
                tokio::select! {
                    _ = &mut stop => break,
                    sent = jobs.send(Fire::Interval(id)) => {
                        if sent.is_err() {
                            break;
                        }
                    }
                }
            }
        }
    }
}
