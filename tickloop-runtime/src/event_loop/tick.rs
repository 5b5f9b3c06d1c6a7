use super::shared::{AuxJob, Shared};
use crate::job::{JobId, RepeatingCallback};
use crate::timers::Fire;
use std::vec;
use tokio::sync::mpsc;
use tracing::trace;

/// Artificial unit of work that keeps a background loop polling while idle.
struct KeepAlive<'a, E>(&'a Shared<E>);

impl<'a, E> KeepAlive<'a, E> {
    fn hold(shared: &'a Shared<E>) -> Self {
        shared.tracking().job_count += 1;
        Self(shared)
    }
}

impl<'a, E> Drop for KeepAlive<'a, E> {
    fn drop(&mut self) {
        self.0.tracking().job_count -= 1;
    }
}

/// Aux jobs taken for one drain. Whatever is left when it drops, because a
/// job unwound, is put back at the front of the queue.
struct Undrained<'a, E> {
    shared: &'a Shared<E>,
    jobs: vec::Drain<'a, AuxJob<E>>,
}

impl<'a, E> Drop for Undrained<'a, E> {
    fn drop(&mut self) {
        let rest: Vec<_> = self.jobs.by_ref().collect();
        if !rest.is_empty() {
            trace!(jobs = rest.len(), "requeueing auxiliary jobs after a panic");
            self.shared.aux.requeue_front(rest);
        }
    }
}

/// An interval callback out of tracking for one run. Dropping it hands the
/// callback back, so an interval whose callback panicked keeps firing.
struct LentInterval<'a, E> {
    shared: &'a Shared<E>,
    id: JobId,
    callback: Option<RepeatingCallback<E>>,
}

impl<'a, E> Drop for LentInterval<'a, E> {
    fn drop(&mut self) {
        if let Some(callback) = self.callback.take() {
            self.shared.tracking().restore_interval(self.id, callback);
        }
    }
}

impl<E> Shared<E> {
    /// The tick loop. The only place callbacks are invoked.
    ///
    /// Drains the auxiliary queue once, then waits on the job channel and the
    /// wakeup signal until no work is left or a stop is requested. Which of the
    /// two goes first when both are ready is unspecified.
    pub(crate) async fn tick(&self, engine: &mut E, jobs: &mut mpsc::Receiver<Fire>, keep_alive: bool) {
        let mut spare = Vec::new();
        self.run_aux(engine, &mut spare);

        let _keep_alive = keep_alive.then(|| KeepAlive::hold(self));

        while self.job_count() > 0 {
            tokio::select! {
                fire = jobs.recv() => {
                    if let Some(fire) = fire {
                        self.fire(fire, engine);
                    }
                }
                _ = self.wakeup.notified() => {
                    self.run_aux(engine, &mut spare);
                    if !self.can_run() {
                        trace!("stop requested");
                        break;
                    }
                }
            }
        }
    }

    /// Runs everything submitted since the last drain, in submission order.
    ///
    /// If a job panics, the ones behind it go back to the front of the queue
    /// and run on the next drain.
    fn run_aux(&self, engine: &mut E, spare: &mut Vec<AuxJob<E>>) {
        self.aux.swap(spare);
        if spare.is_empty() {
            return;
        }
        trace!(jobs = spare.len(), "draining auxiliary queue");
        let mut drain = Undrained {
            shared: self,
            jobs: spare.drain(..),
        };
        while let Some(job) = drain.jobs.next() {
            match job {
                AuxJob::Call(callback) => callback(engine),
                AuxJob::Immediate(id) => {
                    let callback = self.tracking().take_immediate(id);
                    if let Some(callback) = callback {
                        callback(engine);
                    }
                }
            }
        }
    }

    fn fire(&self, fire: Fire, engine: &mut E) {
        trace!(?fire, "job fired");
        match fire {
            Fire::Timeout(id) => {
                let callback = self.tracking().take_timeout(id);
                if let Some(callback) = callback {
                    callback(engine);
                }
            }
            Fire::Interval(id) => {
                let callback = self.tracking().take_interval(id);
                if let Some(callback) = callback {
                    let mut lent = LentInterval {
                        shared: self,
                        id,
                        callback: Some(callback),
                    };
                    if let Some(callback) = lent.callback.as_mut() {
                        callback(engine);
                    }
                }
            }
        }
    }
}
