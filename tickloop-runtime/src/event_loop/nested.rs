use super::event_loop::Loop;
use super::handle::StopHandle;
use super::session::Session;
use super::shared::Shared;
use crate::driver::TimerDriver;
use crate::error::LoopError;
use std::sync::Arc;
use std::thread;

impl<E: Send + 'static> Loop<E> {
    /// Runs `f` in a child loop that shares `engine`, and blocks until the
    /// child is done.
    ///
    /// `f` receives the engine, the child loop (schedule on it to keep the
    /// child alive) and a [`StopHandle`] bound to the child. The child exits
    /// once its own timers, intervals and immediates are drained, or as soon
    /// as the stop handle is used, from any thread. Meant to be called from a
    /// callback of this loop with the engine it was given; the calling loop's
    /// tick is suspended, never re-entered, while the child runs.
    ///
    /// The child ticks on its own scoped thread and shares this loop's timer
    /// runtime. A panic in the child resumes on the calling thread.
    pub fn run_nested<F>(&self, engine: &mut E, f: F) -> Result<(), LoopError>
    where
        F: FnOnce(&mut E, &Loop<E>, StopHandle<E>) + Send,
    {
        let child = Loop {
            shared: Arc::new(Shared::new(
                self.shared.config.clone(),
                TimerDriver::shared(self.shared.driver.handle().clone()),
                None,
            )),
        };
        let child_ref = &child;

        thread::scope(|scope| {
            let worker = thread::Builder::new()
                .name(format!("{}-nested", self.shared.config.thread_name))
                .spawn_scoped(scope, move || {
                    let mut session = Session::borrowed(&child_ref.shared, engine);
                    session.enter();
                    f(session.engine(), child_ref, child_ref.stop_handle());
                    session.run(false);
                })
                .map_err(LoopError::Spawn)?;
            if let Err(panic) = worker.join() {
                std::panic::resume_unwind(panic);
            }
            Ok(())
        })
    }
}
