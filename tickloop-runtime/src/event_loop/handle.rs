use super::event_loop::Loop;

/// Stops a loop from any thread without waiting for it.
///
/// Handed to nested-loop callbacks as their stop function; also available for
/// any loop through [`Loop::stop_handle`].
pub struct StopHandle<E> {
    event_loop: Loop<E>,
}

impl<E> Clone for StopHandle<E> {
    fn clone(&self) -> Self {
        Self {
            event_loop: self.event_loop.clone(),
        }
    }
}

impl<E: Send + 'static> StopHandle<E> {
    pub(crate) fn new(event_loop: Loop<E>) -> Self {
        Self { event_loop }
    }

    /// Cancels the loop's pending jobs and asks it to exit.
    pub fn stop(&self) {
        self.event_loop.stop_no_wait();
    }

    pub fn is_running(&self) -> bool {
        self.event_loop.is_running()
    }
}
