use crate::error::LoopError;
use std::future::Future;
use tokio::runtime::{Builder, Handle, Runtime};
use tokio::task::JoinHandle;

/// Tokio runtime that sleeps on behalf of timers and interval tickers.
///
/// Either owned by the loop or borrowed from the host through a `Handle`.
/// Nested loops share their parent's driver.
pub(crate) struct TimerDriver {
    handle: Handle,
    runtime: Option<Runtime>,
}

impl TimerDriver {
    pub(crate) fn owned(worker_threads: usize, thread_name: &str) -> Result<Self, LoopError> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(worker_threads)
            .thread_name(format!("{}-timers", thread_name))
            .enable_time()
            .build()
            .map_err(LoopError::TimerRuntime)?;
        Ok(Self {
            handle: runtime.handle().clone(),
            runtime: Some(runtime),
        })
    }

    pub(crate) fn shared(handle: Handle) -> Self {
        Self {
            handle,
            runtime: None,
        }
    }

    pub(crate) fn handle(&self) -> &Handle {
        &self.handle
    }

    pub(crate) fn spawn<F>(&self, future: F) -> JoinHandle<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.handle.spawn(future)
    }
}

impl Drop for TimerDriver {
    fn drop(&mut self) {
        // The last loop reference may be dropped from inside some other async
        // context, where a blocking runtime shutdown would panic.
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}
