//! The `process` object exposed to scripts.

use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tickloop_runtime::Loop;
use tracing::{debug, warn};

/// Module name hosts register the binding under.
pub const MODULE_NAME: &str = "process";

type Terminator = Arc<dyn Fn(i32) + Send + Sync + 'static>;

/// Environment, arguments and exit control for scripts running on a loop.
///
/// `stop` and `exit` end the host process through the terminator, which is
/// `std::process::exit` unless replaced with [`Process::with_terminator`].
pub struct Process<E> {
    event_loop: Loop<E>,
    env: HashMap<String, String>,
    args: Vec<String>,
    terminate: Terminator,
}

impl<E: Send + 'static> Process<E> {
    pub fn new(event_loop: Loop<E>) -> Self {
        Self::with_terminator(event_loop, |code| std::process::exit(code))
    }

    pub fn with_terminator<T>(event_loop: Loop<E>, terminate: T) -> Self
    where
        T: Fn(i32) + Send + Sync + 'static,
    {
        let env = std::env::vars_os()
            .map(|(key, value)| {
                (
                    key.to_string_lossy().into_owned(),
                    value.to_string_lossy().into_owned(),
                )
            })
            .collect();
        let args = std::env::args_os()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect();
        Self {
            event_loop,
            env,
            args,
            terminate: Arc::new(terminate),
        }
    }

    /// Snapshot of the environment taken when the binding was created.
    pub fn env(&self) -> &HashMap<String, String> {
        &self.env
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn cwd(&self) -> io::Result<PathBuf> {
        std::env::current_dir()
    }

    /// Stops the loop, waiting for it to wind down, then terminates.
    ///
    /// From the loop's own thread waiting is impossible, so the loop is only
    /// told to stop.
    pub fn stop(&self, code: i32) {
        if self.event_loop.is_running() {
            if self.event_loop.is_loop_thread() {
                warn!(code, "process.stop called from the loop thread, not waiting for the loop");
                self.event_loop.stop_no_wait();
            } else {
                let pending = self.event_loop.stop();
                debug!(code, pending, "loop stopped before process stop");
            }
        }
        (self.terminate)(code);
    }

    /// Tells the loop to stop and terminates right away.
    pub fn exit(&self, code: i32) {
        if self.event_loop.is_running() {
            self.event_loop.stop_no_wait();
        }
        (self.terminate)(code);
    }
}
