//! Cancellable units of work and the opaque handles that refer to them.

use std::fmt;

/// One-shot callback run on the loop thread with the engine borrowed.
pub type Callback<E> = Box<dyn FnOnce(&mut E) + Send + 'static>;

/// Callback of an interval, run on every tick until cleared.
pub type RepeatingCallback<E> = Box<dyn FnMut(&mut E) + Send + 'static>;

/// Identity of a scheduled job, unique within one loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(pub(crate) u64);

impl JobId {
    /// Raw numeric id, as handed to scripts.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

macro_rules! job_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(pub(crate) JobId);

        impl $name {
            pub fn id(self) -> JobId {
                self.0
            }

            /// Rebuilds a handle from a raw id previously obtained with `id()`.
            ///
            /// Ids that do not name a live job are ignored by the clear calls.
            pub fn from_raw(id: u64) -> Self {
                Self(JobId(id))
            }
        }
    };
}

job_handle!(
    /// Handle returned by `set_timeout`, accepted by `clear_timeout`.
    TimerHandle
);
job_handle!(
    /// Handle returned by `set_interval`, accepted by `clear_interval`.
    IntervalHandle
);
job_handle!(
    /// Handle returned by `set_immediate`, accepted by `clear_immediate`.
    ImmediateHandle
);

/// Cancellable wrapper around a callback.
///
/// The callback is taken out while it runs so the tracking lock is never held
/// across user code.
pub(crate) struct Job<F> {
    cancelled: bool,
    callback: Option<F>,
}

impl<F> Job<F> {
    pub(crate) fn new(callback: F) -> Self {
        Self {
            cancelled: false,
            callback: Some(callback),
        }
    }

    /// Marks the job cancelled. Returns false if it already was.
    pub(crate) fn cancel(&mut self) -> bool {
        if self.cancelled {
            return false;
        }
        self.cancelled = true;
        true
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    pub(crate) fn take(&mut self) -> Option<F> {
        self.callback.take()
    }

    pub(crate) fn restore(&mut self, callback: F) {
        if !self.cancelled {
            self.callback = Some(callback);
        }
    }
}
