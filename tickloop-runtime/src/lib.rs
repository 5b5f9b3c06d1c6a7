//! Tickloop Runtime - Core runtime for the single-threaded event loop
//!
//! This crate provides the scheduler that serializes engine callbacks onto one
//! thread: the job channel, the auxiliary queue, timers, intervals,
//! immediates and the run/start/stop lifecycle.

mod aux_queue;
mod config;
mod driver;
mod error;
mod event_loop;
mod job;
mod modules;
mod time_unit;
mod timers;
mod tracking;

// Re-export public API
pub use config::{load_toml_config, load_yaml_config, LoopConfig, CONFIG_SECTION, DEFAULT_MIN_INTERVAL};
pub use error::LoopError;
pub use event_loop::{Loop, LoopBuilder, StopHandle};
pub use job::{Callback, ImmediateHandle, IntervalHandle, JobId, RepeatingCallback, TimerHandle};
pub use modules::{ModuleRegistry, CONSOLE_MODULE};
pub use time_unit::{delay_from_millis, TimeUnit};
