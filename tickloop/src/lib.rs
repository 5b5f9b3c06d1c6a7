//! # Tickloop - a single-threaded event loop for embedded script engines
//!
//! Script engines are rarely safe to touch from more than one thread. Tickloop
//! owns the engine and runs every callback on one thread at a time, while any
//! thread may schedule work on it.
//!
//! ## Features
//!
//! - **Timers**: `set_timeout` / `clear_timeout`, fire at most once
//! - **Intervals**: `set_interval` / `clear_interval`, zero delays tick every 1ms
//! - **Immediates**: `set_immediate` / `clear_immediate`, run as soon as possible
//! - **Cross-thread submission**: `run_on_loop` keeps submission order
//! - **Lifecycle**: `run`, `start`, `start_in_foreground`, `stop`, `stop_no_wait`
//! - **Nested loops**: `run_nested` runs a sub-task to completion on the same engine
//! - **Config support**: TOML or YAML `[event_loop]` section with env overrides
//!
//! ## Quick Start
//!
//! ```rust
//! use std::time::Duration;
//! use tickloop::Loop;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let event_loop = Loop::new(Vec::<String>::new())?;
//! let handle = event_loop.clone();
//!
//! event_loop.run(move |engine| {
//!     engine.push("started".into());
//!     handle.set_timeout(|engine| engine.push("timeout".into()), Duration::from_millis(5));
//! });
//!
//! let log = event_loop.with_engine(|engine| engine.clone()).unwrap();
//! assert_eq!(log, vec!["started", "timeout"]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Background loop
//!
//! ```rust
//! use std::time::Duration;
//! use tickloop::Loop;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let event_loop = Loop::new(0u32)?;
//! event_loop.start()?;
//!
//! event_loop.set_interval(|ticks| *ticks += 1, Duration::from_millis(10));
//! std::thread::sleep(Duration::from_millis(50));
//!
//! // Cancels the interval and waits for the loop thread to exit.
//! assert_eq!(event_loop.stop(), 1);
//! # Ok(())
//! # }
//! ```

pub mod process;
pub mod timers;

pub use process::Process;
pub use timers::TimerBindings;

// Re-export core types
pub use tickloop_runtime::{
    delay_from_millis, load_toml_config, load_yaml_config, Callback, ImmediateHandle,
    IntervalHandle, JobId, Loop, LoopBuilder, LoopConfig, LoopError, ModuleRegistry,
    RepeatingCallback, StopHandle, TimeUnit, TimerHandle, CONFIG_SECTION, CONSOLE_MODULE,
    DEFAULT_MIN_INTERVAL,
};

// Make tickloop_runtime available for hosts that want the full surface
pub use tickloop_runtime;
