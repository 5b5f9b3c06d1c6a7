use thiserror::Error;

/// Errors surfaced by the event loop for environmental failures.
///
/// Misuse of the lifecycle (starting a running loop, blocking stop from the
/// loop thread) is not represented here; those are programmer errors and panic.
#[derive(Debug, Error)]
pub enum LoopError {
    #[error("failed to build timer runtime: {0}")]
    TimerRuntime(#[source] std::io::Error),

    #[error("failed to spawn event loop thread: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("invalid event loop configuration: {0}")]
    Config(#[from] config::ConfigError),
}
