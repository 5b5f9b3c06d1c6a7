mod builder;
mod event_loop;
mod handle;
mod nested;
mod session;
mod shared;
mod tick;

pub use builder::LoopBuilder;
pub use event_loop::Loop;
pub use handle::StopHandle;
