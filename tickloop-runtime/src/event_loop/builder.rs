use super::event_loop::Loop;
use super::shared::Shared;
use crate::config::{load_toml_config, load_yaml_config, LoopConfig};
use crate::driver::TimerDriver;
use crate::error::LoopError;
use crate::modules::ModuleRegistry;
use config::Config;
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::info;

/// Builder for an event loop
pub struct LoopBuilder<E> {
    engine: E,
    config: LoopConfig,
    registry: ModuleRegistry<E>,
    timer_handle: Option<Handle>,
}

impl<E: Send + 'static> LoopBuilder<E> {
    /// Create a new loop builder with default config
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            config: LoopConfig::default(),
            registry: ModuleRegistry::new(),
            timer_handle: None,
        }
    }

    /// Use settings from a TOML file
    ///
    /// # Panics
    ///
    /// Panics if the config file cannot be loaded or parsed.
    /// This is intentional as configuration errors should be caught early during setup.
    pub fn with_toml(self, path: &str) -> Self {
        let config = load_toml_config(path)
            .unwrap_or_else(|e| panic!("Failed to load TOML config from '{}': {}", path, e));
        self.with_config(&config)
    }

    /// Use settings from a YAML file
    ///
    /// # Panics
    ///
    /// Panics if the config file cannot be loaded or parsed.
    /// This is intentional as configuration errors should be caught early during setup.
    pub fn with_yaml(self, path: &str) -> Self {
        let config = load_yaml_config(path)
            .unwrap_or_else(|e| panic!("Failed to load YAML config from '{}': {}", path, e));
        self.with_config(&config)
    }

    /// Use settings from the `[event_loop]` section of a loaded config
    ///
    /// # Panics
    ///
    /// Panics if the section is present but malformed.
    pub fn with_config(self, config: &Config) -> Self {
        let loop_config = LoopConfig::from_config(config)
            .unwrap_or_else(|e| panic!("Invalid event loop config: {}", e));
        self.config(loop_config)
    }

    pub fn config(mut self, config: LoopConfig) -> Self {
        self.config = config;
        self
    }

    /// Controls whether the `console` module of the registry is installed.
    pub fn enable_console(mut self, enable: bool) -> Self {
        self.config.enable_console = enable;
        self
    }

    /// Modules to install into the engine when the loop is built.
    pub fn registry(mut self, registry: ModuleRegistry<E>) -> Self {
        self.registry = registry;
        self
    }

    /// Drive timers on an existing tokio runtime instead of an owned one.
    pub fn timer_handle(mut self, handle: Handle) -> Self {
        self.timer_handle = Some(handle);
        self
    }

    /// Build the loop (does not start it yet)
    ///
    /// Installs the registered modules into the engine and sets up the timer
    /// runtime.
    pub fn build(self) -> Result<Loop<E>, LoopError> {
        let LoopBuilder {
            mut engine,
            config,
            registry,
            timer_handle,
        } = self;

        let driver = match timer_handle {
            Some(handle) => TimerDriver::shared(handle),
            None => TimerDriver::owned(config.timer_threads(), &config.thread_name)?,
        };

        let installed = registry.install(&mut engine, config.enable_console);

        info!(
            modules = installed,
            enable_console = config.enable_console,
            min_interval = %config.min_interval,
            "Building event loop"
        );

        Ok(Loop {
            shared: Arc::new(Shared::new(config, driver, Some(engine))),
        })
    }
}
