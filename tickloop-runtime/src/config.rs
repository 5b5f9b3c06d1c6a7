use crate::error::LoopError;
use crate::time_unit::TimeUnit;
use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::warn;

/// Config section the loop settings are read from.
pub const CONFIG_SECTION: &str = "event_loop";

/// Period of zero-delay intervals when nothing else is configured.
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Load config from a specific TOML file
pub fn load_toml_config<P: AsRef<Path>>(path: P) -> Result<Config, Box<dyn std::error::Error>> {
    let config = Config::builder()
        .add_source(File::from(path.as_ref()).format(FileFormat::Toml))
        .add_source(environment())
        .build()?;
    Ok(config)
}

/// Load config from a specific YAML file
pub fn load_yaml_config<P: AsRef<Path>>(path: P) -> Result<Config, Box<dyn std::error::Error>> {
    let config = Config::builder()
        .add_source(File::from(path.as_ref()).format(FileFormat::Yaml))
        .add_source(environment())
        .build()?;
    Ok(config)
}

// TICKLOOP_EVENT_LOOP__ENABLE_CONSOLE=false -> event_loop.enable_console
fn environment() -> Environment {
    Environment::with_prefix("TICKLOOP")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

/// Settings for an event loop.
///
/// Every field has a default, so an empty or missing `[event_loop]` section
/// yields `LoopConfig::default()`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoopConfig {
    /// Whether the `console` module is installed into the engine.
    pub enable_console: bool,
    /// Period of intervals scheduled with a zero delay, as a duration string
    /// ("1ms", "5s").
    pub min_interval: String,
    /// Worker threads for the timer runtime the loop owns.
    pub timer_threads: usize,
    /// Name given to the background tick thread.
    pub thread_name: String,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            enable_console: true,
            min_interval: "1ms".to_string(),
            timer_threads: 1,
            thread_name: "tickloop".to_string(),
        }
    }
}

impl LoopConfig {
    /// Read the `[event_loop]` section of an already loaded config.
    pub fn from_config(config: &Config) -> Result<Self, LoopError> {
        match config.get::<LoopConfig>(CONFIG_SECTION) {
            Ok(loop_config) => Ok(loop_config),
            Err(ConfigError::NotFound(_)) => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Load from a TOML file, with `TICKLOOP_` environment overrides.
    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let config = load_toml_config(path)?;
        Ok(Self::from_config(&config)?)
    }

    /// Load from a YAML file, with `TICKLOOP_` environment overrides.
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let config = load_yaml_config(path)?;
        Ok(Self::from_config(&config)?)
    }

    /// Parsed `min_interval`, falling back to 1ms when invalid or zero.
    pub fn min_interval(&self) -> Duration {
        match TimeUnit::parse_duration(&self.min_interval) {
            Some(d) if !d.is_zero() => d,
            _ => {
                warn!(
                    min_interval = %self.min_interval,
                    "Invalid min_interval, using 1ms"
                );
                DEFAULT_MIN_INTERVAL
            }
        }
    }

    pub(crate) fn timer_threads(&self) -> usize {
        self.timer_threads.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(suffix: &str, body: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(suffix)
            .tempfile()
            .expect("temp file");
        file.write_all(body.as_bytes()).expect("write config");
        file
    }

    #[test]
    fn defaults_when_section_missing() {
        let file = write_config(".toml", "[other]\nkey = 1\n");
        let cfg = LoopConfig::from_toml(file.path()).expect("load");
        assert!(cfg.enable_console);
        assert_eq!(cfg.min_interval(), DEFAULT_MIN_INTERVAL);
        assert_eq!(cfg.thread_name, "tickloop");
    }

    #[test]
    fn reads_toml_section() {
        let file = write_config(
            ".toml",
            "[event_loop]\nenable_console = false\nmin_interval = \"5ms\"\ntimer_threads = 2\n",
        );
        let cfg = LoopConfig::from_toml(file.path()).expect("load");
        assert!(!cfg.enable_console);
        assert_eq!(cfg.min_interval(), Duration::from_millis(5));
        assert_eq!(cfg.timer_threads(), 2);
        assert_eq!(cfg.thread_name, "tickloop");
    }

    #[test]
    fn reads_yaml_section() {
        let file = write_config(".yaml", "event_loop:\n  thread_name: scripts\n");
        let cfg = LoopConfig::from_yaml(file.path()).expect("load");
        assert_eq!(cfg.thread_name, "scripts");
        assert!(cfg.enable_console);
    }

    #[test]
    fn invalid_min_interval_falls_back() {
        let cfg = LoopConfig {
            min_interval: "0ms".to_string(),
            ..LoopConfig::default()
        };
        assert_eq!(cfg.min_interval(), DEFAULT_MIN_INTERVAL);

        let cfg = LoopConfig {
            min_interval: "soon".to_string(),
            timer_threads: 0,
            ..LoopConfig::default()
        };
        assert_eq!(cfg.min_interval(), DEFAULT_MIN_INTERVAL);
        assert_eq!(cfg.timer_threads(), 1);
    }
}
