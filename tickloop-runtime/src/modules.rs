use std::fmt;
use std::sync::Arc;

/// Name under which the console module is registered.
pub const CONSOLE_MODULE: &str = "console";

type Loader<E> = Arc<dyn Fn(&mut E) + Send + Sync + 'static>;

/// Named modules installed into the engine when a loop is built.
///
/// The registry knows nothing about what a module does; each loader receives
/// the engine and exposes whatever it wants. `console` is only installed when
/// the loop is configured with `enable_console`.
pub struct ModuleRegistry<E> {
    modules: Vec<(String, Loader<E>)>,
}

impl<E> Default for ModuleRegistry<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for ModuleRegistry<E> {
    fn clone(&self) -> Self {
        Self {
            modules: self.modules.clone(),
        }
    }
}

impl<E> fmt::Debug for ModuleRegistry<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleRegistry")
            .field("modules", &self.names().collect::<Vec<_>>())
            .finish()
    }
}

impl<E> ModuleRegistry<E> {
    pub fn new() -> Self {
        Self {
            modules: Vec::new(),
        }
    }

    /// Registers `loader` under `name`, replacing an earlier module of the same name.
    pub fn register<F>(mut self, name: impl Into<String>, loader: F) -> Self
    where
        F: Fn(&mut E) + Send + Sync + 'static,
    {
        let name = name.into();
        let loader: Loader<E> = Arc::new(loader);
        match self.modules.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = loader,
            None => self.modules.push((name, loader)),
        }
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.modules.iter().any(|(existing, _)| existing == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.modules.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Runs every loader against `engine` in registration order.
    /// Returns how many modules were installed.
    pub(crate) fn install(&self, engine: &mut E, enable_console: bool) -> usize {
        let mut installed = 0;
        for (name, loader) in &self.modules {
            if name == CONSOLE_MODULE && !enable_console {
                continue;
            }
            loader(engine);
            installed += 1;
        }
        installed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> ModuleRegistry<Vec<String>> {
        ModuleRegistry::new()
            .register(CONSOLE_MODULE, |e: &mut Vec<String>| e.push("console".into()))
            .register("process", |e: &mut Vec<String>| e.push("process".into()))
    }

    #[test]
    fn installs_in_registration_order() {
        let mut engine = Vec::new();
        assert_eq!(registry().install(&mut engine, true), 2);
        assert_eq!(engine, vec!["console", "process"]);
    }

    #[test]
    fn console_is_skipped_when_disabled() {
        let mut engine = Vec::new();
        assert_eq!(registry().install(&mut engine, false), 1);
        assert_eq!(engine, vec!["process"]);
    }

    #[test]
    fn register_replaces_same_name() {
        let registry = registry().register("process", |e: &mut Vec<String>| e.push("v2".into()));
        assert_eq!(registry.len(), 2);
        assert!(registry.contains("process"));

        let mut engine = Vec::new();
        registry.install(&mut engine, true);
        assert_eq!(engine, vec!["console", "v2"]);
    }
}
