//! Module discovery and lookup.
//!
//! Plugins register typed factories into a namespace instead of being found
//! by introspection. Discovery walks every unit of the namespace, derives the
//! module path from the unit location and builds an immutable catalog.

use tracing::{debug, warn};

use super::{builtin, Module};
use crate::error::RegistryError;
use crate::logger::Logger;

/// Namespace holding the modules shipped with the console
pub const DEFAULT_NAMESPACE: &str = "hbfmodules";

/// Constructor for a module instance
pub type ModuleFactory = fn() -> Box<dyn Module>;

/// One loadable unit of a plugin namespace
#[derive(Debug, Clone, Copy)]
pub struct PluginUnit {
    /// Dotted location, e.g. `hbfmodules.uart.baudrates`
    pub location: &'static str,
    pub load: fn() -> Result<ModuleFactory, RegistryError>,
}

/// Something that can enumerate the units of a namespace
pub trait PluginSource {
    /// `None` when the namespace does not exist
    fn units(&self, namespace: &str) -> Option<Vec<PluginUnit>>;
}

/// Source serving the modules compiled into the console
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinPlugins;

impl PluginSource for BuiltinPlugins {
    fn units(&self, namespace: &str) -> Option<Vec<PluginUnit>> {
        (namespace == DEFAULT_NAMESPACE).then(builtin::units)
    }
}

/// Catalog entry locating a module without instantiating it
#[derive(Debug, Clone)]
pub struct ModuleDescriptor {
    path: String,
    factory: ModuleFactory,
}

impl ModuleDescriptor {
    #[must_use]
    pub fn new(path: impl Into<String>, factory: ModuleFactory) -> Self {
        Self {
            path: path.into(),
            factory,
        }
    }

    /// Slash separated `category/name`
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn instantiate(&self) -> Box<dyn Module> {
        (self.factory)()
    }
}

/// Read-only catalog of discovered modules
#[derive(Debug, Default)]
pub struct ModuleRegistry {
    modules: Vec<ModuleDescriptor>,
}

impl ModuleRegistry {
    /// Walk `namespace` and build the catalog.
    ///
    /// A unit that fails to load is reported and skipped. A missing or empty
    /// namespace yields an empty catalog and an error message; neither is
    /// fatal. The number of loaded modules is always reported.
    pub fn discover(namespace: &str, source: &dyn PluginSource, logger: &mut Logger) -> Self {
        let mut registry = Self::default();

        match source.units(namespace) {
            None => logger.error(format!(
                "Unable to find any modules, the \"{namespace}\" plugin namespace does not exist"
            )),
            Some(units) => {
                for unit in units {
                    if let Err(e) = registry.register_unit(namespace, unit) {
                        warn!(unit = unit.location, "Skipping plugin unit: {e}");
                        logger.error(e.to_string());
                    }
                }
                if registry.is_empty() {
                    logger.error(format!("Unable to find any modules in the \"{namespace}\" plugin namespace"));
                }
            }
        }

        logger.user(format!("{} modules loaded", registry.len()));
        registry
    }

    fn register_unit(&mut self, namespace: &str, unit: PluginUnit) -> Result<(), RegistryError> {
        let path = module_path(namespace, unit.location)?;
        if self.find(&path).is_some() {
            return Err(RegistryError::DuplicatePath(path));
        }

        let factory = (unit.load)()?;
        debug!(path = %path, "Registered module");
        self.modules.push(ModuleDescriptor::new(path, factory));
        Ok(())
    }

    #[must_use]
    pub fn find(&self, path: &str) -> Option<&ModuleDescriptor> {
        self.modules.iter().find(|m| m.path == path)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.modules.iter().map(|m| m.path.as_str())
    }

    #[must_use]
    pub fn descriptors(&self) -> &[ModuleDescriptor] {
        &self.modules
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

/// Strip the namespace prefix and turn the dotted location into a path
pub fn module_path(namespace: &str, location: &str) -> Result<String, RegistryError> {
    let outside = || RegistryError::OutsideNamespace {
        unit: location.to_string(),
        namespace: namespace.to_string(),
    };

    let rest = location
        .strip_prefix(namespace)
        .and_then(|r| r.strip_prefix('.'))
        .ok_or_else(outside)?;

    if rest.is_empty() || rest.split('.').any(str::is_empty) {
        return Err(outside());
    }

    Ok(rest.replace('.', "/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::Severity;

    #[test]
    fn test_module_path() {
        assert_eq!(module_path("hbfmodules", "hbfmodules.uart.baudrates").unwrap(), "uart/baudrates");
        assert!(module_path("hbfmodules", "other.uart.baudrates").is_err());
        assert!(module_path("hbfmodules", "hbfmodulesx.uart").is_err());
        assert!(module_path("hbfmodules", "hbfmodules.").is_err());
        assert!(module_path("hbfmodules", "hbfmodules.uart..scan").is_err());
    }

    #[test]
    fn test_builtin_discovery() {
        let mut logger = Logger::capture();
        let registry = ModuleRegistry::discover(DEFAULT_NAMESPACE, &BuiltinPlugins, &mut logger);

        assert!(registry.find("uart/baudrates").is_some());
        assert!(registry.find("i2c/scan").is_some());
        assert!(logger.contains(Severity::UserInteract, &format!("{} modules loaded", registry.len())));
    }

    #[test]
    fn test_missing_namespace() {
        let mut logger = Logger::capture();
        let registry = ModuleRegistry::discover("nowhere", &BuiltinPlugins, &mut logger);

        assert!(registry.is_empty());
        assert!(logger.contains(Severity::Error, "Unable to find any modules"));
    }
}
