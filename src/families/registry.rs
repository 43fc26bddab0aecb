use std::sync::OnceLock;

use tracing::debug;

use super::{Family, Platform};
use crate::platform::PlatformDescriptor;

/// Process-wide registry, set exactly once.
static REGISTRY: OnceLock<Registry> = OnceLock::new();

/// Family name -> family, in registration order.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    entries: Vec<(String, Family)>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in family under its own name.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for family in Family::ALL {
            registry.register(family.name(), family);
        }
        registry
    }

    /// Register `family` under `name`. A name registered twice keeps its
    /// first position and takes the newer family.
    pub fn register(&mut self, name: impl Into<String>, family: Family) {
        let name = name.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = family,
            None => self.entries.push((name, family)),
        }
    }

    pub fn lookup(&self, name: &str) -> Option<Family> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, family)| *family)
    }

    /// Registered `(name, family)` pairs in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Family)> {
        self.entries
            .iter()
            .map(|(name, family)| (name.as_str(), *family))
    }

    pub fn names(&self) -> Vec<&str> {
        self.iter().map(|(name, _)| name).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up the descriptor's family and bind it. Unknown families give
    /// `None`.
    pub fn platform(&self, descriptor: &PlatformDescriptor) -> Option<Platform> {
        let family = self.lookup(descriptor.family())?;
        Some(family.bind(
            descriptor.version().map(str::to_string),
            descriptor.architecture().map(str::to_string),
        ))
    }
}

/// Install the built-in registry. Call once at startup.
pub fn init() -> Result<(), RegistryError> {
    init_with(Registry::builtin())
}

/// Install a custom registry. Call once at startup.
pub fn init_with(registry: Registry) -> Result<(), RegistryError> {
    debug!(families = ?registry.names(), "installing family registry");
    REGISTRY
        .set(registry)
        .map_err(|_| RegistryError::AlreadyInitialized)
}

/// The process-wide registry. Falls back to the built-in families when
/// nothing was installed.
pub fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::builtin)
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum RegistryError {
    #[error("family registry already initialized")]
    AlreadyInitialized,
}

#[cfg(test)]
mod tests {
    use super::{Registry, registry};
    use crate::families::Family;
    use crate::platform::PlatformDescriptor;

    #[test]
    fn builtin_holds_every_family() {
        let registry = Registry::builtin();
        assert_eq!(registry.len(), Family::ALL.len());
        assert_eq!(
            registry.names(),
            vec!["centos", "debian", "el", "fedora", "freebsd", "ubuntu", "windows"]
        );
    }

    #[test]
    fn unknown_name_is_no_match() {
        assert_eq!(Registry::builtin().lookup("blarghle"), None);
        assert_eq!(Registry::new().lookup("centos"), None);
    }

    #[test]
    fn re_registering_overwrites_in_place() {
        let mut registry = Registry::builtin();
        registry.register("centos", Family::El);

        assert_eq!(registry.lookup("centos"), Some(Family::El));
        assert_eq!(registry.len(), Family::ALL.len());
        assert_eq!(registry.names()[0], "centos");
    }

    #[test]
    fn platform_binds_descriptor_fields() {
        let platform = Registry::builtin()
            .platform(&PlatformDescriptor::parse("el-6-x86_64"))
            .unwrap();
        assert_eq!(platform.family(), Family::El);
        assert_eq!(platform.version(), Some("6"));
        assert_eq!(platform.architecture(), Some("x86_64"));
    }

    #[test]
    fn global_registry_defaults_to_builtin() {
        assert_eq!(registry().lookup("ubuntu"), Some(Family::Ubuntu));
    }
}
