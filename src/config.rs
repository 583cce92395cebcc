//! Scope configuration.

use std::sync::Arc;

use fastreflect_host::TypeRegistry;

use crate::Scope;

/// Builder for a [`Scope`].
///
/// Defaults: unnamed, the global registry, load-time verification on,
/// access checks on.
///
/// ```ignore
/// let scope = ScopeConfig::new()
///     .with_name("plugins")
///     .with_registry(Arc::new(TypeRegistry::with_builtins()))
///     .build();
/// ```
#[derive(Clone)]
pub struct ScopeConfig {
    pub(crate) name: Option<String>,
    pub(crate) registry: Option<Arc<TypeRegistry>>,
    pub(crate) verify_units: bool,
    pub(crate) suppress_access_checks: bool,
}

impl ScopeConfig {
    pub fn new() -> Self {
        Self {
            name: None,
            registry: None,
            verify_units: true,
            suppress_access_checks: false,
        }
    }

    /// Name used in logs.
    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_registry(mut self, registry: Arc<TypeRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Run load-time checks on every unit before resolving it.
    pub fn with_verify_units(mut self, verify: bool) -> Self {
        self.verify_units = verify;
        self
    }

    /// Relax accessibility of every member requested through type facades
    /// created in this scope.
    pub fn with_suppressed_access_checks(mut self, suppress: bool) -> Self {
        self.suppress_access_checks = suppress;
        self
    }

    pub fn build(self) -> Scope {
        Scope::with_config(self)
    }
}

impl Default for ScopeConfig {
    fn default() -> Self {
        Self::new()
    }
}
