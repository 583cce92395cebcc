//! Thread-safe registry of reflected types.

use std::sync::{Arc, OnceLock};

use fastreflect_core::{NativeType, TypeHash};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::{TypeBuilder, TypeInfo, builtins};

/// Registry of [`TypeInfo`] keyed by type hash.
///
/// Registered types are immutable snapshots; re-registering or removing a
/// member swaps in a new snapshot, so descriptors handed out earlier keep
/// describing what they described.
#[derive(Default)]
pub struct TypeRegistry {
    types: RwLock<FxHashMap<TypeHash, Arc<TypeInfo>>>,
}

static GLOBAL: OnceLock<Arc<TypeRegistry>> = OnceLock::new();

impl TypeRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the built-in `String` and `Integer` types.
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        builtins::register_builtins(&registry);
        registry
    }

    /// The process-wide registry, created with builtins on first use.
    pub fn global() -> Arc<TypeRegistry> {
        GLOBAL
            .get_or_init(|| Arc::new(TypeRegistry::with_builtins()))
            .clone()
    }

    /// Start registering `T`.
    pub fn register<T: NativeType>(&self) -> TypeBuilder<'_, T> {
        TypeBuilder::new(self)
    }

    pub(crate) fn insert(&self, info: TypeInfo) -> Arc<TypeInfo> {
        let info = Arc::new(info);
        self.types.write().insert(info.type_hash(), info.clone());
        info
    }

    pub fn get(&self, hash: TypeHash) -> Option<Arc<TypeInfo>> {
        self.types.read().get(&hash).cloned()
    }

    pub fn get_by_name(&self, name: &str) -> Option<Arc<TypeInfo>> {
        self.get(TypeHash::from_name(name))
    }

    pub fn get_of<T: NativeType>(&self) -> Option<Arc<TypeInfo>> {
        self.get_by_name(T::NAME)
    }

    pub fn contains(&self, hash: TypeHash) -> bool {
        self.types.read().contains_key(&hash)
    }

    pub fn len(&self) -> usize {
        self.types.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.read().is_empty()
    }

    /// Names of all registered types, sorted.
    pub fn type_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.types.read().values().map(|t| t.name().to_string()).collect();
        names.sort();
        names
    }

    pub fn remove_type(&self, hash: TypeHash) -> Option<Arc<TypeInfo>> {
        let removed = self.types.write().remove(&hash);
        if let Some(info) = &removed {
            debug!(type_name = info.name(), "removed type");
        }
        removed
    }

    /// Remove every member called `name` from a type. Returns how many went.
    pub fn remove_member(&self, hash: TypeHash, name: &str) -> usize {
        let mut types = self.types.write();
        let Some(info) = types.get(&hash) else {
            return 0;
        };
        let (updated, removed) = info.without_member(name);
        if removed > 0 {
            debug!(type_name = updated.name(), member = name, removed, "removed member");
            types.insert(hash, Arc::new(updated));
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_are_registered() {
        let registry = TypeRegistry::with_builtins();
        assert_eq!(registry.len(), 2);
        assert!(registry.get_of::<String>().is_some());
        assert!(registry.get_by_name("Integer").is_some());
        assert_eq!(registry.type_names(), vec!["Integer".to_string(), "String".to_string()]);
    }

    #[test]
    fn global_is_shared() {
        let a = TypeRegistry::global();
        let b = TypeRegistry::global();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn remove_member_swaps_snapshot() {
        let registry = TypeRegistry::with_builtins();
        let before = registry.get_of::<String>().expect("String registered");
        let removed = registry.remove_member(before.type_hash(), "starts_with");
        assert_eq!(removed, 1);

        let after = registry.get_of::<String>().expect("String registered");
        assert!(after.declared_methods().all(|m| m.descriptor.name != "starts_with"));
        assert!(before.declared_methods().any(|m| m.descriptor.name == "starts_with"));
        assert_eq!(registry.remove_member(before.type_hash(), "starts_with"), 0);
    }

    #[test]
    fn remove_type() {
        let registry = TypeRegistry::with_builtins();
        let hash = TypeHash::from_name("Integer");
        assert!(registry.remove_type(hash).is_some());
        assert!(!registry.contains(hash));
        assert!(registry.remove_type(hash).is_none());
    }
}
