//! Defining scopes: the thunk loader and cache.
//!
//! A [`Scope`] owns a unit namespace and a thunk cache keyed by canonical
//! name. Each key is filled at most once: concurrent requests for the same
//! key block on one initializer and all receive the same [`Thunk`]. A failed
//! resolution is cached just like a success.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use fastreflect_core::{MemberDescriptor, MemberKind, ReflectError, ResolutionError};
use fastreflect_host::{Lookup, TypeRegistry};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::namespace::{UnitNamespace, check_label};
use crate::synth::{GeneratedUnit, Synthesizer};
use crate::thunk::{FastConstructor, FastField, FastMember, FastMethod, FieldGetter, FieldSetter, Thunk};
use crate::{CanonicalName, ScopeConfig, canonicalize};

/// Process-unique identity of a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(u64);

impl ScopeId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        ScopeId(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scope#{}", self.0)
    }
}

/// Counters describing a scope's cache activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScopeStats {
    /// Units synthesized
    pub syntheses: u64,
    /// Units defined in the namespace
    pub units_defined: u64,
    /// Requests answered from the cache
    pub cache_hits: u64,
    /// Resolutions that failed (each recorded once)
    pub resolution_failures: u64,
    /// Cache entries, successful or failed
    pub cached_thunks: usize,
}

type ThunkSlot = Arc<OnceLock<Result<Thunk, ResolutionError>>>;

#[derive(Default)]
struct Counters {
    syntheses: AtomicU64,
    cache_hits: AtomicU64,
    failures: AtomicU64,
}

struct ScopeInner {
    id: ScopeId,
    name: Option<String>,
    lookup: Lookup,
    suppress_access_checks: bool,
    synthesizer: Synthesizer,
    namespace: UnitNamespace,
    thunks: RwLock<FxHashMap<CanonicalName, ThunkSlot>>,
    counters: Counters,
}

/// An isolated namespace of generated units and their thunks.
///
/// Cloning a `Scope` shares it. Two distinct scopes never share units or
/// thunks, even for the same member.
#[derive(Clone)]
pub struct Scope {
    inner: Arc<ScopeInner>,
}

static GLOBAL: OnceLock<Scope> = OnceLock::new();

impl Scope {
    /// A fresh scope over the global registry.
    pub fn new() -> Self {
        ScopeConfig::new().build()
    }

    pub fn with_config(config: ScopeConfig) -> Self {
        let registry = config.registry.unwrap_or_else(TypeRegistry::global);
        let scope = Self {
            inner: Arc::new(ScopeInner {
                id: ScopeId::next(),
                name: config.name,
                lookup: Lookup::new(registry),
                suppress_access_checks: config.suppress_access_checks,
                synthesizer: Synthesizer::new(),
                namespace: UnitNamespace::new(config.verify_units),
                thunks: RwLock::new(FxHashMap::default()),
                counters: Counters::default(),
            }),
        };
        debug!(scope = %scope.id(), name = ?scope.name(), "created scope");
        scope
    }

    /// The process-wide default scope.
    ///
    /// Created over the global registry on first use and never dropped.
    pub fn global() -> Scope {
        GLOBAL.get_or_init(|| ScopeConfig::new().with_name("global").build()).clone()
    }

    pub fn id(&self) -> ScopeId {
        self.inner.id
    }

    pub fn name(&self) -> Option<&str> {
        self.inner.name.as_deref()
    }

    pub fn registry(&self) -> &Arc<TypeRegistry> {
        self.inner.lookup.registry()
    }

    pub fn lookup(&self) -> &Lookup {
        &self.inner.lookup
    }

    pub fn suppresses_access_checks(&self) -> bool {
        self.inner.suppress_access_checks
    }

    // === Loading ===

    /// The thunk for `descriptor`, synthesizing and loading its unit on
    /// first request.
    ///
    /// Every request served without running synthesis on the calling thread
    /// counts as a cache hit, including requests that waited for another
    /// thread's synthesis of the same key.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn thunk(&self, descriptor: &Arc<MemberDescriptor>) -> Result<Thunk, ResolutionError> {
        let name = canonicalize(descriptor);
        let slot = self.slot(&name);
        let mut synthesized = false;
        let outcome = slot.get_or_init(|| {
            synthesized = true;
            self.inner.counters.syntheses.fetch_add(1, Ordering::Relaxed);
            let unit = self.inner.synthesizer.synthesize(descriptor.clone());
            self.construct(unit)
        });
        if !synthesized {
            self.inner.counters.cache_hits.fetch_add(1, Ordering::Relaxed);
            trace!(scope = %self.id(), unit = %name, "thunk cache hit");
        }
        outcome.clone()
    }

    /// Define `unit` (if its name is new) and return the scope's one thunk
    /// for it. A unit whose name is already cached is dropped unused.
    ///
    /// A unit whose name is not its descriptor's canonical name is rejected
    /// without touching the cache.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn load(&self, unit: GeneratedUnit) -> Result<Thunk, ResolutionError> {
        if let Err(err) = check_label(&unit) {
            self.inner.counters.failures.fetch_add(1, Ordering::Relaxed);
            return Err(err);
        }
        let slot = self.slot(&unit.name);
        slot.get_or_init(|| self.construct(unit)).clone()
    }

    fn slot(&self, name: &CanonicalName) -> ThunkSlot {
        if let Some(slot) = self.inner.thunks.read().get(name) {
            return slot.clone();
        }
        self.inner.thunks.write().entry(name.clone()).or_default().clone()
    }

    fn construct(&self, unit: GeneratedUnit) -> Result<Thunk, ResolutionError> {
        let outcome = self
            .inner
            .namespace
            .define(unit)
            .and_then(|defined| defined.initialize(&self.inner.lookup).map(|target| (defined, target)));
        match outcome {
            Ok((defined, target)) => {
                debug!(scope = %self.id(), unit = %defined.name(), "published thunk");
                Ok(Thunk::new(
                    defined.descriptor().clone(),
                    defined.name().clone(),
                    self.id(),
                    target,
                ))
            }
            Err(err) => {
                self.inner.counters.failures.fetch_add(1, Ordering::Relaxed);
                Err(err)
            }
        }
    }

    // === Typed helpers ===

    pub fn method(&self, descriptor: &Arc<MemberDescriptor>) -> Result<FastMethod, ReflectError> {
        expect_kind(descriptor, MemberKind::Method)?;
        Ok(FastMethod::wrap(self.thunk(descriptor)?))
    }

    pub fn constructor(&self, descriptor: &Arc<MemberDescriptor>) -> Result<FastConstructor, ReflectError> {
        expect_kind(descriptor, MemberKind::Constructor)?;
        Ok(FastConstructor::wrap(self.thunk(descriptor)?))
    }

    pub fn field_getter(&self, descriptor: &Arc<MemberDescriptor>) -> Result<FieldGetter, ReflectError> {
        expect_kind(descriptor, MemberKind::FieldGetter)?;
        Ok(FieldGetter::wrap(self.thunk(descriptor)?))
    }

    pub fn field_setter(&self, descriptor: &Arc<MemberDescriptor>) -> Result<FieldSetter, ReflectError> {
        expect_kind(descriptor, MemberKind::FieldSetter)?;
        Ok(FieldSetter::wrap(self.thunk(descriptor)?))
    }

    /// A field facade: the getter, plus the setter unless the field is final.
    pub fn field(
        &self,
        getter: &Arc<MemberDescriptor>,
        setter: &Arc<MemberDescriptor>,
    ) -> Result<FastField, ReflectError> {
        let getter = self.field_getter(getter)?;
        let setter = if getter.descriptor().is_final() {
            None
        } else {
            Some(self.field_setter(setter)?)
        };
        Ok(FastField::new(getter, setter))
    }

    // === Introspection ===

    pub fn is_defined(&self, name: &CanonicalName) -> bool {
        self.inner.namespace.is_defined(name)
    }

    pub fn cached_thunks(&self) -> usize {
        self.inner.thunks.read().len()
    }

    pub fn stats(&self) -> ScopeStats {
        let counters = &self.inner.counters;
        ScopeStats {
            syntheses: counters.syntheses.load(Ordering::Relaxed),
            units_defined: self.inner.namespace.definitions(),
            cache_hits: counters.cache_hits.load(Ordering::Relaxed),
            resolution_failures: counters.failures.load(Ordering::Relaxed),
            cached_thunks: self.cached_thunks(),
        }
    }
}

fn expect_kind(descriptor: &MemberDescriptor, expected: MemberKind) -> Result<(), ReflectError> {
    if descriptor.kind == expected {
        Ok(())
    } else {
        Err(ReflectError::KindMismatch {
            expected,
            found: descriptor.kind,
        })
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Scope {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for Scope {}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("id", &self.inner.id)
            .field("name", &self.inner.name)
            .field("cached_thunks", &self.cached_thunks())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fastreflect_core::{LookupError, ResolutionCause, TypeRef, Value};

    fn scope() -> Scope {
        ScopeConfig::new()
            .with_registry(Arc::new(TypeRegistry::with_builtins()))
            .build()
    }

    fn string_method(scope: &Scope, name: &str, params: &[TypeRef]) -> Arc<MemberDescriptor> {
        scope
            .registry()
            .get_of::<String>()
            .and_then(|info| info.find_declared_method(name, params).map(|m| m.descriptor.clone()))
            .expect("method registered")
    }

    #[test]
    fn repeated_requests_share_one_thunk() {
        let scope = scope();
        let desc = string_method(&scope, "starts_with", &[TypeRef::of::<String>()]);

        let a = scope.thunk(&desc).expect("resolves");
        let b = scope.thunk(&desc).expect("resolves");
        assert!(Thunk::ptr_eq(&a, &b));

        let stats = scope.stats();
        assert_eq!(stats.syntheses, 1);
        assert_eq!(stats.units_defined, 1);
        assert_eq!(stats.cache_hits, 1);
        assert!(scope.is_defined(a.canonical_name()));
    }

    #[test]
    fn load_is_idempotent() {
        let scope = scope();
        let desc = string_method(&scope, "len", &[]);
        let synth = Synthesizer::new();

        let a = scope.load(synth.synthesize(desc.clone())).expect("resolves");
        let b = scope.load(synth.synthesize(desc.clone())).expect("resolves");
        let c = scope.thunk(&desc).expect("resolves");
        assert!(Thunk::ptr_eq(&a, &b));
        assert!(Thunk::ptr_eq(&a, &c));
        assert_eq!(scope.stats().units_defined, 1);
    }

    #[test]
    fn load_rejects_mislabelled_unit() {
        let scope = scope();
        let len = string_method(&scope, "len", &[]);
        let upper = string_method(&scope, "to_uppercase", &[]);

        let mut unit = Synthesizer::new().synthesize(upper);
        unit.name = canonicalize(&len);
        let err = scope.load(unit).err().expect("rejected");
        assert!(matches!(err.cause(), ResolutionCause::Verification(_)));
        assert_eq!(scope.cached_thunks(), 0);
        assert!(!scope.is_defined(&canonicalize(&len)));

        let thunk = scope.thunk(&len).expect("resolves");
        assert_eq!(thunk.descriptor(), &len);
        assert_eq!(thunk.call(Some(&Value::from("abc")), &[]).ok(), Some(Value::Int(3)));
    }

    #[test]
    fn waiting_requests_count_as_hits() {
        let scope = scope();
        let desc = string_method(&scope, "to_uppercase", &[]);

        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| scope.thunk(&desc).expect("resolves"));
            }
        });

        let stats = scope.stats();
        assert_eq!(stats.syntheses, 1);
        assert_eq!(stats.cache_hits, 7);
    }

    #[test]
    fn failed_resolution_is_cached() {
        let scope = scope();
        let desc = string_method(&scope, "len", &[]);
        scope.registry().remove_member(desc.declaring_type.hash(), "len");

        let first = scope.thunk(&desc).err().expect("member removed");
        let second = scope.thunk(&desc).err().expect("member removed");
        assert!(first.same_cause(&second));
        assert!(matches!(
            first.cause(),
            ResolutionCause::Lookup(LookupError::NoSuchMember { .. })
        ));
        let stats = scope.stats();
        assert_eq!(stats.syntheses, 1);
        assert_eq!(stats.resolution_failures, 1);
    }

    #[test]
    fn typed_helpers_check_kind() {
        let scope = scope();
        let desc = string_method(&scope, "len", &[]);
        assert!(matches!(
            scope.constructor(&desc),
            Err(ReflectError::KindMismatch {
                expected: MemberKind::Constructor,
                found: MemberKind::Method
            })
        ));
        let len = scope.method(&desc).expect("resolves");
        let out = len.thunk().call(Some(&Value::from("four")), &[]);
        assert_eq!(out.ok(), Some(Value::Int(4)));
    }

    #[test]
    fn scopes_are_distinct() {
        let a = scope();
        let b = scope();
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn global_scope_is_shared() {
        assert_eq!(Scope::global(), Scope::global());
        assert_eq!(Scope::global().name(), Some("global"));
    }
}
