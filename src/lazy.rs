//! Deferred member facades.
//!
//! A [`Lazy`] holds a descriptor and a supplier. Nothing is synthesized until
//! a capability that needs the resolved facade is used; the supplier then runs
//! exactly once, even under concurrent first use, and its outcome (including a
//! failure) is kept for every later call.

use std::fmt;
use std::sync::{Arc, OnceLock};

use fastreflect_core::{MemberDescriptor, Modifiers, ReflectError, ResolutionError, TypeRef, Value, Visibility};

use crate::thunk::{FastConstructor, FastExecutable, FastField, FastMember, FastMethod, Thunk};

type Supplier<T> = Box<dyn Fn() -> Result<T, ResolutionError> + Send + Sync>;

/// A facade resolved on first use.
pub struct Lazy<T> {
    descriptor: Arc<MemberDescriptor>,
    supplier: Supplier<T>,
    cell: OnceLock<Result<T, ResolutionError>>,
}

pub type LazyMethod = Lazy<FastMethod>;
pub type LazyConstructor = Lazy<FastConstructor>;
pub type LazyField = Lazy<FastField>;

impl<T> Lazy<T> {
    pub fn new<F>(descriptor: Arc<MemberDescriptor>, supplier: F) -> Self
    where
        F: Fn() -> Result<T, ResolutionError> + Send + Sync + 'static,
    {
        Self {
            descriptor,
            supplier: Box::new(supplier),
            cell: OnceLock::new(),
        }
    }

    /// The member this value will resolve. Does not force resolution.
    pub fn descriptor(&self) -> &Arc<MemberDescriptor> {
        &self.descriptor
    }

    /// Resolve now if not yet resolved and return the facade.
    pub fn force(&self) -> Result<&T, ResolutionError> {
        match self.cell.get_or_init(|| (self.supplier)()) {
            Ok(value) => Ok(value),
            Err(err) => Err(err.clone()),
        }
    }

    /// True once the supplier has run, successfully or not.
    pub fn is_resolved(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl<T: FastMember> Lazy<T> {
    pub fn thunk(&self) -> Result<&Thunk, ResolutionError> {
        self.force().map(FastMember::thunk)
    }

    pub fn name(&self) -> Result<&str, ResolutionError> {
        self.force().map(FastMember::name)
    }

    pub fn modifiers(&self) -> Result<Modifiers, ResolutionError> {
        self.force().map(FastMember::modifiers)
    }

    pub fn visibility(&self) -> Result<Visibility, ResolutionError> {
        self.force().map(FastMember::visibility)
    }

    pub fn declaring_type(&self) -> Result<&TypeRef, ResolutionError> {
        self.force().map(FastMember::declaring_type)
    }

    pub fn invoke(&self, target: Option<&Value>, args: &[Value]) -> Result<Value, ReflectError> {
        self.force()?.invoke(target, args)
    }
}

impl<T: FastExecutable> Lazy<T> {
    pub fn parameter_types(&self) -> Result<&[TypeRef], ResolutionError> {
        self.force().map(FastExecutable::parameter_types)
    }

    pub fn is_var_args(&self) -> Result<bool, ResolutionError> {
        self.force().map(FastExecutable::is_var_args)
    }
}

impl Lazy<FastMethod> {
    pub fn return_type(&self) -> Result<&TypeRef, ResolutionError> {
        self.force().map(FastMethod::return_type)
    }
}

impl Lazy<FastConstructor> {
    pub fn new_instance(&self, args: &[Value]) -> Result<Value, ReflectError> {
        self.force()?.new_instance(args)
    }
}

impl Lazy<FastField> {
    pub fn get(&self, target: Option<&Value>) -> Result<Value, ReflectError> {
        self.force()?.get(target)
    }

    pub fn set(&self, target: Option<&Value>, value: Value) -> Result<(), ReflectError> {
        self.force()?.set(target, value)
    }

    pub fn is_final(&self) -> Result<bool, ResolutionError> {
        self.force().map(FastField::is_final)
    }
}

impl<T: fmt::Debug> fmt::Debug for Lazy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lazy")
            .field("member", &self.descriptor.generic_string())
            .field("resolved", &self.cell.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use fastreflect_core::{LookupError, ResolutionCause};
    use fastreflect_host::TypeRegistry;

    fn descriptor() -> Arc<MemberDescriptor> {
        let registry = TypeRegistry::with_builtins();
        let info = registry.get_of::<String>().expect("String registered");
        info.find_method("is_empty", &[]).expect("registered").descriptor.clone()
    }

    #[test]
    fn supplier_runs_once_on_first_use() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let lazy: Lazy<u32> = Lazy::new(descriptor(), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(7)
        });

        assert_eq!(lazy.descriptor().name, "is_empty");
        assert!(!lazy.is_resolved());
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        assert_eq!(lazy.force().ok(), Some(&7));
        assert_eq!(lazy.force().ok(), Some(&7));
        assert!(lazy.is_resolved());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn failure_is_permanent() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let lazy: Lazy<u32> = Lazy::new(descriptor(), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(ResolutionError::new(
                "Method_x",
                LookupError::NoSuchMember {
                    member: "String::is_empty".into(),
                },
            ))
        });

        let first = lazy.force().err().expect("fails");
        let second = lazy.force().err().expect("fails");
        assert!(first.same_cause(&second));
        assert!(matches!(first.cause(), ResolutionCause::Lookup(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn concurrent_first_use_runs_supplier_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let lazy: Lazy<usize> = Lazy::new(descriptor(), move || Ok(counter.fetch_add(1, Ordering::SeqCst)));

        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| assert_eq!(lazy.force().ok(), Some(&0)));
            }
        });
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
