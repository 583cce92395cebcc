//! Thunk facades.
//!
//! A [`Thunk`] is the resolved, reusable handle for one member in one scope.
//! Typed facades ([`FastMethod`], [`FastConstructor`], [`FieldGetter`],
//! [`FieldSetter`], [`FastField`]) wrap it and expose kind-specific calls.
//! Two facades are equal when they describe the same member in the same scope.

mod constructor;
mod field;
mod method;

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use fastreflect_core::{
    Invoke, InvokeError, MemberDescriptor, MemberKind, Modifiers, ReflectError, TypeRef, Value, Visibility,
};

use crate::{CanonicalName, ScopeId};

pub use constructor::FastConstructor;
pub use field::{FastField, FieldGetter, FieldSetter};
pub use method::FastMethod;

struct ThunkInner {
    descriptor: Arc<MemberDescriptor>,
    name: CanonicalName,
    scope: ScopeId,
    target: Arc<dyn Invoke>,
}

/// Resolved call handle for one member in one scope.
///
/// Cheap to clone; clones share the bound target.
#[derive(Clone)]
pub struct Thunk {
    inner: Arc<ThunkInner>,
}

impl Thunk {
    pub(crate) fn new(
        descriptor: Arc<MemberDescriptor>,
        name: CanonicalName,
        scope: ScopeId,
        target: Arc<dyn Invoke>,
    ) -> Self {
        Self {
            inner: Arc::new(ThunkInner {
                descriptor,
                name,
                scope,
                target,
            }),
        }
    }

    pub fn descriptor(&self) -> &Arc<MemberDescriptor> {
        &self.inner.descriptor
    }

    pub fn canonical_name(&self) -> &CanonicalName {
        &self.inner.name
    }

    pub fn scope_id(&self) -> ScopeId {
        self.inner.scope
    }

    pub fn kind(&self) -> MemberKind {
        self.inner.descriptor.kind
    }

    /// Call the bound target.
    ///
    /// `target` is the receiver; static members and constructors ignore it.
    #[inline]
    pub fn call(&self, target: Option<&Value>, args: &[Value]) -> Result<Value, InvokeError> {
        self.inner.target.invoke(target, args)
    }

    /// True when both handles are the same cached instance.
    pub fn ptr_eq(a: &Thunk, b: &Thunk) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }
}

impl PartialEq for Thunk {
    fn eq(&self, other: &Self) -> bool {
        self.inner.scope == other.inner.scope && self.inner.descriptor == other.inner.descriptor
    }
}

impl Eq for Thunk {}

impl Hash for Thunk {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.scope.hash(state);
        self.inner.descriptor.hash(state);
    }
}

impl fmt::Display for Thunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.inner.descriptor.generic_string())
    }
}

impl fmt::Debug for Thunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Thunk")
            .field("member", &self.inner.descriptor.generic_string())
            .field("unit", &self.inner.name)
            .field("scope", &self.inner.scope)
            .finish()
    }
}

/// Operations shared by every member facade.
pub trait FastMember {
    fn thunk(&self) -> &Thunk;

    fn descriptor(&self) -> &MemberDescriptor {
        self.thunk().descriptor()
    }

    fn name(&self) -> &str {
        &self.descriptor().name
    }

    fn modifiers(&self) -> Modifiers {
        self.descriptor().modifiers
    }

    fn visibility(&self) -> Visibility {
        self.descriptor().visibility
    }

    fn declaring_type(&self) -> &TypeRef {
        &self.descriptor().declaring_type
    }

    fn is_static(&self) -> bool {
        self.descriptor().is_static()
    }

    /// Generic invocation.
    fn invoke(&self, target: Option<&Value>, args: &[Value]) -> Result<Value, ReflectError> {
        Ok(self.thunk().call(target, args)?)
    }
}

/// Members with a parameter list: methods and constructors.
pub trait FastExecutable: FastMember {
    fn parameter_types(&self) -> &[TypeRef] {
        &self.descriptor().parameter_types
    }

    fn is_var_args(&self) -> bool {
        self.descriptor().is_var_args()
    }
}

impl FastMember for Thunk {
    fn thunk(&self) -> &Thunk {
        self
    }
}

/// Implements the shared facade plumbing for a `thunk`-wrapping newtype.
macro_rules! thunk_facade {
    ($facade:ident, $kind:expr) => {
        impl $facade {
            pub(crate) fn wrap(thunk: $crate::Thunk) -> Self {
                debug_assert_eq!(thunk.kind(), $kind);
                Self { thunk }
            }
        }

        impl TryFrom<$crate::Thunk> for $facade {
            type Error = ::fastreflect_core::ReflectError;

            fn try_from(thunk: $crate::Thunk) -> Result<Self, Self::Error> {
                if thunk.kind() == $kind {
                    Ok(Self { thunk })
                } else {
                    Err(::fastreflect_core::ReflectError::KindMismatch {
                        expected: $kind,
                        found: thunk.kind(),
                    })
                }
            }
        }

        impl From<$facade> for $crate::Thunk {
            fn from(facade: $facade) -> Self {
                facade.thunk
            }
        }

        impl ::std::fmt::Display for $facade {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                ::std::fmt::Display::fmt(&self.thunk, f)
            }
        }
    };
}

pub(crate) use thunk_facade;
