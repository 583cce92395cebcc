//! Fast reflective member access.
//!
//! A member is resolved once into a [`Thunk`]: a cached, directly bound call
//! handle. Every later invocation goes straight to the bound target without
//! name lookup or signature matching.
//!
//! ```ignore
//! use fastreflect::prelude::*;
//!
//! let class = FastClass::of::<String>()?;
//! let starts_with = class.get_method("starts_with", &[TypeRef::of::<String>()])?;
//! assert_eq!(
//!     starts_with.invoke(Some(&Value::from("abc")), &[Value::from("a")])?,
//!     Value::Bool(true),
//! );
//! ```
//!
//! Thunks live in a [`Scope`]. Each scope synthesizes one unit per canonical
//! member signature, resolves it once, and hands out the same thunk for every
//! later request. Distinct scopes never share units.

mod canonical;
mod class;
mod config;
mod lazy;
mod namespace;
mod scope;
pub mod synth;
mod thunk;

pub use canonical::{CanonicalName, canonicalize};
pub use class::FastClass;
pub use config::ScopeConfig;
pub use lazy::{Lazy, LazyConstructor, LazyField, LazyMethod};
pub use namespace::{DefinedUnit, UnitNamespace};
pub use scope::{Scope, ScopeId, ScopeStats};
pub use thunk::{FastConstructor, FastExecutable, FastField, FastMember, FastMethod, FieldGetter, FieldSetter, Thunk};

pub use fastreflect_macros::NativeType;

pub mod prelude {
    pub use crate::{
        FastClass, FastConstructor, FastExecutable, FastField, FastMember, FastMethod, FieldGetter, FieldSetter,
        Lazy, LazyConstructor, LazyField, LazyMethod, Scope, ScopeConfig, Thunk,
    };
    pub use fastreflect_core::{
        FromValue, IntoValue, MemberDescriptor, MemberKind, Modifiers, NativeType, ObjectRef, ReflectError,
        ResolutionError, TypeRef, Value, ValueType, Visibility,
    };
    pub use fastreflect_host::{DeriveFields, Integer, TypeRegistry};
    pub use fastreflect_macros::NativeType;
}
