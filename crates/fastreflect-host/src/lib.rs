//! Host reflection facility.
//!
//! Types are registered with a [`TypeRegistry`] through a fluent
//! [`TypeBuilder`]; each registered member yields a [`MemberDescriptor`]
//! (enumerable through [`TypeInfo`]) and a typed call-target handle.
//! [`Lookup`] is the low-level invocation primitive: it resolves a descriptor
//! back to that handle, enforcing signature and accessibility checks.
//!
//! [`MemberDescriptor`]: fastreflect_core::MemberDescriptor

mod builder;
mod builtins;
mod lookup;
mod registry;
mod type_info;

pub use builder::{DeriveFields, TypeBuilder};
pub use builtins::{Integer, register_builtins};
pub use lookup::Lookup;
pub use registry::TypeRegistry;
pub use type_info::{FieldEntry, MethodEntry, TypeInfo};
