//! Core types for fast reflective invocation.
//!
//! This crate holds everything both the host registry and the thunk layer
//! agree on: the erased [`Value`] model and its conversion traits, type and
//! member identity ([`TypeHash`], [`TypeRef`], [`MemberDescriptor`]), typed
//! call-target handles, per-signature [`Specialization`]s and the error types.

mod convert;
mod descriptor;
mod error;
mod handle;
mod invoke;
mod native_type;
mod type_hash;
mod type_ref;
mod value;
mod visibility;

pub use convert::{FromArgs, FromValue, IntoReturn, IntoValue, ValueType};
pub use descriptor::{MemberDescriptor, MemberKind, Modifiers};
pub use error::{AccessError, ConversionError, InvokeError, LookupError, ReflectError, ResolutionCause, ResolutionError};
pub use handle::{InstanceFn, InstanceHandle, InstanceMutFn, InstanceMutHandle, RawHandle, StaticFn, StaticHandle};
pub use invoke::{Invoke, ReceiverMode, Specialization};
pub use native_type::NativeType;
pub use type_hash::{TypeHash, hash_constants, signature_digest};
pub use type_ref::TypeRef;
pub use value::{ObjectRef, Value};
pub use visibility::Visibility;
