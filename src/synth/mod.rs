//! Unit synthesis.
//!
//! [`Synthesizer::synthesize`] turns a descriptor into a [`GeneratedUnit`]:
//! a canonical name, the encoded op skeleton chosen by the kind's
//! [`MemberStrategy`], and the originating descriptor. The loader defines the
//! unit; its first initialization runs [`resolve::bind_target`] once.

mod code;
mod emit;
mod resolve;
mod strategy;

use std::sync::Arc;

use fastreflect_core::MemberDescriptor;
use tracing::debug;

use crate::{CanonicalName, canonicalize};

pub use code::{CodeError, Op, UnitCode};
pub use emit::{ConstructorEmitter, FieldGetterEmitter, FieldSetterEmitter, KindEmitter, MethodEmitter, emitter_for};
pub use strategy::{CallShape, MemberStrategy, ResolveStrategy, ResultShape};

pub(crate) use emit::{resolve_strategy, verify};
pub(crate) use resolve::bind_target;

/// A synthesized, not yet defined unit.
///
/// Consumed by [`Scope::load`](crate::Scope::load).
#[derive(Debug)]
pub struct GeneratedUnit {
    pub name: CanonicalName,
    pub code: UnitCode,
    pub descriptor: Arc<MemberDescriptor>,
}

/// Emits generated units.
#[derive(Debug, Default, Clone, Copy)]
pub struct Synthesizer;

impl Synthesizer {
    pub fn new() -> Self {
        Self
    }

    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn synthesize(&self, descriptor: Arc<MemberDescriptor>) -> GeneratedUnit {
        let name = canonicalize(&descriptor);
        let code = emitter_for(descriptor.kind).emit(&descriptor);
        debug!(unit = %name, member = %descriptor, bytes = code.len(), "synthesized unit");
        GeneratedUnit {
            name,
            code,
            descriptor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fastreflect_core::TypeRef;
    use fastreflect_host::TypeRegistry;

    #[test]
    fn synthesize_names_unit_canonically() {
        let registry = TypeRegistry::with_builtins();
        let info = registry.get_of::<String>().expect("String registered");
        let desc = info
            .find_method("ends_with", &[TypeRef::of::<String>()])
            .expect("registered")
            .descriptor
            .clone();

        let unit = Synthesizer::new().synthesize(desc.clone());
        assert_eq!(unit.name, canonicalize(&desc));
        assert!(Arc::ptr_eq(&unit.descriptor, &desc));
        let ops = unit.code.decode().expect("decodes");
        assert_eq!(verify(&ops, &desc).map(|s| s.resolve), Ok(ResolveStrategy::Virtual));
    }
}
