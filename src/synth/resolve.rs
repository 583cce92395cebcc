//! The one-time resolution step of a generated unit.

use std::sync::Arc;

use fastreflect_core::{Invoke, LookupError, MemberDescriptor};
use fastreflect_host::Lookup;

use super::strategy::ResolveStrategy;

/// Find the member's handle with the unit's lookup strategy and bind it to the
/// descriptor's specialization.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn bind_target(
    lookup: &Lookup,
    descriptor: &MemberDescriptor,
    strategy: ResolveStrategy,
) -> Result<Arc<dyn Invoke>, LookupError> {
    let handle = match strategy {
        ResolveStrategy::Virtual => lookup.find_virtual(descriptor),
        ResolveStrategy::Static => lookup.find_static(descriptor),
        ResolveStrategy::Constructor => lookup.find_constructor(descriptor),
        ResolveStrategy::FieldRead => lookup.find_field_reader(descriptor),
        ResolveStrategy::FieldWrite => lookup.find_field_writer(descriptor),
    }?;

    descriptor
        .specialization
        .bind(&handle)
        .ok_or_else(|| LookupError::SignatureMismatch {
            member: descriptor.generic_string(),
            expected: descriptor.specialization.handle_type().to_string(),
            found: handle.type_name().to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use fastreflect_core::{TypeRef, Value};
    use fastreflect_host::TypeRegistry;

    #[test]
    fn bind_and_call() {
        let registry = Arc::new(TypeRegistry::with_builtins());
        let lookup = Lookup::new(registry.clone());
        let info = registry.get_of::<String>().expect("String registered");
        let desc = info
            .find_method("concat", &[TypeRef::of::<String>()])
            .expect("registered")
            .descriptor
            .clone();

        let target = bind_target(&lookup, &desc, ResolveStrategy::Virtual).expect("binds");
        let out = target.invoke(Some(&Value::from("ab")), &[Value::from("cd")]);
        assert_eq!(out.ok(), Some(Value::from("abcd")));
    }

    #[test]
    fn wrong_strategy_fails_lookup() {
        let registry = Arc::new(TypeRegistry::with_builtins());
        let lookup = Lookup::new(registry.clone());
        let info = registry.get_of::<String>().expect("String registered");
        let desc = info
            .find_method("len", &[])
            .expect("registered")
            .descriptor
            .clone();

        assert!(matches!(
            bind_target(&lookup, &desc, ResolveStrategy::Static),
            Err(LookupError::NoSuchMember { .. })
        ));
    }
}
