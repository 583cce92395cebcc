//! Built-in reflected types.

use fastreflect_core::NativeType;

use crate::TypeRegistry;

/// Marker type carrying integer constants and parsing helpers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Integer;

impl NativeType for Integer {
    const NAME: &'static str = "Integer";
}

/// Register `String` and `Integer`.
pub fn register_builtins(registry: &TypeRegistry) {
    registry
        .register::<String>()
        .constructor("new", String::new)
        .constructor("from_chars", |chars: Vec<char>| chars.into_iter().collect::<String>())
        .method("starts_with", |s: &String, prefix: String| s.starts_with(&prefix))
        .method("ends_with", |s: &String, suffix: String| s.ends_with(&suffix))
        .method("contains", |s: &String, needle: String| s.contains(&needle))
        .method("len", |s: &String| s.len())
        .method("is_empty", |s: &String| s.is_empty())
        .method("char_at", |s: &String, index: usize| s.chars().nth(index))
        .method("to_uppercase", |s: &String| s.to_uppercase())
        .method("concat", |s: &String, other: String| format!("{s}{other}"))
        .static_method("value_of", |v: i64| v.to_string())
        .static_method("join", |separator: String, parts: Vec<String>| parts.join(&separator))
        .varargs()
        .build();

    registry
        .register::<Integer>()
        .static_field("SIZE", || 32i32)
        .static_field("MAX_VALUE", || i32::MAX)
        .static_field("MIN_VALUE", || i32::MIN)
        .static_method("parse", |s: String| s.parse::<i32>())
        .static_method("max", |a: i32, b: i32| a.max(b))
        .static_method("sum", |values: Vec<i64>| values.iter().sum::<i64>())
        .varargs()
        .build();
}

#[cfg(test)]
mod tests {
    use super::*;
    use fastreflect_core::{TypeRef, Value};

    use crate::Lookup;
    use std::sync::Arc;

    #[test]
    fn string_members() {
        let registry = TypeRegistry::with_builtins();
        let info = registry.get_of::<String>().expect("String registered");

        assert!(info.find_constructor(&[TypeRef::of::<Vec<char>>()]).is_some());
        assert!(info.find_constructor(&[]).is_some());
        let join = info
            .find_method("join", &[TypeRef::of::<String>(), TypeRef::of::<Vec<String>>()])
            .expect("join registered");
        assert!(join.descriptor.is_var_args());
        assert!(join.descriptor.is_static());
    }

    #[test]
    fn integer_constants_are_final() {
        let registry = TypeRegistry::with_builtins();
        let info = registry.get_of::<Integer>().expect("Integer registered");
        let size = info.find_field("SIZE").expect("SIZE registered");
        assert!(size.getter.is_final());
        assert!(size.getter.is_static());
        assert!(!size.is_mutable());
    }

    #[test]
    fn integer_parse_returns_target_error() {
        let registry = Arc::new(TypeRegistry::with_builtins());
        let info = registry.get_of::<Integer>().expect("Integer registered");
        let parse = info
            .find_method("parse", &[TypeRef::of::<String>()])
            .expect("parse registered")
            .descriptor
            .clone();
        assert_eq!(parse.return_type, TypeRef::of::<i32>());

        let lookup = Lookup::new(registry);
        let handle = lookup.resolve(&parse).expect("resolves");
        let invoker = parse.specialization.bind(&handle).expect("binds");

        assert_eq!(invoker.invoke(None, &[Value::from("42")]).ok(), Some(Value::Int(42)));
        let err = invoker.invoke(None, &[Value::from("4x2")]).err().expect("parse fails");
        assert!(err.target_error::<std::num::ParseIntError>().is_some());
    }
}
