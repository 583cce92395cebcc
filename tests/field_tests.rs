//! Field accessors, including fields registered through `#[derive(NativeType)]`.

mod common;

use common::{Counter, counter_class, scope};
use fastreflect::prelude::*;
use fastreflect_core::{AccessError, InvokeError};

#[test]
fn derived_mutable_field_round_trips() {
    let scope = scope();
    let count = counter_class(&scope).get_field("count").expect("resolves");
    assert!(!count.is_final());
    assert_eq!(count.field_type(), &TypeRef::of::<i64>());
    assert_eq!(count.declaring_type().name(), "test::Counter");

    let counter = Value::object(Counter::new("hits"));
    assert_eq!(count.get(Some(&counter)).expect("reads"), Value::Int(0));
    count.set(Some(&counter), Value::Int(9)).expect("writes");
    assert_eq!(count.get(Some(&counter)).expect("reads"), Value::Int(9));

    // Generic form: no args reads, one arg writes.
    assert_eq!(count.invoke(Some(&counter), &[Value::Int(11)]).expect("writes"), Value::Void);
    assert_eq!(count.invoke(Some(&counter), &[]).expect("reads"), Value::Int(11));
    assert!(matches!(
        count.invoke(Some(&counter), &[Value::Int(1), Value::Int(2)]),
        Err(ReflectError::Invoke(InvokeError::Arity { expected: 1, actual: 2 }))
    ));
}

#[test]
fn immutable_field_rejects_writes() {
    let scope = scope();
    let label = counter_class(&scope).get_field("label").expect("resolves");
    assert!(label.is_final());
    assert!(label.setter().is_none());
    assert!(label.modifiers().contains(Modifiers::FINAL));

    let counter = Value::object(Counter::new("hits"));
    let err = label.set(Some(&counter), Value::from("misses")).err();
    assert!(matches!(
        err,
        Some(ReflectError::Access(AccessError::ImmutableField { .. }))
    ));
    assert_eq!(label.get(Some(&counter)).expect("reads"), Value::from("hits"));
}

#[test]
fn static_constant_reads_without_receiver() {
    let scope = scope();
    let class = FastClass::in_scope::<Integer>(&scope).expect("registered");
    let max = class.get_field("MAX_VALUE").expect("resolves");
    assert!(max.is_static());
    assert_eq!(max.get(None).expect("reads"), Value::Int(i64::from(i32::MAX)));
    assert_eq!(max.get(Some(&Value::Int(5))).expect("reads"), Value::Int(i64::from(i32::MAX)));
    assert!(max.set(None, Value::Int(0)).is_err());
}

#[test]
fn private_field_needs_relaxed_access() {
    let scope = scope();
    let class = counter_class(&scope);
    assert!(class.get_field("secret").is_err());

    let strict = class.get_declared_field("secret").err().expect("private");
    assert!(strict.as_resolution().is_some());

    let relaxed = class
        .clone()
        .with_suppressed_access_checks(true)
        .get_declared_field("secret")
        .expect("relaxed");
    let counter = Value::object(Counter::new("c"));
    assert_eq!(relaxed.get(Some(&counter)).expect("reads"), Value::Int(42));
    relaxed.set(Some(&counter), Value::Int(7)).expect("writes");
    assert_eq!(relaxed.get(Some(&counter)).expect("reads"), Value::Int(7));
}

#[test]
fn getter_and_setter_are_separate_units() {
    let scope = scope();
    let count = counter_class(&scope).get_field("count").expect("resolves");
    let setter = count.setter().expect("mutable");
    assert_ne!(count.getter().thunk().canonical_name(), setter.thunk().canonical_name());
    assert_eq!(count.getter().thunk().canonical_name().kind_prefix(), "FieldGetter");
    assert_eq!(setter.thunk().canonical_name().kind_prefix(), "FieldSetter");
    assert_eq!(scope.stats().units_defined, 2);
}

#[test]
fn wrong_receiver_type_is_rejected() {
    let scope = scope();
    let count = counter_class(&scope).get_field("count").expect("resolves");
    assert!(matches!(
        count.get(Some(&Value::from("not a counter"))),
        Err(ReflectError::Invoke(InvokeError::ReceiverMismatch { .. }))
    ));
    assert!(matches!(
        count.set(Some(&Value::from("not a counter")), Value::Int(1)),
        Err(ReflectError::Invoke(InvokeError::ReceiverNotMutable { .. }))
    ));
}

#[test]
fn accessors_are_method_shaped() {
    let scope = scope();
    let count = counter_class(&scope).get_field("count").expect("resolves");
    let getter = count.getter();
    let setter = count.setter().expect("mutable");

    assert!(getter.parameter_types().is_empty());
    assert!(!getter.is_var_args());
    assert_eq!(getter.return_type(), &TypeRef::of::<i64>());

    assert_eq!(setter.parameter_types(), &[TypeRef::of::<i64>()]);
    assert!(!setter.is_var_args());
    assert!(setter.return_type().is_void());
    assert_eq!(setter.field_type(), &TypeRef::of::<i64>());
    assert_eq!(setter.name(), "count");
}
