//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::sync::{Arc, OnceLock};

use fastreflect::prelude::*;
use tracing_subscriber::EnvFilter;

/// Install a test-writer subscriber once per test binary. Honors `RUST_LOG`.
pub fn init_tracing() {
    static INIT: OnceLock<()> = OnceLock::new();
    INIT.get_or_init(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

#[derive(Debug, Clone, PartialEq, NativeType)]
#[reflect(name = "test::Counter")]
pub struct Counter {
    #[reflect(get, set)]
    pub count: i64,
    #[reflect(get)]
    pub label: String,
    #[reflect(get, set, private)]
    pub secret: i64,
}

impl Counter {
    pub fn new(label: &str) -> Self {
        Self {
            count: 0,
            label: label.to_string(),
            secret: 42,
        }
    }
}

/// Builtins plus `test::Counter`.
pub fn registry() -> Arc<TypeRegistry> {
    let registry = TypeRegistry::with_builtins();
    registry
        .register::<Counter>()
        .constructor("new", |label: String| Counter::new(&label))
        .method("current", |c: &Counter| c.count)
        .method_mut("increment", |c: &mut Counter, by: i64| {
            c.count += by;
            c.count
        })
        .method("peek_secret", |c: &Counter| c.secret)
        .private()
        .derived_fields()
        .build();
    Arc::new(registry)
}

/// A fresh scope over its own registry.
pub fn scope() -> Scope {
    init_tracing();
    ScopeConfig::new().with_registry(registry()).build()
}

pub fn string_class(scope: &Scope) -> FastClass {
    FastClass::in_scope::<String>(scope).expect("String registered")
}

pub fn counter_class(scope: &Scope) -> FastClass {
    FastClass::in_scope::<Counter>(scope).expect("Counter registered")
}
