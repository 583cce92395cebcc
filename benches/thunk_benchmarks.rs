//! Invocation cost of cached thunks.
//!
//! Compares three ways of calling `String::starts_with`:
//! - `direct`: a plain Rust call
//! - `lookup_per_call`: find the member and bind it on every call, the way a
//!   generic reflective invoke would
//! - `cached_thunk`: resolve once, then call the cached thunk
//!
//! ## Profiling with Puffin
//!
//! ```bash
//! cargo bench --features profile-with-puffin -- --profile-time 5
//! ```

use criterion::{Criterion, criterion_group, criterion_main};
use fastreflect::prelude::*;
use fastreflect_core::Invoke;
use std::hint::black_box;
use std::sync::Arc;

#[cfg(feature = "profile-with-puffin")]
static FRAME_VIEW: std::sync::OnceLock<puffin::GlobalFrameView> = std::sync::OnceLock::new();

#[cfg(feature = "profile-with-puffin")]
fn setup_profiler() {
    puffin::set_scopes_on(true);
    FRAME_VIEW.get_or_init(puffin::GlobalFrameView::default);
}

#[cfg(not(feature = "profile-with-puffin"))]
fn setup_profiler() {}

#[cfg(feature = "profile-with-puffin")]
fn end_profiling_frame() {
    puffin::GlobalProfiler::lock().new_frame();
}

#[cfg(not(feature = "profile-with-puffin"))]
fn end_profiling_frame() {}

fn invocation_benchmarks(c: &mut Criterion) {
    setup_profiler();

    let scope = ScopeConfig::new()
        .with_registry(Arc::new(TypeRegistry::with_builtins()))
        .build();
    let class = FastClass::in_scope::<String>(&scope).expect("String registered");
    let params = [TypeRef::of::<String>()];
    let receiver = Value::from("abcdef");
    let args = [Value::from("abc")];

    let mut group = c.benchmark_group("starts_with");

    group.bench_function("direct", |b| {
        let s = String::from("abcdef");
        b.iter(|| black_box(s.starts_with(black_box("abc"))))
    });

    group.bench_function("lookup_per_call", |b| {
        b.iter(|| {
            let entry = class
                .type_info()
                .find_method("starts_with", &params)
                .expect("registered");
            let target = entry
                .descriptor
                .specialization
                .bind(&entry.handle)
                .expect("binds");
            black_box(target.invoke(Some(&receiver), &args).expect("invokes"))
        })
    });

    group.bench_function("cached_thunk", |b| {
        let thunk = class.get_method("starts_with", &params).expect("resolves");
        b.iter(|| black_box(thunk.invoke(Some(&receiver), &args).expect("invokes")));
        end_profiling_frame();
    });

    group.finish();
}

fn resolution_benchmarks(c: &mut Criterion) {
    let registry = Arc::new(TypeRegistry::with_builtins());
    let mut group = c.benchmark_group("resolution");

    group.bench_function("first_request", |b| {
        b.iter(|| {
            let scope = ScopeConfig::new().with_registry(registry.clone()).build();
            let class = FastClass::in_scope::<String>(&scope).expect("String registered");
            black_box(class.get_method("len", &[]).expect("resolves"))
        })
    });

    group.bench_function("cache_hit", |b| {
        let scope = ScopeConfig::new().with_registry(registry.clone()).build();
        let class = FastClass::in_scope::<String>(&scope).expect("String registered");
        class.get_method("len", &[]).expect("resolves");
        b.iter(|| black_box(class.get_method("len", &[]).expect("resolves")))
    });

    group.finish();
}

criterion_group!(benches, invocation_benchmarks, resolution_benchmarks);
criterion_main!(benches);
