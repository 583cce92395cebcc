//! Typed call-target handles and the closure traits they wrap.
//!
//! A handle stores one registered callable behind `Arc<dyn ...>`, typed by the
//! member's exact static signature. The host hands handles out erased as
//! [`RawHandle`]; a [`Specialization`](crate::Specialization) for the same
//! signature turns one back into a direct invoker.

use std::any::{Any, type_name};
use std::fmt;
use std::sync::Arc;

/// Callable with a shared receiver: `Fn(&T, A, B, ...) -> R`.
pub trait InstanceFn<T, Args, R>: Send + Sync + 'static {
    fn call(&self, receiver: &T, args: Args) -> R;
}

/// Callable with an exclusive receiver: `Fn(&mut T, A, B, ...) -> R`.
pub trait InstanceMutFn<T, Args, R>: Send + Sync + 'static {
    fn call_mut(&self, receiver: &mut T, args: Args) -> R;
}

/// Callable with no receiver: `Fn(A, B, ...) -> R`.
pub trait StaticFn<Args, R>: Send + Sync + 'static {
    fn call(&self, args: Args) -> R;
}

macro_rules! impl_fn_traits {
    ($($arg:ident),*) => {
        impl<T, R, F, $($arg),*> InstanceFn<T, ($($arg,)*), R> for F
        where
            F: Fn(&T, $($arg),*) -> R + Send + Sync + 'static,
        {
            #[allow(non_snake_case)]
            #[inline]
            fn call(&self, receiver: &T, ($($arg,)*): ($($arg,)*)) -> R {
                self(receiver, $($arg),*)
            }
        }

        impl<T, R, F, $($arg),*> InstanceMutFn<T, ($($arg,)*), R> for F
        where
            F: Fn(&mut T, $($arg),*) -> R + Send + Sync + 'static,
        {
            #[allow(non_snake_case)]
            #[inline]
            fn call_mut(&self, receiver: &mut T, ($($arg,)*): ($($arg,)*)) -> R {
                self(receiver, $($arg),*)
            }
        }

        impl<R, F, $($arg),*> StaticFn<($($arg,)*), R> for F
        where
            F: Fn($($arg),*) -> R + Send + Sync + 'static,
        {
            #[allow(non_snake_case)]
            #[inline]
            fn call(&self, ($($arg,)*): ($($arg,)*)) -> R {
                self($($arg),*)
            }
        }
    };
}

impl_fn_traits!();
impl_fn_traits!(A);
impl_fn_traits!(A, B);
impl_fn_traits!(A, B, C);
impl_fn_traits!(A, B, C, D);
impl_fn_traits!(A, B, C, D, E);
impl_fn_traits!(A, B, C, D, E, F0);
impl_fn_traits!(A, B, C, D, E, F0, G);
impl_fn_traits!(A, B, C, D, E, F0, G, H);

/// Handle to a shared-receiver callable.
pub struct InstanceHandle<T, Args, R> {
    pub(crate) f: Arc<dyn InstanceFn<T, Args, R>>,
}

/// Handle to an exclusive-receiver callable.
pub struct InstanceMutHandle<T, Args, R> {
    pub(crate) f: Arc<dyn InstanceMutFn<T, Args, R>>,
}

/// Handle to a receiver-less callable (static methods, constructors, static fields).
pub struct StaticHandle<Args, R> {
    pub(crate) f: Arc<dyn StaticFn<Args, R>>,
}

impl<T: 'static, Args: 'static, R: 'static> InstanceHandle<T, Args, R> {
    pub fn new<F: InstanceFn<T, Args, R>>(f: F) -> Self {
        Self { f: Arc::new(f) }
    }

    pub fn into_raw(self) -> RawHandle {
        RawHandle::new(self)
    }
}

impl<T: 'static, Args: 'static, R: 'static> InstanceMutHandle<T, Args, R> {
    pub fn new<F: InstanceMutFn<T, Args, R>>(f: F) -> Self {
        Self { f: Arc::new(f) }
    }

    pub fn into_raw(self) -> RawHandle {
        RawHandle::new(self)
    }
}

impl<Args: 'static, R: 'static> StaticHandle<Args, R> {
    pub fn new<F: StaticFn<Args, R>>(f: F) -> Self {
        Self { f: Arc::new(f) }
    }

    pub fn into_raw(self) -> RawHandle {
        RawHandle::new(self)
    }
}

/// A type-erased handle as returned by the host's lookup.
#[derive(Clone)]
pub struct RawHandle {
    inner: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl RawHandle {
    pub fn new<H: Any + Send + Sync>(handle: H) -> Self {
        Self {
            inner: Arc::new(handle),
            type_name: type_name::<H>(),
        }
    }

    /// Rust type name of the wrapped handle.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn downcast_ref<H: Any>(&self) -> Option<&H> {
        (*self.inner).downcast_ref::<H>()
    }
}

impl fmt::Debug for RawHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RawHandle({})", self.type_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instance_fn_from_closure() {
        let handle = InstanceHandle::<String, (String,), bool>::new(|s: &String, p: String| s.starts_with(&p));
        assert!(handle.f.call(&"abc".to_string(), ("a".to_string(),)));
    }

    #[test]
    fn instance_mut_fn_from_closure() {
        let handle = InstanceMutHandle::<Vec<i32>, (i32,), ()>::new(|v: &mut Vec<i32>, x: i32| v.push(x));
        let mut target = Vec::new();
        handle.f.call_mut(&mut target, (7,));
        assert_eq!(target, vec![7]);
    }

    #[test]
    fn static_fn_from_fn_item() {
        fn add(a: i64, b: i64) -> i64 {
            a + b
        }
        let handle = StaticHandle::<(i64, i64), i64>::new(add);
        assert_eq!(handle.f.call((2, 3)), 5);
    }

    #[test]
    fn raw_handle_downcast() {
        let raw = StaticHandle::<(), i32>::new(|| 32).into_raw();
        assert!(raw.downcast_ref::<StaticHandle<(), i32>>().is_some());
        assert!(raw.downcast_ref::<StaticHandle<(), i64>>().is_none());
        assert!(raw.type_name().contains("StaticHandle"));
    }
}
