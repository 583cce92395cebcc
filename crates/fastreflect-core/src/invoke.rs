//! Direct invokers and the per-signature specializations that produce them.
//!
//! A [`Specialization`] is a monomorphized binding function for one exact
//! static signature. Binding downcasts a [`RawHandle`] to the handle type of
//! that signature and wraps it in an invoker whose `invoke` converts the
//! erased arguments, casts the receiver and calls the target with concrete
//! types. Nothing is looked up by name on the call path.

use std::any::{Any, type_name};
use std::fmt;
use std::sync::Arc;

use crate::handle::{InstanceFn, InstanceHandle, InstanceMutFn, InstanceMutHandle, StaticFn, StaticHandle};
use crate::{FromArgs, IntoReturn, InvokeError, NativeType, RawHandle, Value};

/// The erased call entry point implemented by every bound target.
pub trait Invoke: Send + Sync {
    /// Call the target. `target` is ignored by receiver-less members.
    fn invoke(&self, target: Option<&Value>, args: &[Value]) -> Result<Value, InvokeError>;
}

/// How a specialization borrows its receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReceiverMode {
    /// No receiver (static members and constructors)
    None,
    /// `&T`
    Shared,
    /// `&mut T`; only object receivers qualify
    Exclusive,
}

/// Monomorphized binder for one static signature.
#[derive(Clone, Copy)]
pub struct Specialization {
    receiver: ReceiverMode,
    arity: usize,
    handle_type: &'static str,
    bind: fn(&RawHandle) -> Option<Arc<dyn Invoke>>,
}

impl Specialization {
    /// Signature `fn(&T, Args) -> R`.
    pub fn instance<T, Args, R>() -> Self
    where
        T: NativeType,
        Args: FromArgs + 'static,
        R: IntoReturn + 'static,
    {
        Self {
            receiver: ReceiverMode::Shared,
            arity: Args::ARITY,
            handle_type: type_name::<InstanceHandle<T, Args, R>>(),
            bind: bind_instance::<T, Args, R>,
        }
    }

    /// Signature `fn(&mut T, Args) -> R`.
    pub fn instance_mut<T, Args, R>() -> Self
    where
        T: NativeType,
        Args: FromArgs + 'static,
        R: IntoReturn + 'static,
    {
        Self {
            receiver: ReceiverMode::Exclusive,
            arity: Args::ARITY,
            handle_type: type_name::<InstanceMutHandle<T, Args, R>>(),
            bind: bind_instance_mut::<T, Args, R>,
        }
    }

    /// Signature `fn(Args) -> R`.
    pub fn receiverless<Args, R>() -> Self
    where
        Args: FromArgs + 'static,
        R: IntoReturn + 'static,
    {
        Self {
            receiver: ReceiverMode::None,
            arity: Args::ARITY,
            handle_type: type_name::<StaticHandle<Args, R>>(),
            bind: bind_static::<Args, R>,
        }
    }

    /// A specialization that never binds. Useful for descriptors that are
    /// only compared or printed.
    pub fn unbound(receiver: ReceiverMode, arity: usize) -> Self {
        Self {
            receiver,
            arity,
            handle_type: "<unbound>",
            bind: |_| None,
        }
    }

    pub fn receiver(&self) -> ReceiverMode {
        self.receiver
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Rust type name of the handle this specialization accepts.
    pub fn handle_type(&self) -> &'static str {
        self.handle_type
    }

    /// Bind a resolved handle. `None` when the handle has a different signature.
    pub fn bind(&self, handle: &RawHandle) -> Option<Arc<dyn Invoke>> {
        (self.bind)(handle)
    }
}

impl fmt::Debug for Specialization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Specialization")
            .field("receiver", &self.receiver)
            .field("arity", &self.arity)
            .field("handle_type", &self.handle_type)
            .finish()
    }
}

fn bind_instance<T, Args, R>(handle: &RawHandle) -> Option<Arc<dyn Invoke>>
where
    T: NativeType,
    Args: FromArgs + 'static,
    R: IntoReturn + 'static,
{
    let handle = handle.downcast_ref::<InstanceHandle<T, Args, R>>()?;
    Some(Arc::new(BoundInstance {
        f: handle.f.clone(),
    }))
}

fn bind_instance_mut<T, Args, R>(handle: &RawHandle) -> Option<Arc<dyn Invoke>>
where
    T: NativeType,
    Args: FromArgs + 'static,
    R: IntoReturn + 'static,
{
    let handle = handle.downcast_ref::<InstanceMutHandle<T, Args, R>>()?;
    Some(Arc::new(BoundInstanceMut {
        f: handle.f.clone(),
    }))
}

fn bind_static<Args, R>(handle: &RawHandle) -> Option<Arc<dyn Invoke>>
where
    Args: FromArgs + 'static,
    R: IntoReturn + 'static,
{
    let handle = handle.downcast_ref::<StaticHandle<Args, R>>()?;
    Some(Arc::new(BoundStatic {
        f: handle.f.clone(),
    }))
}

// ============================================================================
// Bound invokers
// ============================================================================

struct BoundInstance<T, Args, R> {
    f: Arc<dyn InstanceFn<T, Args, R>>,
}

impl<T, Args, R> Invoke for BoundInstance<T, Args, R>
where
    T: NativeType,
    Args: FromArgs + 'static,
    R: IntoReturn + 'static,
{
    #[inline]
    fn invoke(&self, target: Option<&Value>, args: &[Value]) -> Result<Value, InvokeError> {
        // Arguments first: an argument may alias the receiver object.
        let args = Args::from_args(args)?;
        let receiver = target.ok_or(InvokeError::NullReceiver)?;
        with_shared::<T, _>(receiver, |recv| self.f.call(recv, args))?.into_return()
    }
}

struct BoundInstanceMut<T, Args, R> {
    f: Arc<dyn InstanceMutFn<T, Args, R>>,
}

impl<T, Args, R> Invoke for BoundInstanceMut<T, Args, R>
where
    T: NativeType,
    Args: FromArgs + 'static,
    R: IntoReturn + 'static,
{
    #[inline]
    fn invoke(&self, target: Option<&Value>, args: &[Value]) -> Result<Value, InvokeError> {
        let args = Args::from_args(args)?;
        let receiver = target.ok_or(InvokeError::NullReceiver)?;
        with_exclusive::<T, _>(receiver, |recv| self.f.call_mut(recv, args))?.into_return()
    }
}

struct BoundStatic<Args, R> {
    f: Arc<dyn StaticFn<Args, R>>,
}

impl<Args, R> Invoke for BoundStatic<Args, R>
where
    Args: FromArgs + 'static,
    R: IntoReturn + 'static,
{
    #[inline]
    fn invoke(&self, _target: Option<&Value>, args: &[Value]) -> Result<Value, InvokeError> {
        let args = Args::from_args(args)?;
        self.f.call(args).into_return()
    }
}

// ============================================================================
// Receiver casting
// ============================================================================

fn with_shared<T: NativeType, O>(target: &Value, f: impl FnOnce(&T) -> O) -> Result<O, InvokeError> {
    let plain: &dyn Any = match target {
        Value::Object(obj) => {
            let actual = obj.type_name();
            return obj.with_ref(f).ok_or_else(|| InvokeError::ReceiverMismatch {
                expected: T::NAME,
                actual: actual.to_string(),
            });
        }
        Value::Null | Value::Void => return Err(InvokeError::NullReceiver),
        Value::Bool(v) => v,
        Value::Char(v) => v,
        Value::Int(v) => v,
        Value::Float(v) => v,
        Value::Str(v) => v,
        Value::Array(v) => v,
    };
    plain
        .downcast_ref::<T>()
        .map(f)
        .ok_or_else(|| InvokeError::ReceiverMismatch {
            expected: T::NAME,
            actual: target.type_name().to_string(),
        })
}

fn with_exclusive<T: NativeType, O>(target: &Value, f: impl FnOnce(&mut T) -> O) -> Result<O, InvokeError> {
    match target {
        Value::Object(obj) => obj.with_mut(f).ok_or_else(|| InvokeError::ReceiverMismatch {
            expected: T::NAME,
            actual: obj.type_name().to_string(),
        }),
        Value::Null | Value::Void => Err(InvokeError::NullReceiver),
        other => Err(InvokeError::ReceiverNotMutable {
            actual: other.type_name(),
        }),
    }
}
