//! The type-erased value carried across every thunk boundary.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::NativeType;

/// A type-erased argument, receiver or result.
///
/// Every integer width travels as `Int(i64)` and is range-checked when it is
/// converted back; `f32`/`f64` travel as `Float(f64)`. Registered native types
/// travel as shared [`ObjectRef`]s.
#[derive(Clone, Default)]
pub enum Value {
    /// Result of a member that returns nothing
    #[default]
    Void,
    /// Absent value (`None`, or a missing receiver)
    Null,
    Bool(bool),
    Char(char),
    Int(i64),
    Float(f64),
    Str(String),
    /// Homogeneous sequence; also the packed form of trailing var-args
    Array(Vec<Value>),
    Object(ObjectRef),
}

impl Value {
    /// Human-readable name of the variant.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Void => "void",
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Char(_) => "char",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    /// Wrap a registered native value in a fresh object.
    pub fn object<T: NativeType>(value: T) -> Self {
        Value::Object(ObjectRef::new(value))
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Value::Void)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Void => write!(f, "Void"),
            Value::Null => write!(f, "Null"),
            Value::Bool(v) => write!(f, "Bool({})", v),
            Value::Char(c) => write!(f, "Char({:?})", c),
            Value::Int(v) => write!(f, "Int({})", v),
            Value::Float(v) => write!(f, "Float({})", v),
            Value::Str(s) => write!(f, "Str({:?})", s),
            Value::Array(items) => f.debug_tuple("Array").field(items).finish(),
            Value::Object(o) => write!(f, "{:?}", o),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Void, Value::Void) => true,
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            // Objects compare by identity
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<char> for Value {
    fn from(v: char) -> Self {
        Value::Char(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

struct ObjectCell {
    type_name: &'static str,
    type_id: TypeId,
    data: RwLock<Box<dyn Any + Send + Sync>>,
}

/// A shared, lock-protected instance of a registered native type.
///
/// Cloning an `ObjectRef` shares the instance. Two refs are equal only when
/// they point at the same instance.
#[derive(Clone)]
pub struct ObjectRef(Arc<ObjectCell>);

impl ObjectRef {
    pub fn new<T: NativeType>(value: T) -> Self {
        ObjectRef(Arc::new(ObjectCell {
            type_name: T::NAME,
            type_id: TypeId::of::<T>(),
            data: RwLock::new(Box::new(value)),
        }))
    }

    /// Registered name of the contained type.
    pub fn type_name(&self) -> &'static str {
        self.0.type_name
    }

    pub fn is<T: 'static>(&self) -> bool {
        self.0.type_id == TypeId::of::<T>()
    }

    /// Run `f` with a shared borrow of the instance, if it is a `T`.
    pub fn with_ref<T: 'static, R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        if !self.is::<T>() {
            return None;
        }
        let guard = self.0.data.read();
        guard.downcast_ref::<T>().map(f)
    }

    /// Run `f` with an exclusive borrow of the instance, if it is a `T`.
    pub fn with_mut<T: 'static, R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        if !self.is::<T>() {
            return None;
        }
        let mut guard = self.0.data.write();
        guard.downcast_mut::<T>().map(f)
    }

    /// Clone the instance out, if it is a `T`.
    pub fn get<T: Clone + 'static>(&self) -> Option<T> {
        self.with_ref(T::clone)
    }

    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Object({}@{:p})", self.0.type_name, Arc::as_ptr(&self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Counter {
        count: i64,
    }

    impl NativeType for Counter {
        const NAME: &'static str = "Counter";
    }

    #[test]
    fn value_type_names() {
        assert_eq!(Value::Void.type_name(), "void");
        assert_eq!(Value::from("a").type_name(), "string");
        assert_eq!(Value::Array(vec![]).type_name(), "array");
    }

    #[test]
    fn object_identity_equality() {
        let a = ObjectRef::new(Counter { count: 1 });
        let b = ObjectRef::new(Counter { count: 1 });
        assert_eq!(Value::Object(a.clone()), Value::Object(a.clone()));
        assert_ne!(Value::Object(a), Value::Object(b));
    }

    #[test]
    fn object_borrow_and_mutate() {
        let obj = ObjectRef::new(Counter { count: 1 });
        obj.with_mut(|c: &mut Counter| c.count += 41);
        assert_eq!(obj.with_ref(|c: &Counter| c.count), Some(42));
        assert_eq!(obj.get::<Counter>(), Some(Counter { count: 42 }));
        assert_eq!(obj.with_ref(|s: &String| s.len()), None);
        assert_eq!(obj.type_name(), "Counter");
    }

    #[test]
    fn primitive_equality() {
        assert_eq!(Value::from(3), Value::Int(3));
        assert_ne!(Value::Int(3), Value::Float(3.0));
        assert_eq!(
            Value::Array(vec![Value::Char('a')]),
            Value::Array(vec![Value::Char('a')])
        );
    }
}
