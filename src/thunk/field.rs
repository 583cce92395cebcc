use std::fmt;

use fastreflect_core::{AccessError, InvokeError, MemberKind, ReflectError, TypeRef, Value};

use super::{FastExecutable, FastMember, Thunk, thunk_facade};

/// Resolved read accessor of a field: a method with no parameters returning
/// the field type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldGetter {
    thunk: Thunk,
}

thunk_facade!(FieldGetter, MemberKind::FieldGetter);

impl FieldGetter {
    /// Read the field. Static fields ignore `target`.
    pub fn get(&self, target: Option<&Value>) -> Result<Value, ReflectError> {
        Ok(self.thunk.call(target, &[])?)
    }

    pub fn field_type(&self) -> &TypeRef {
        &self.thunk.descriptor().return_type
    }

    pub fn return_type(&self) -> &TypeRef {
        self.field_type()
    }
}

impl FastMember for FieldGetter {
    fn thunk(&self) -> &Thunk {
        &self.thunk
    }
}

impl FastExecutable for FieldGetter {}

/// Resolved write accessor of a field: a method taking the field type and
/// returning `()`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldSetter {
    thunk: Thunk,
}

thunk_facade!(FieldSetter, MemberKind::FieldSetter);

impl FieldSetter {
    /// Write the field. Static fields ignore `target`.
    pub fn set(&self, target: Option<&Value>, value: Value) -> Result<(), ReflectError> {
        self.thunk.call(target, std::slice::from_ref(&value))?;
        Ok(())
    }

    pub fn field_type(&self) -> &TypeRef {
        let desc = self.thunk.descriptor();
        desc.parameter_types.first().unwrap_or(&desc.return_type)
    }

    /// Always `()`.
    pub fn return_type(&self) -> &TypeRef {
        &self.thunk.descriptor().return_type
    }
}

impl FastMember for FieldSetter {
    fn thunk(&self) -> &Thunk {
        &self.thunk
    }
}

impl FastExecutable for FieldSetter {}

/// A field: its getter plus, unless the field is final, its setter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FastField {
    getter: FieldGetter,
    setter: Option<FieldSetter>,
}

impl FastField {
    pub(crate) fn new(getter: FieldGetter, setter: Option<FieldSetter>) -> Self {
        Self { getter, setter }
    }

    pub fn getter(&self) -> &FieldGetter {
        &self.getter
    }

    pub fn setter(&self) -> Option<&FieldSetter> {
        self.setter.as_ref()
    }

    pub fn is_final(&self) -> bool {
        self.setter.is_none()
    }

    pub fn field_type(&self) -> &TypeRef {
        self.getter.field_type()
    }

    pub fn get(&self, target: Option<&Value>) -> Result<Value, ReflectError> {
        self.getter.get(target)
    }

    /// Write the field; fails with [`AccessError::ImmutableField`] when final.
    pub fn set(&self, target: Option<&Value>, value: Value) -> Result<(), ReflectError> {
        match &self.setter {
            Some(setter) => setter.set(target, value),
            None => Err(AccessError::ImmutableField {
                field: self.getter.descriptor().generic_string(),
            }
            .into()),
        }
    }
}

impl FastMember for FastField {
    fn thunk(&self) -> &Thunk {
        &self.getter.thunk
    }

    /// No arguments reads the field, one argument writes it.
    fn invoke(&self, target: Option<&Value>, args: &[Value]) -> Result<Value, ReflectError> {
        match args {
            [] => self.get(target),
            [value] => self.set(target, value.clone()).map(|()| Value::Void),
            _ => Err(InvokeError::Arity {
                expected: 1,
                actual: args.len(),
            }
            .into()),
        }
    }
}

impl fmt::Display for FastField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.getter, f)
    }
}
