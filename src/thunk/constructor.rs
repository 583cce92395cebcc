use fastreflect_core::{MemberKind, ReflectError, TypeRef, Value};

use super::{FastExecutable, FastMember, Thunk, thunk_facade};

/// A resolved constructor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FastConstructor {
    thunk: Thunk,
}

thunk_facade!(FastConstructor, MemberKind::Constructor);

impl FastConstructor {
    /// Construct a new instance of the declaring type.
    pub fn new_instance(&self, args: &[Value]) -> Result<Value, ReflectError> {
        Ok(self.thunk.call(None, args)?)
    }

    /// The constructed type.
    pub fn instance_type(&self) -> &TypeRef {
        &self.thunk.descriptor().return_type
    }
}

impl FastMember for FastConstructor {
    fn thunk(&self) -> &Thunk {
        &self.thunk
    }

    fn invoke(&self, _target: Option<&Value>, args: &[Value]) -> Result<Value, ReflectError> {
        self.new_instance(args)
    }
}

impl FastExecutable for FastConstructor {}
