use fastreflect_core::{MemberKind, TypeRef};

use super::{FastExecutable, FastMember, Thunk, thunk_facade};

/// A resolved method, instance or static.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FastMethod {
    thunk: Thunk,
}

thunk_facade!(FastMethod, MemberKind::Method);

impl FastMethod {
    pub fn return_type(&self) -> &TypeRef {
        &self.thunk.descriptor().return_type
    }
}

impl FastMember for FastMethod {
    fn thunk(&self) -> &Thunk {
        &self.thunk
    }
}

impl FastExecutable for FastMethod {}
