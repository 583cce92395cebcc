//! Member descriptors: the immutable description of one reflected member.

use std::fmt;
use std::hash::{Hash, Hasher};

use bitflags::bitflags;

use crate::{Specialization, TypeHash, TypeRef, Visibility};

/// The four kinds of reflected member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    Method,
    Constructor,
    FieldGetter,
    FieldSetter,
}

impl MemberKind {
    /// Prefix used in canonical unit names.
    pub fn prefix(self) -> &'static str {
        match self {
            MemberKind::Method => "Method",
            MemberKind::Constructor => "Constructor",
            MemberKind::FieldGetter => "FieldGetter",
            MemberKind::FieldSetter => "FieldSetter",
        }
    }

    pub fn is_field(self) -> bool {
        matches!(self, MemberKind::FieldGetter | MemberKind::FieldSetter)
    }
}

impl fmt::Display for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberKind::Method => write!(f, "method"),
            MemberKind::Constructor => write!(f, "constructor"),
            MemberKind::FieldGetter => write!(f, "field getter"),
            MemberKind::FieldSetter => write!(f, "field setter"),
        }
    }
}

bitflags! {
    /// Member modifiers.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        /// No receiver; lookup is static rather than virtual
        const STATIC = 0x01;
        /// Field with no write accessor
        const FINAL = 0x02;
        /// Trailing parameter is a packed sequence
        const VARARGS = 0x04;
        /// Instance method taking `&mut self`
        const MUT_RECEIVER = 0x08;
    }
}

/// Immutable description of a reflected member.
///
/// `return_type` is the constructed type for constructors, the field type for
/// getters and `()` for setters. `accessible` records a relaxed accessibility
/// override. Equality and hashing ignore `specialization`, which is fully
/// determined by the rest of the signature.
#[derive(Clone)]
pub struct MemberDescriptor {
    pub declaring_type: TypeRef,
    pub kind: MemberKind,
    pub name: String,
    pub parameter_types: Vec<TypeRef>,
    pub return_type: TypeRef,
    pub visibility: Visibility,
    pub modifiers: Modifiers,
    pub accessible: bool,
    pub specialization: Specialization,
}

impl MemberDescriptor {
    pub fn is_static(&self) -> bool {
        self.modifiers.contains(Modifiers::STATIC)
    }

    pub fn is_var_args(&self) -> bool {
        self.modifiers.contains(Modifiers::VARARGS)
    }

    pub fn is_final(&self) -> bool {
        self.modifiers.contains(Modifiers::FINAL)
    }

    pub fn arity(&self) -> usize {
        self.parameter_types.len()
    }

    /// Copy of this descriptor with the accessibility override set.
    pub fn with_accessible(&self, accessible: bool) -> Self {
        Self {
            accessible,
            ..self.clone()
        }
    }

    /// Lookup key of the member within its declaring type.
    ///
    /// Getter and setter of the same field share a key.
    pub fn member_hash(&self) -> TypeHash {
        let owner = self.declaring_type.hash();
        let params: Vec<TypeHash> = self.parameter_types.iter().map(TypeRef::hash).collect();
        match self.kind {
            MemberKind::Method => TypeHash::from_method(owner, &self.name, &params, self.is_static()),
            MemberKind::Constructor => TypeHash::from_constructor(owner, &params),
            MemberKind::FieldGetter | MemberKind::FieldSetter => TypeHash::from_field(owner, &self.name),
        }
    }

    /// Fully qualified generic signature.
    ///
    /// ```text
    /// public fn String::starts_with(&self, String) -> bool
    /// public fn Counter::add(&mut self, i64)
    /// public fn String::join(String, Vec<String>...) -> String
    /// public new String::from_chars(Vec<char>) -> String
    /// public static final Integer::SIZE: i32
    /// public Point::x: i64
    /// ```
    pub fn generic_string(&self) -> String {
        let mut out = format!("{} ", self.visibility);
        match self.kind {
            MemberKind::Method | MemberKind::Constructor => {
                out.push_str(if self.kind == MemberKind::Constructor { "new " } else { "fn " });
                out.push_str(&format!("{}::{}(", self.declaring_type, self.name));
                let mut parts = Vec::with_capacity(self.parameter_types.len() + 1);
                if self.kind == MemberKind::Method && !self.is_static() {
                    if self.modifiers.contains(Modifiers::MUT_RECEIVER) {
                        parts.push("&mut self".to_string());
                    } else {
                        parts.push("&self".to_string());
                    }
                }
                let last = self.parameter_types.len().saturating_sub(1);
                for (i, param) in self.parameter_types.iter().enumerate() {
                    if self.is_var_args() && i == last {
                        parts.push(format!("{}...", param));
                    } else {
                        parts.push(param.to_string());
                    }
                }
                out.push_str(&parts.join(", "));
                out.push(')');
                if !self.return_type.is_void() {
                    out.push_str(&format!(" -> {}", self.return_type));
                }
            }
            MemberKind::FieldGetter | MemberKind::FieldSetter => {
                if self.is_static() {
                    out.push_str("static ");
                }
                if self.is_final() {
                    out.push_str("final ");
                }
                let field_type = match self.kind {
                    MemberKind::FieldSetter => self.parameter_types.first().unwrap_or(&self.return_type),
                    _ => &self.return_type,
                };
                out.push_str(&format!("{}::{}: {}", self.declaring_type, self.name, field_type));
            }
        }
        out
    }
}

impl PartialEq for MemberDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.declaring_type == other.declaring_type
            && self.kind == other.kind
            && self.name == other.name
            && self.parameter_types == other.parameter_types
            && self.return_type == other.return_type
            && self.visibility == other.visibility
            && self.modifiers == other.modifiers
            && self.accessible == other.accessible
    }
}

impl Eq for MemberDescriptor {}

impl Hash for MemberDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Hash::hash(&self.declaring_type, state);
        self.kind.hash(state);
        self.name.hash(state);
        self.parameter_types.hash(state);
        Hash::hash(&self.return_type, state);
        self.visibility.hash(state);
        self.modifiers.hash(state);
        self.accessible.hash(state);
    }
}

impl fmt::Display for MemberDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.generic_string())
    }
}

impl fmt::Debug for MemberDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemberDescriptor")
            .field("kind", &self.kind)
            .field("signature", &self.generic_string())
            .field("accessible", &self.accessible)
            .finish()
    }
}
