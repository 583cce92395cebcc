//! Named references to reflected types.

use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::TypeHash;
use crate::convert::ValueType;

/// A reference to a type by its qualified name.
///
/// Equality and hashing use the name hash only.
#[derive(Clone)]
pub struct TypeRef {
    name: Cow<'static, str>,
    hash: TypeHash,
}

impl TypeRef {
    /// Reference a type by a static name.
    pub fn named(name: &'static str) -> Self {
        Self {
            hash: TypeHash::from_name(name),
            name: Cow::Borrowed(name),
        }
    }

    /// Reference a type by a computed name (e.g. `Vec<String>`).
    pub fn owned(name: String) -> Self {
        Self {
            hash: TypeHash::from_name(&name),
            name: Cow::Owned(name),
        }
    }

    /// The reference for a Rust type usable on the call surface.
    pub fn of<T: ValueType>() -> Self {
        T::type_ref()
    }

    /// The unit type, used as the return type of void members.
    pub fn void() -> Self {
        Self::named("()")
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn hash(&self) -> TypeHash {
        self.hash
    }

    /// Last path segment of the name (`geo::Point` -> `Point`).
    pub fn simple_name(&self) -> &str {
        let base = self.name.split('<').next().unwrap_or(&self.name);
        match base.rfind("::") {
            Some(idx) => &self.name[idx + 2..],
            None => &self.name,
        }
    }

    pub fn is_void(&self) -> bool {
        self.name == "()"
    }
}

impl PartialEq for TypeRef {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
    }
}

impl Eq for TypeRef {}

impl Hash for TypeRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.hash.hash(state);
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl fmt::Debug for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeRef({})", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_by_name() {
        assert_eq!(TypeRef::named("String"), TypeRef::owned("String".to_string()));
        assert_ne!(TypeRef::named("String"), TypeRef::named("Integer"));
    }

    #[test]
    fn simple_name_strips_path() {
        assert_eq!(TypeRef::named("geo::Point").simple_name(), "Point");
        assert_eq!(TypeRef::named("Point").simple_name(), "Point");
        assert_eq!(TypeRef::named("geo::Grid<geo::Cell>").simple_name(), "Grid<geo::Cell>");
    }

    #[test]
    fn of_primitive() {
        assert_eq!(TypeRef::of::<i32>().name(), "i32");
        assert_eq!(TypeRef::of::<Vec<String>>().name(), "Vec<String>");
        assert!(TypeRef::of::<()>().is_void());
    }
}
