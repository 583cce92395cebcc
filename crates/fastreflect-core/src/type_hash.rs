//! Deterministic hash-based identity for reflected types and members.
//!
//! [`TypeHash`] is a 64-bit hash computed from a type name, or from a member's
//! owner, name and parameter types. Hashes are computed rather than allocated,
//! so a descriptor built before a type is registered still matches it later.
//!
//! Signature digests used for generated unit names are wider (128 bits) and
//! come from [`signature_digest`].
//!
//! # Examples
//!
//! ```
//! use fastreflect_core::TypeHash;
//!
//! let a = TypeHash::from_name("String");
//! let b = TypeHash::from_name("String");
//! assert_eq!(a, b);
//!
//! let m1 = TypeHash::from_method(a, "concat", &[a], false);
//! let m2 = TypeHash::from_method(a, "concat", &[], false);
//! assert_ne!(m1, m2);
//! ```

use std::fmt;
use xxhash_rust::xxh3::xxh3_128;
use xxhash_rust::xxh64::xxh64;

/// Domain-specific mixing constants.
///
/// Different entity kinds hash into different domains even when they share a name.
pub mod hash_constants {
    /// Separator constant for parameter mixing
    pub const SEP: u64 = 0x4bc94d6bd06053ad;

    /// Domain marker for type hashes
    pub const TYPE: u64 = 0x2fac10b63a6cc57c;

    /// Domain marker for instance method hashes
    pub const METHOD: u64 = 0x7d3c8b4a92e15f6d;

    /// Domain marker for static method hashes
    pub const STATIC_METHOD: u64 = 0x5ea77ffbcdf5f302;

    /// Domain marker for constructor hashes
    pub const CONSTRUCTOR: u64 = 0x9a7f3d5e2b8c4601;

    /// Domain marker for field hashes
    pub const FIELD: u64 = 0x1a095090689d4647;

    /// Per-position parameter markers, so `(a, b)` and `(b, a)` hash differently.
    pub const PARAM_MARKERS: [u64; 16] = [
        0x9e3779b97f4a7c15,
        0xbf58476d1ce4e5b9,
        0x94d049bb133111eb,
        0xd6e8feb86659fd93,
        0xe7037ed1a0b428db,
        0xc6a4a7935bd1e995,
        0x8648dbbc94d49b8d,
        0xa2b48b2c69e0d657,
        0x7c3e9f2a5b8d1403,
        0x5d8c7b4a3e9f2106,
        0x3f1e9d8c7b5a4203,
        0x1a2b3c4d5e6f7089,
        0x9f8e7d6c5b4a3210,
        0x2468ace013579bdf,
        0xfdb97531eca86420,
        0x123456789abcdef0,
    ];
}

/// A deterministic 64-bit hash identifying a type or member.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TypeHash(pub u64);

impl TypeHash {
    /// Empty/invalid hash constant.
    pub const EMPTY: TypeHash = TypeHash(0);

    /// Hash of a fully qualified type name.
    #[inline]
    pub fn from_name(name: &str) -> Self {
        TypeHash(hash_constants::TYPE ^ xxh64(name.as_bytes(), 0))
    }

    /// Hash of a method on `owner`, including parameter order.
    ///
    /// Static and instance methods with the same name and parameters hash apart.
    #[inline]
    pub fn from_method(owner: TypeHash, name: &str, params: &[TypeHash], is_static: bool) -> Self {
        let domain = if is_static {
            hash_constants::STATIC_METHOD
        } else {
            hash_constants::METHOD
        };
        mix_params(domain ^ owner.0 ^ xxh64(name.as_bytes(), 0), params)
    }

    /// Hash of a constructor on `owner`. Constructors are identified by owner and parameters.
    #[inline]
    pub fn from_constructor(owner: TypeHash, params: &[TypeHash]) -> Self {
        mix_params(hash_constants::CONSTRUCTOR ^ owner.0, params)
    }

    /// Hash of a field on `owner`.
    #[inline]
    pub fn from_field(owner: TypeHash, name: &str) -> Self {
        TypeHash(hash_constants::FIELD ^ owner.0 ^ xxh64(name.as_bytes(), 0))
    }

    /// Check if this is an empty/invalid hash.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Get the underlying u64 value.
    #[inline]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

fn mix_params(seed: u64, params: &[TypeHash]) -> TypeHash {
    let mut hash = seed;
    for (i, param) in params.iter().enumerate() {
        let marker = hash_constants::PARAM_MARKERS
            .get(i)
            .copied()
            .unwrap_or_else(|| hash_constants::PARAM_MARKERS[0].wrapping_add(i as u64));
        // wrapping_mul keeps parameter order significant
        hash = hash.wrapping_mul(hash_constants::SEP).wrapping_add(marker ^ param.0);
    }
    TypeHash(hash)
}

/// 128-bit content digest of a signature string.
#[inline]
pub fn signature_digest(signature: &str) -> u128 {
    xxh3_128(signature.as_bytes())
}

impl fmt::Debug for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeHash({:#018x})", self.0)
    }
}

impl fmt::Display for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_hash_determinism() {
        assert_eq!(TypeHash::from_name("String"), TypeHash::from_name("String"));
        assert_ne!(TypeHash::from_name("String"), TypeHash::from_name("Integer"));
    }

    #[test]
    fn method_hash_parameter_order_matters() {
        let owner = TypeHash::from_name("Point");
        let int = TypeHash::from_name("i64");
        let float = TypeHash::from_name("f64");
        let a = TypeHash::from_method(owner, "scale", &[int, float], false);
        let b = TypeHash::from_method(owner, "scale", &[float, int], false);
        assert_ne!(a, b);
    }

    #[test]
    fn static_and_instance_methods_differ() {
        let owner = TypeHash::from_name("Point");
        let a = TypeHash::from_method(owner, "origin", &[], false);
        let b = TypeHash::from_method(owner, "origin", &[], true);
        assert_ne!(a, b);
    }

    #[test]
    fn constructor_and_field_domains_are_distinct() {
        let owner = TypeHash::from_name("Point");
        assert_ne!(
            TypeHash::from_constructor(owner, &[]),
            TypeHash::from_method(owner, "new", &[], true)
        );
        assert_ne!(
            TypeHash::from_field(owner, "x"),
            TypeHash::from_field(owner, "y")
        );
    }

    #[test]
    fn many_parameters_do_not_panic() {
        let owner = TypeHash::from_name("Wide");
        let params: Vec<_> = (0..40).map(|i| TypeHash(i)).collect();
        let hash = TypeHash::from_method(owner, "f", &params, false);
        assert!(!hash.is_empty());
    }

    #[test]
    fn signature_digest_is_stable() {
        let a = signature_digest("public fn String::len(&self) -> usize");
        let b = signature_digest("public fn String::len(&self) -> usize");
        let c = signature_digest("public fn String::len(&self) -> u64");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn display_format() {
        let hash = TypeHash(0x1234);
        assert_eq!(format!("{}", hash), "0x0000000000001234");
        assert_eq!(format!("{:?}", hash), "TypeHash(0x0000000000001234)");
    }
}
