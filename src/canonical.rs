//! Canonical unit names.
//!
//! A canonical name is `<Kind>_<32 hex digits>`, where the digits are a
//! 128-bit digest of the member's generic signature. It names the generated
//! unit and keys the scope's thunk cache.

use std::fmt;
use std::sync::Arc;

use fastreflect_core::{MemberDescriptor, signature_digest};

/// Marker mixed into the signature of descriptors whose accessibility was relaxed.
const ACCESSIBLE_MARKER: &str = "#accessible";

/// Content-derived identifier of one member signature.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalName(Arc<str>);

impl CanonicalName {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The `<Kind>` prefix.
    pub fn kind_prefix(&self) -> &str {
        self.0.split('_').next().unwrap_or_default()
    }
}

impl fmt::Display for CanonicalName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for CanonicalName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CanonicalName({})", self.0)
    }
}

/// Map a descriptor to its canonical name.
///
/// Deterministic across calls, threads and processes. A relaxed descriptor
/// names a different unit than its strict counterpart.
pub fn canonicalize(descriptor: &MemberDescriptor) -> CanonicalName {
    let mut signature = descriptor.generic_string();
    if descriptor.accessible {
        signature.push_str(ACCESSIBLE_MARKER);
    }
    let digest = signature_digest(&signature);
    CanonicalName(format!("{}_{:032x}", descriptor.kind.prefix(), digest).into())
}
