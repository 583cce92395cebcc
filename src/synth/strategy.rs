//! The strategy record that parameterises unit emission per member kind.

use std::fmt;

use num_enum::{IntoPrimitive, TryFromPrimitive};

/// How the resolution step finds the call target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum ResolveStrategy {
    /// Instance method lookup
    Virtual = 0,
    /// Receiver-less method lookup
    Static = 1,
    Constructor = 2,
    /// Field read accessor
    FieldRead = 3,
    /// Field write accessor; fails for immutable fields
    FieldWrite = 4,
}

impl fmt::Display for ResolveStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveStrategy::Virtual => write!(f, "virtual"),
            ResolveStrategy::Static => write!(f, "static"),
            ResolveStrategy::Constructor => write!(f, "constructor"),
            ResolveStrategy::FieldRead => write!(f, "field-read"),
            ResolveStrategy::FieldWrite => write!(f, "field-write"),
        }
    }
}

/// What happens to the target's result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultShape {
    /// Box the returned value
    Boxed,
    /// Box the newly constructed instance
    Constructed,
    /// Discard and return the void sentinel
    Void,
}

/// Arity and result handling of the direct call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallShape {
    pub arity: usize,
    pub result: ResultShape,
}

/// `{resolve strategy, call shape, receiver cast}` for one member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemberStrategy {
    pub resolve: ResolveStrategy,
    pub shape: CallShape,
    pub receiver_cast: bool,
}

impl MemberStrategy {
    pub fn new(resolve: ResolveStrategy, arity: usize, result: ResultShape, receiver_cast: bool) -> Self {
        Self {
            resolve,
            shape: CallShape { arity, result },
            receiver_cast,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_strategy_byte_round_trip() {
        for strategy in [
            ResolveStrategy::Virtual,
            ResolveStrategy::Static,
            ResolveStrategy::Constructor,
            ResolveStrategy::FieldRead,
            ResolveStrategy::FieldWrite,
        ] {
            let byte: u8 = strategy.into();
            assert_eq!(ResolveStrategy::try_from(byte).ok(), Some(strategy));
        }
        assert!(ResolveStrategy::try_from(9u8).is_err());
    }
}
