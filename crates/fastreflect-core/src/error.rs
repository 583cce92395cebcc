//! Error types shared by every layer of the reflection stack.

use std::error::Error as StdError;
use std::sync::Arc;

use thiserror::Error;

use crate::Visibility;

/// Errors converting between [`Value`](crate::Value)s and Rust types.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConversionError {
    /// Type mismatch during conversion
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    /// Object value of the wrong registered type
    #[error("object mismatch: expected {expected}, got {actual}")]
    ObjectMismatch { expected: &'static str, actual: String },

    /// Null where a non-nullable type was expected
    #[error("null value cannot be converted to {target_type}")]
    NullValue { target_type: &'static str },

    /// Integer overflow during narrowing
    #[error("integer overflow: value {value} does not fit in {target_type}")]
    IntegerOverflow { value: i64, target_type: &'static str },

    /// Element conversion failed inside an array
    #[error("array element {index}: {source}")]
    Element {
        index: usize,
        #[source]
        source: Box<ConversionError>,
    },

    /// Generic conversion failure
    #[error("conversion failed: {message}")]
    Failed { message: String },
}

/// Errors locating a member through the host reflection facility.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum LookupError {
    #[error("unknown type '{name}'")]
    UnknownType { name: String },

    #[error("no such member: {member}")]
    NoSuchMember { member: String },

    #[error("{member} is {visibility} and its accessibility was not relaxed")]
    Inaccessible { member: String, visibility: Visibility },

    #[error("field '{field}' has no write accessor")]
    NoWriteAccessor { field: String },

    #[error("signature mismatch for {member}: expected {expected}, found {found}")]
    SignatureMismatch {
        member: String,
        expected: String,
        found: String,
    },
}

/// The underlying reason a generated unit could not be resolved.
#[derive(Debug, Error, PartialEq)]
pub enum ResolutionCause {
    #[error(transparent)]
    Lookup(#[from] LookupError),

    /// Load-time checks rejected the generated code
    #[error("generated code rejected: {0}")]
    Verification(String),
}

/// A permanent failure binding a generated unit to its call target.
///
/// Cloning shares the cause; every later use of the unit reports the very
/// same cause instance (see [`ResolutionError::same_cause`]).
#[derive(Debug, Clone, Error)]
#[error("failed to resolve unit {unit}: {cause}")]
pub struct ResolutionError {
    unit: String,
    #[source]
    cause: Arc<ResolutionCause>,
}

impl ResolutionError {
    pub fn new(unit: impl Into<String>, cause: impl Into<ResolutionCause>) -> Self {
        Self {
            unit: unit.into(),
            cause: Arc::new(cause.into()),
        }
    }

    /// Name of the unit that failed to resolve.
    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn cause(&self) -> &ResolutionCause {
        &self.cause
    }

    /// True when both errors carry the same cause instance.
    pub fn same_cause(&self, other: &ResolutionError) -> bool {
        Arc::ptr_eq(&self.cause, &other.cause)
    }
}

/// Access violations detected by a facade before calling anything.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AccessError {
    #[error("field '{field}' is immutable and cannot be written")]
    ImmutableField { field: String },
}

/// Errors raised while invoking a resolved thunk.
#[derive(Debug, Error)]
pub enum InvokeError {
    #[error("expected {expected} arguments, got {actual}")]
    Arity { expected: usize, actual: usize },

    #[error("instance member invoked without a receiver")]
    NullReceiver,

    #[error("receiver type mismatch: expected {expected}, got {actual}")]
    ReceiverMismatch { expected: &'static str, actual: String },

    /// Mutating members need a shared object receiver
    #[error("receiver of type {actual} cannot be borrowed mutably")]
    ReceiverNotMutable { actual: &'static str },

    #[error("argument {index}: {source}")]
    Argument {
        index: usize,
        #[source]
        source: ConversionError,
    },

    /// A failure raised by the call target itself, carried unchanged.
    #[error("{0}")]
    Target(Box<dyn StdError + Send + Sync + 'static>),
}

impl InvokeError {
    pub fn target<E: StdError + Send + Sync + 'static>(error: E) -> Self {
        InvokeError::Target(Box::new(error))
    }

    /// The target-raised error, if it is an `E`.
    pub fn target_error<E: StdError + 'static>(&self) -> Option<&E> {
        match self {
            InvokeError::Target(inner) => inner.downcast_ref::<E>(),
            _ => None,
        }
    }

    pub fn is_target(&self) -> bool {
        matches!(self, InvokeError::Target(_))
    }
}

/// Umbrella error for the public facade API.
#[derive(Debug, Error)]
pub enum ReflectError {
    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Access(#[from] AccessError),

    #[error(transparent)]
    Invoke(#[from] InvokeError),

    #[error(transparent)]
    Conversion(#[from] ConversionError),

    #[error("expected a {expected} descriptor, got {found}")]
    KindMismatch {
        expected: crate::MemberKind,
        found: crate::MemberKind,
    },
}

impl ReflectError {
    /// The target-raised error, if this wraps one of type `E`.
    pub fn target_error<E: StdError + 'static>(&self) -> Option<&E> {
        match self {
            ReflectError::Invoke(inner) => inner.target_error(),
            _ => None,
        }
    }

    pub fn as_resolution(&self) -> Option<&ResolutionError> {
        match self {
            ReflectError::Resolution(inner) => Some(inner),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversion_error_type_mismatch() {
        let err = ConversionError::TypeMismatch {
            expected: "int",
            actual: "string",
        };
        assert!(err.to_string().contains("type mismatch"));
        assert!(err.to_string().contains("int"));
    }

    #[test]
    fn resolution_error_clones_share_cause() {
        let err = ResolutionError::new(
            "Method_00",
            LookupError::NoSuchMember {
                member: "gone".into(),
            },
        );
        let copy = err.clone();
        assert!(err.same_cause(&copy));

        let other = ResolutionError::new(
            "Method_00",
            LookupError::NoSuchMember {
                member: "gone".into(),
            },
        );
        assert!(!err.same_cause(&other));
        assert_eq!(err.cause(), other.cause());
    }

    #[test]
    fn invoke_error_target_downcast() {
        let parse_err = "x".parse::<i32>().unwrap_err();
        let err = InvokeError::target(parse_err.clone());
        assert_eq!(err.target_error::<std::num::ParseIntError>(), Some(&parse_err));
        assert!(err.target_error::<std::fmt::Error>().is_none());

        let wrapped = ReflectError::from(err);
        assert_eq!(wrapped.target_error::<std::num::ParseIntError>(), Some(&parse_err));
    }
}
