//! Conversion traits between Rust types and [`Value`].
//!
//! - [`ValueType`]: the declared [`TypeRef`] of a Rust type
//! - [`FromValue`]: extract a Rust value from a [`Value`]
//! - [`IntoValue`]: convert a Rust value into a [`Value`]
//! - [`IntoReturn`]: box a member's return value (routing `Err` to the caller unchanged)
//! - [`FromArgs`]: extract a positional argument tuple
//!
//! Registered native types get these through
//! [`native_value_traits!`](crate::native_value_traits).

use std::error::Error as StdError;

use crate::{ConversionError, InvokeError, TypeRef, Value};

/// A Rust type with a stable name on the call surface.
pub trait ValueType {
    fn type_ref() -> TypeRef;
}

/// Extract a value from an erased [`Value`].
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Result<Self, ConversionError>;
}

/// Convert a value into an erased [`Value`].
pub trait IntoValue {
    fn into_value(self) -> Value;
}

/// The return side of a registered member.
///
/// Plain values are boxed; `Result<T, E>` returns box `T` and hand `E` back
/// as [`InvokeError::Target`] without translating it.
pub trait IntoReturn {
    /// Declared return type (`T` for `Result<T, E>`).
    fn return_type() -> TypeRef;

    fn into_return(self) -> Result<Value, InvokeError>;
}

/// A positional argument tuple.
pub trait FromArgs: Sized {
    const ARITY: usize;

    fn parameter_types() -> Vec<TypeRef>;

    fn from_args(args: &[Value]) -> Result<Self, InvokeError>;
}

// ============================================================================
// Integer implementations
// ============================================================================

macro_rules! impl_int {
    ($($ty:ty),*) => {
        $(
            impl ValueType for $ty {
                fn type_ref() -> TypeRef {
                    TypeRef::named(stringify!($ty))
                }
            }

            impl FromValue for $ty {
                fn from_value(value: &Value) -> Result<Self, ConversionError> {
                    match value {
                        Value::Int(v) => <$ty>::try_from(*v).map_err(|_| {
                            ConversionError::IntegerOverflow {
                                value: *v,
                                target_type: stringify!($ty),
                            }
                        }),
                        _ => Err(ConversionError::TypeMismatch {
                            expected: "int",
                            actual: value.type_name(),
                        }),
                    }
                }
            }

            // Values above i64::MAX (only reachable for usize) saturate
            impl IntoValue for $ty {
                fn into_value(self) -> Value {
                    Value::Int(i64::try_from(self).unwrap_or(i64::MAX))
                }
            }
        )*
    };
}

impl_int!(i8, i16, i32, i64, isize, u8, u16, u32, usize);

// u64 travels bit-for-bit through i64
impl ValueType for u64 {
    fn type_ref() -> TypeRef {
        TypeRef::named("u64")
    }
}

impl FromValue for u64 {
    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        match value {
            Value::Int(v) => Ok(*v as u64),
            _ => Err(ConversionError::TypeMismatch {
                expected: "int",
                actual: value.type_name(),
            }),
        }
    }
}

impl IntoValue for u64 {
    fn into_value(self) -> Value {
        Value::Int(self as i64)
    }
}

// ============================================================================
// Float, bool, char, string
// ============================================================================

impl ValueType for f64 {
    fn type_ref() -> TypeRef {
        TypeRef::named("f64")
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        match value {
            Value::Float(v) => Ok(*v),
            Value::Int(v) => Ok(*v as f64),
            _ => Err(ConversionError::TypeMismatch {
                expected: "float",
                actual: value.type_name(),
            }),
        }
    }
}

impl IntoValue for f64 {
    fn into_value(self) -> Value {
        Value::Float(self)
    }
}

impl ValueType for f32 {
    fn type_ref() -> TypeRef {
        TypeRef::named("f32")
    }
}

impl FromValue for f32 {
    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        f64::from_value(value).map(|v| v as f32)
    }
}

impl IntoValue for f32 {
    fn into_value(self) -> Value {
        Value::Float(self as f64)
    }
}

macro_rules! impl_simple {
    ($ty:ty, $name:literal, $variant:ident, $expected:literal) => {
        impl ValueType for $ty {
            fn type_ref() -> TypeRef {
                TypeRef::named($name)
            }
        }

        impl FromValue for $ty {
            fn from_value(value: &Value) -> Result<Self, ConversionError> {
                match value {
                    Value::$variant(v) => Ok(v.clone()),
                    _ => Err(ConversionError::TypeMismatch {
                        expected: $expected,
                        actual: value.type_name(),
                    }),
                }
            }
        }

        impl IntoValue for $ty {
            fn into_value(self) -> Value {
                Value::$variant(self)
            }
        }
    };
}

impl_simple!(bool, "bool", Bool, "bool");
impl_simple!(char, "char", Char, "char");
impl_simple!(String, "String", Str, "string");

impl ValueType for () {
    fn type_ref() -> TypeRef {
        TypeRef::void()
    }
}

impl FromValue for () {
    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        match value {
            Value::Void | Value::Null => Ok(()),
            _ => Err(ConversionError::TypeMismatch {
                expected: "void",
                actual: value.type_name(),
            }),
        }
    }
}

impl IntoValue for () {
    fn into_value(self) -> Value {
        Value::Void
    }
}

// Value passes through untouched
impl ValueType for Value {
    fn type_ref() -> TypeRef {
        TypeRef::named("Value")
    }
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        Ok(value.clone())
    }
}

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

// ============================================================================
// Containers
// ============================================================================

impl<T: ValueType> ValueType for Vec<T> {
    fn type_ref() -> TypeRef {
        TypeRef::owned(format!("Vec<{}>", T::type_ref()))
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        match value {
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(index, item)| {
                    T::from_value(item).map_err(|source| ConversionError::Element {
                        index,
                        source: Box::new(source),
                    })
                })
                .collect(),
            _ => Err(ConversionError::TypeMismatch {
                expected: "array",
                actual: value.type_name(),
            }),
        }
    }
}

impl<T: IntoValue> IntoValue for Vec<T> {
    fn into_value(self) -> Value {
        Value::Array(self.into_iter().map(IntoValue::into_value).collect())
    }
}

impl<T: ValueType> ValueType for Option<T> {
    fn type_ref() -> TypeRef {
        TypeRef::owned(format!("Option<{}>", T::type_ref()))
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: IntoValue> IntoValue for Option<T> {
    fn into_value(self) -> Value {
        match self {
            Some(v) => v.into_value(),
            None => Value::Null,
        }
    }
}

// ============================================================================
// Return values
// ============================================================================

macro_rules! impl_into_return {
    ($($ty:ty),*) => {
        $(
            impl IntoReturn for $ty {
                fn return_type() -> TypeRef {
                    <$ty as ValueType>::type_ref()
                }

                fn into_return(self) -> Result<Value, InvokeError> {
                    Ok(self.into_value())
                }
            }
        )*
    };
}

impl_into_return!(
    (), bool, char, String, Value, f32, f64, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize
);

impl<T: IntoValue + ValueType> IntoReturn for Vec<T> {
    fn return_type() -> TypeRef {
        <Vec<T> as ValueType>::type_ref()
    }

    fn into_return(self) -> Result<Value, InvokeError> {
        Ok(self.into_value())
    }
}

impl<T: IntoValue + ValueType> IntoReturn for Option<T> {
    fn return_type() -> TypeRef {
        <Option<T> as ValueType>::type_ref()
    }

    fn into_return(self) -> Result<Value, InvokeError> {
        Ok(self.into_value())
    }
}

impl<T, E> IntoReturn for Result<T, E>
where
    T: IntoReturn,
    E: StdError + Send + Sync + 'static,
{
    fn return_type() -> TypeRef {
        T::return_type()
    }

    fn into_return(self) -> Result<Value, InvokeError> {
        match self {
            Ok(v) => v.into_return(),
            Err(e) => Err(InvokeError::Target(Box::new(e))),
        }
    }
}

// ============================================================================
// Argument tuples
// ============================================================================

macro_rules! impl_from_args {
    ($count:expr; $($ty:ident => $idx:tt),*) => {
        impl<$($ty: FromValue + ValueType),*> FromArgs for ($($ty,)*) {
            const ARITY: usize = $count;

            fn parameter_types() -> Vec<TypeRef> {
                vec![$($ty::type_ref()),*]
            }

            #[allow(unused_variables)]
            fn from_args(args: &[Value]) -> Result<Self, InvokeError> {
                if args.len() != $count {
                    return Err(InvokeError::Arity {
                        expected: $count,
                        actual: args.len(),
                    });
                }
                Ok(($(
                    $ty::from_value(&args[$idx])
                        .map_err(|source| InvokeError::Argument { index: $idx, source })?,
                )*))
            }
        }
    };
}

impl_from_args!(0;);
impl_from_args!(1; A => 0);
impl_from_args!(2; A => 0, B => 1);
impl_from_args!(3; A => 0, B => 1, C => 2);
impl_from_args!(4; A => 0, B => 1, C => 2, D => 3);
impl_from_args!(5; A => 0, B => 1, C => 2, D => 3, E => 4);
impl_from_args!(6; A => 0, B => 1, C => 2, D => 3, E => 4, F => 5);
impl_from_args!(7; A => 0, B => 1, C => 2, D => 3, E => 4, F => 5, G => 6);
impl_from_args!(8; A => 0, B => 1, C => 2, D => 3, E => 4, F => 5, G => 6, H => 7);

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================================================
    // Scalars
    // ========================================================================

    #[test]
    fn int_narrowing_checks_range() {
        assert_eq!(i8::from_value(&Value::Int(127)), Ok(127));
        assert_eq!(
            i8::from_value(&Value::Int(128)),
            Err(ConversionError::IntegerOverflow {
                value: 128,
                target_type: "i8"
            })
        );
        assert!(u32::from_value(&Value::Int(-1)).is_err());
        assert_eq!(u64::from_value(&Value::Int(-1)), Ok(u64::MAX));
    }

    #[test]
    fn wide_unsigned_saturates() {
        assert_eq!(u32::MAX.into_value(), Value::Int(i64::from(u32::MAX)));
        assert_eq!(u32::from_value(&u32::MAX.into_value()), Ok(u32::MAX));
        if usize::BITS >= 64 {
            assert_eq!(usize::MAX.into_value(), Value::Int(i64::MAX));
            assert!(usize::from_value(&usize::MAX.into_value()).is_ok());
        }
        assert_eq!((-5isize).into_value(), Value::Int(-5));
    }

    #[test]
    fn type_mismatch_reports_variant() {
        assert_eq!(
            bool::from_value(&Value::Int(1)),
            Err(ConversionError::TypeMismatch {
                expected: "bool",
                actual: "int"
            })
        );
    }

    #[test]
    fn float_accepts_ints() {
        assert_eq!(f64::from_value(&Value::Int(2)), Ok(2.0));
        assert_eq!(f32::from_value(&Value::Float(0.5)), Ok(0.5));
    }

    // ========================================================================
    // Containers
    // ========================================================================

    #[test]
    fn vec_of_chars() {
        let value = Value::Array(vec![Value::Char('a'), Value::Char('b')]);
        assert_eq!(Vec::<char>::from_value(&value), Ok(vec!['a', 'b']));
        assert_eq!(vec!['a', 'b'].into_value(), value);
    }

    #[test]
    fn vec_element_error_carries_index() {
        let value = Value::Array(vec![Value::Char('a'), Value::Int(1)]);
        assert!(matches!(
            Vec::<char>::from_value(&value),
            Err(ConversionError::Element { index: 1, .. })
        ));
    }

    #[test]
    fn option_maps_null() {
        assert_eq!(Option::<i32>::from_value(&Value::Null), Ok(None));
        assert_eq!(Option::<i32>::from_value(&Value::Int(4)), Ok(Some(4)));
        assert_eq!(None::<i32>.into_value(), Value::Null);
    }

    // ========================================================================
    // Returns and arguments
    // ========================================================================

    #[test]
    fn result_error_passes_through() {
        let ok: Result<i32, std::num::ParseIntError> = Ok(5);
        assert_eq!(ok.into_return().ok(), Some(Value::Int(5)));

        let err: Result<i32, _> = "nope".parse::<i32>();
        let returned = err.into_return();
        assert!(matches!(returned, Err(InvokeError::Target(_))));
        assert_eq!(<Result<i32, std::num::ParseIntError>>::return_type(), TypeRef::of::<i32>());
    }

    #[test]
    fn unit_returns_void() {
        assert_eq!(().into_return().ok(), Some(Value::Void));
    }

    #[test]
    fn from_args_checks_arity() {
        let args = [Value::from("a")];
        assert!(matches!(
            <(String, String)>::from_args(&args),
            Err(InvokeError::Arity {
                expected: 2,
                actual: 1
            })
        ));
        assert_eq!(<(String,)>::from_args(&args).ok(), Some(("a".to_string(),)));
        assert!(<()>::from_args(&[]).is_ok());
    }

    #[test]
    fn from_args_reports_argument_index() {
        let args = [Value::from("a"), Value::Bool(true)];
        let err = <(String, String)>::from_args(&args).err();
        assert!(matches!(err, Some(InvokeError::Argument { index: 1, .. })));
    }

    #[test]
    fn parameter_types_in_order() {
        assert_eq!(
            <(String, Vec<char>, i32)>::parameter_types(),
            vec![
                TypeRef::named("String"),
                TypeRef::named("Vec<char>"),
                TypeRef::named("i32")
            ]
        );
        assert_eq!(<(String,)>::ARITY, 1);
    }
}
