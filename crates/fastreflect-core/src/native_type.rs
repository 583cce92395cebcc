//! Registration marker for Rust types exposed through reflection.

use std::any::Any;

/// A Rust type that can be registered with a type registry and carried in
/// [`Value::Object`](crate::Value::Object).
///
/// The value-conversion traits for such a type come from
/// [`native_value_traits!`](crate::native_value_traits) (or the derive macro).
pub trait NativeType: Any + Send + Sync + Sized {
    /// Fully qualified registered name.
    const NAME: &'static str;
}

impl NativeType for String {
    const NAME: &'static str = "String";
}

/// Implement [`ValueType`](crate::ValueType), [`FromValue`](crate::FromValue),
/// [`IntoValue`](crate::IntoValue) and [`IntoReturn`](crate::IntoReturn) for
/// a [`NativeType`] that is carried as an object.
///
/// Extraction clones the instance out of the object, so the type must be `Clone`.
#[macro_export]
macro_rules! native_value_traits {
    ($ty:ty) => {
        impl $crate::ValueType for $ty {
            fn type_ref() -> $crate::TypeRef {
                $crate::TypeRef::named(<$ty as $crate::NativeType>::NAME)
            }
        }

        impl $crate::FromValue for $ty {
            fn from_value(value: &$crate::Value) -> Result<Self, $crate::ConversionError> {
                match value {
                    $crate::Value::Object(obj) => {
                        obj.get::<$ty>()
                            .ok_or_else(|| $crate::ConversionError::ObjectMismatch {
                                expected: <$ty as $crate::NativeType>::NAME,
                                actual: obj.type_name().to_string(),
                            })
                    }
                    $crate::Value::Null => Err($crate::ConversionError::NullValue {
                        target_type: <$ty as $crate::NativeType>::NAME,
                    }),
                    other => Err($crate::ConversionError::TypeMismatch {
                        expected: "object",
                        actual: other.type_name(),
                    }),
                }
            }
        }

        impl $crate::IntoValue for $ty {
            fn into_value(self) -> $crate::Value {
                $crate::Value::object(self)
            }
        }

        impl $crate::IntoReturn for $ty {
            fn return_type() -> $crate::TypeRef {
                <$ty as $crate::ValueType>::type_ref()
            }

            fn into_return(self) -> Result<$crate::Value, $crate::InvokeError> {
                Ok($crate::IntoValue::into_value(self))
            }
        }
    };
}
