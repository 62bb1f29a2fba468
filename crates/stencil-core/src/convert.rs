//! Conversions between Rust values and [`Dynamic`].
//!
//! - [`FromDynamic`]: extract a Rust value from an argument
//! - [`IntoDynamic`]: turn a Rust value into an argument or result
//!
//! ```
//! use stencil_core::{Dynamic, FromDynamic, IntoDynamic};
//!
//! let value = 42i32.into_dynamic();
//! assert_eq!(i32::from_dynamic(&value).unwrap(), 42);
//! assert!(u8::from_dynamic(&Dynamic::Int(-1)).is_err());
//! ```

use std::sync::Arc;

use crate::Dynamic;
use crate::error::ConversionError;

/// Extract a value from a [`Dynamic`].
pub trait FromDynamic: Sized {
    fn from_dynamic(value: &Dynamic) -> Result<Self, ConversionError>;
}

/// Convert a value into a [`Dynamic`].
pub trait IntoDynamic {
    fn into_dynamic(self) -> Dynamic;
}

macro_rules! impl_int {
    ($($ty:ty),*) => {
        $(
            impl FromDynamic for $ty {
                fn from_dynamic(value: &Dynamic) -> Result<Self, ConversionError> {
                    match value {
                        Dynamic::Int(v) => <$ty>::try_from(*v).map_err(|_| {
                            ConversionError::IntegerOverflow {
                                value: *v,
                                target_type: stringify!($ty),
                            }
                        }),
                        _ => Err(ConversionError::mismatch("int", value.type_name())),
                    }
                }
            }

            impl IntoDynamic for $ty {
                fn into_dynamic(self) -> Dynamic {
                    Dynamic::Int(self as i64)
                }
            }
        )*
    };
}

impl_int!(i8, i16, i32, i64, u8, u16, u32);

impl FromDynamic for f64 {
    fn from_dynamic(value: &Dynamic) -> Result<Self, ConversionError> {
        match value {
            Dynamic::Float(v) => Ok(*v),
            Dynamic::Int(v) => Ok(*v as f64),
            _ => Err(ConversionError::mismatch("float", value.type_name())),
        }
    }
}

impl IntoDynamic for f64 {
    fn into_dynamic(self) -> Dynamic {
        Dynamic::Float(self)
    }
}

impl IntoDynamic for f32 {
    fn into_dynamic(self) -> Dynamic {
        Dynamic::Float(self as f64)
    }
}

impl FromDynamic for bool {
    fn from_dynamic(value: &Dynamic) -> Result<Self, ConversionError> {
        match value {
            Dynamic::Bool(v) => Ok(*v),
            _ => Err(ConversionError::mismatch("bool", value.type_name())),
        }
    }
}

impl IntoDynamic for bool {
    fn into_dynamic(self) -> Dynamic {
        Dynamic::Bool(self)
    }
}

impl FromDynamic for String {
    fn from_dynamic(value: &Dynamic) -> Result<Self, ConversionError> {
        match value {
            Dynamic::String(s) => Ok(s.clone()),
            _ => Err(ConversionError::mismatch("string", value.type_name())),
        }
    }
}

impl IntoDynamic for String {
    fn into_dynamic(self) -> Dynamic {
        Dynamic::String(self)
    }
}

impl IntoDynamic for &str {
    fn into_dynamic(self) -> Dynamic {
        Dynamic::String(self.to_owned())
    }
}

impl FromDynamic for Arc<[Dynamic]> {
    fn from_dynamic(value: &Dynamic) -> Result<Self, ConversionError> {
        match value {
            Dynamic::Array(items) => Ok(Arc::clone(items)),
            _ => Err(ConversionError::mismatch("array", value.type_name())),
        }
    }
}

impl<T: IntoDynamic> IntoDynamic for Vec<T> {
    fn into_dynamic(self) -> Dynamic {
        Dynamic::array(self.into_iter().map(IntoDynamic::into_dynamic))
    }
}

impl<T: IntoDynamic> IntoDynamic for Option<T> {
    fn into_dynamic(self) -> Dynamic {
        self.map_or(Dynamic::Null, IntoDynamic::into_dynamic)
    }
}

impl FromDynamic for Dynamic {
    fn from_dynamic(value: &Dynamic) -> Result<Self, ConversionError> {
        Ok(value.clone())
    }
}

impl IntoDynamic for Dynamic {
    fn into_dynamic(self) -> Dynamic {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_dynamic_i8() {
        assert_eq!(i8::from_dynamic(&Dynamic::Int(-128)).unwrap(), -128i8);
        assert_eq!(i8::from_dynamic(&Dynamic::Int(127)).unwrap(), 127i8);
        assert!(i8::from_dynamic(&Dynamic::Int(128)).is_err());
        assert!(i8::from_dynamic(&Dynamic::Bool(true)).is_err());
    }

    #[test]
    fn from_dynamic_i32_overflow() {
        assert_eq!(
            i32::from_dynamic(&Dynamic::Int(i64::MAX)).unwrap_err(),
            ConversionError::IntegerOverflow {
                value: i64::MAX,
                target_type: "i32"
            }
        );
    }

    #[test]
    fn from_dynamic_unsigned_rejects_negative() {
        assert_eq!(u8::from_dynamic(&Dynamic::Int(255)).unwrap(), 255u8);
        assert!(u8::from_dynamic(&Dynamic::Int(-1)).is_err());
        assert!(u32::from_dynamic(&Dynamic::Int(-1)).is_err());
    }

    #[test]
    fn float_accepts_int() {
        assert_eq!(f64::from_dynamic(&Dynamic::Int(2)).unwrap(), 2.0);
        assert_eq!(f64::from_dynamic(&Dynamic::Float(2.5)).unwrap(), 2.5);
        assert!(f64::from_dynamic(&Dynamic::String("x".into())).is_err());
    }

    #[test]
    fn strings() {
        assert_eq!("Bob".into_dynamic(), Dynamic::String("Bob".into()));
        assert_eq!(
            String::from_dynamic(&Dynamic::String("Ana".into())).unwrap(),
            "Ana"
        );
        assert!(String::from_dynamic(&Dynamic::Null).is_err());
    }

    #[test]
    fn option_none_is_null() {
        assert_eq!(None::<i32>.into_dynamic(), Dynamic::Null);
        assert_eq!(Some(3i32).into_dynamic(), Dynamic::Int(3));
    }

    #[test]
    fn vec_into_array() {
        let value = vec![1i64, 2, 3].into_dynamic();
        let items = <Arc<[Dynamic]>>::from_dynamic(&value).unwrap();
        assert_eq!(&items[..], &[Dynamic::Int(1), Dynamic::Int(2), Dynamic::Int(3)]);
    }
}
