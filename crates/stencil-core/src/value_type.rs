//! Semantic types of template parameters, results and varargs packs.

use std::fmt;

use crate::{Native, NativeType, TypeHash};

/// The type of a value crossing a call site.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// Accepts every value.
    Any,
    Bool,
    /// 64-bit signed integer.
    Int,
    /// 64-bit float. Integers widen into it.
    Float,
    String,
    /// Homogeneous array; varargs packs are arrays of their element type.
    Array(Box<ValueType>),
    /// A host type registered through [`Native`].
    Native(NativeType),
}

impl ValueType {
    /// Array of `element`.
    pub fn array(element: ValueType) -> Self {
        ValueType::Array(Box::new(element))
    }

    /// The native type `T`.
    pub fn native<T: Native>() -> Self {
        ValueType::Native(NativeType::of::<T>())
    }

    /// Deterministic hash of this type.
    pub fn type_hash(&self) -> TypeHash {
        match self {
            ValueType::Any => TypeHash::from_name("any"),
            ValueType::Bool => TypeHash::from_name("bool"),
            ValueType::Int => TypeHash::from_name("int"),
            ValueType::Float => TypeHash::from_name("float"),
            ValueType::String => TypeHash::from_name("string"),
            ValueType::Array(element) => TypeHash::from_array(element.type_hash()),
            ValueType::Native(native) => native.hash(),
        }
    }

    /// Whether a value of type `other` can be used where `self` is expected.
    ///
    /// This is the only subtyping relation: `Any` accepts everything, `Float`
    /// accepts `Int`, and arrays are covariant in their element.
    pub fn is_assignable_from(&self, other: &ValueType) -> bool {
        match (self, other) {
            (ValueType::Any, _) => true,
            (ValueType::Float, ValueType::Int) => true,
            (ValueType::Array(to), ValueType::Array(from)) => to.is_assignable_from(from),
            (to, from) => to == from,
        }
    }

    /// Whether `null` is a member of this type.
    pub fn is_reference(&self) -> bool {
        matches!(
            self,
            ValueType::Any | ValueType::String | ValueType::Array(_) | ValueType::Native(_)
        )
    }

    /// Whether this type, or any type nested in it, is the absent type.
    pub fn is_absent(&self) -> bool {
        match self {
            ValueType::Native(native) => native.is_absent(),
            ValueType::Array(element) => element.is_absent(),
            _ => false,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Any => f.write_str("any"),
            ValueType::Bool => f.write_str("bool"),
            ValueType::Int => f.write_str("int"),
            ValueType::Float => f.write_str("float"),
            ValueType::String => f.write_str("string"),
            ValueType::Array(element) => write!(f, "{}[]", element),
            ValueType::Native(native) => write!(f, "{}", native),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Symbol;

    impl Native for Symbol {
        fn type_name() -> &'static str {
            "Symbol"
        }
    }

    #[test]
    fn any_accepts_everything() {
        for ty in [
            ValueType::Bool,
            ValueType::Int,
            ValueType::Float,
            ValueType::String,
            ValueType::array(ValueType::Int),
            ValueType::native::<Symbol>(),
        ] {
            assert!(ValueType::Any.is_assignable_from(&ty));
        }
    }

    #[test]
    fn int_widens_to_float_only() {
        assert!(ValueType::Float.is_assignable_from(&ValueType::Int));
        assert!(!ValueType::Int.is_assignable_from(&ValueType::Float));
        assert!(!ValueType::String.is_assignable_from(&ValueType::Int));
    }

    #[test]
    fn arrays_are_covariant() {
        let floats = ValueType::array(ValueType::Float);
        let ints = ValueType::array(ValueType::Int);
        assert!(floats.is_assignable_from(&ints));
        assert!(!ints.is_assignable_from(&floats));
    }

    #[test]
    fn specific_types_do_not_accept_any() {
        assert!(!ValueType::String.is_assignable_from(&ValueType::Any));
        assert!(!ValueType::native::<Symbol>().is_assignable_from(&ValueType::Any));
    }

    #[test]
    fn reference_types() {
        assert!(ValueType::String.is_reference());
        assert!(ValueType::native::<Symbol>().is_reference());
        assert!(!ValueType::Int.is_reference());
        assert!(!ValueType::Bool.is_reference());
    }

    #[test]
    fn absent_types() {
        assert!(ValueType::Native(NativeType::absent()).is_absent());
        assert!(ValueType::array(ValueType::Native(NativeType::absent())).is_absent());
        assert!(!ValueType::String.is_absent());
    }

    #[test]
    fn display() {
        assert_eq!(ValueType::array(ValueType::String).to_string(), "string[]");
        assert_eq!(ValueType::native::<Symbol>().to_string(), "Symbol");
    }

    #[test]
    fn hashes_are_distinct() {
        assert_ne!(ValueType::Int.type_hash(), ValueType::Float.type_hash());
        assert_ne!(
            ValueType::Int.type_hash(),
            ValueType::array(ValueType::Int).type_hash()
        );
        assert_eq!(
            ValueType::native::<Symbol>().type_hash(),
            TypeHash::from_name("Symbol")
        );
    }
}
