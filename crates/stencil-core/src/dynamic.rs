//! Runtime value type for template arguments and results.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::error::ConversionError;
use crate::{Native, NativeType, ValueType};

/// A value passed to, or returned from, a call site.
///
/// Cloning is cheap for arrays and native values: both are reference
/// counted, so a clone is the *same instance* (see [`Dynamic::same_instance`]).
#[derive(Clone)]
pub enum Dynamic {
    /// Null reference
    Null,
    Bool(bool),
    /// Integer value (all widths stored as i64)
    Int(i64),
    /// Floating point value (f32 and f64 stored as f64)
    Float(f64),
    String(String),
    /// Shared array, also the carrier of collected varargs
    Array(Arc<[Dynamic]>),
    /// Shared host value
    Native(NativeValue),
}

/// A reference-counted host value tagged with its [`NativeType`].
#[derive(Clone)]
pub struct NativeValue {
    ty: NativeType,
    value: Arc<dyn Any + Send + Sync>,
}

impl NativeValue {
    pub fn new<T: Native>(value: T) -> Self {
        Self::from_arc(Arc::new(value))
    }

    pub fn from_arc<T: Native>(value: Arc<T>) -> Self {
        Self {
            ty: NativeType::of::<T>(),
            value,
        }
    }

    pub fn native_type(&self) -> NativeType {
        self.ty
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    /// Recover the shared `Arc<T>`, keeping identity.
    pub fn downcast_arc<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        Arc::clone(&self.value).downcast::<T>().ok()
    }

    pub fn ptr_eq(&self, other: &NativeValue) -> bool {
        Arc::ptr_eq(&self.value, &other.value)
    }
}

impl Dynamic {
    /// Wrap a host value.
    pub fn native<T: Native>(value: T) -> Self {
        Dynamic::Native(NativeValue::new(value))
    }

    /// Build an array value.
    pub fn array(values: impl IntoIterator<Item = Dynamic>) -> Self {
        Dynamic::Array(values.into_iter().collect())
    }

    /// Get a human-readable name for this value's type.
    pub fn type_name(&self) -> &'static str {
        match self {
            Dynamic::Null => "null",
            Dynamic::Bool(_) => "bool",
            Dynamic::Int(_) => "int",
            Dynamic::Float(_) => "float",
            Dynamic::String(_) => "string",
            Dynamic::Array(_) => "array",
            Dynamic::Native(native) => native.ty.name(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Dynamic::Null)
    }

    /// Borrow the host value as `T`.
    pub fn as_native<T: Native>(&self) -> Option<&T> {
        match self {
            Dynamic::Native(native) => native.downcast_ref::<T>(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Dynamic::String(s) => Some(s),
            _ => None,
        }
    }

    /// Whether both values share the same allocation.
    ///
    /// Only arrays and native values have identity; everything else compares
    /// as not the same instance.
    pub fn same_instance(&self, other: &Dynamic) -> bool {
        match (self, other) {
            (Dynamic::Native(a), Dynamic::Native(b)) => a.ptr_eq(b),
            (Dynamic::Array(a), Dynamic::Array(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Whether this value is a member of `ty` without any conversion.
    pub fn conforms_to(&self, ty: &ValueType) -> bool {
        match (self, ty) {
            (_, ValueType::Any) => true,
            (Dynamic::Null, ty) => ty.is_reference(),
            (Dynamic::Bool(_), ValueType::Bool) => true,
            (Dynamic::Int(_), ValueType::Int) => true,
            (Dynamic::Float(_), ValueType::Float) => true,
            (Dynamic::String(_), ValueType::String) => true,
            (Dynamic::Array(items), ValueType::Array(element)) => {
                items.iter().all(|item| item.conforms_to(element))
            }
            (Dynamic::Native(native), ValueType::Native(expected)) => native.ty == *expected,
            _ => false,
        }
    }

    /// Convert this value to `ty`, widening integers to floats.
    ///
    /// Conforming values are returned as-is (same instance for shared values).
    pub fn coerce_to(&self, ty: &ValueType) -> Result<Dynamic, ConversionError> {
        if self.conforms_to(ty) {
            return Ok(self.clone());
        }
        match (self, ty) {
            (Dynamic::Int(v), ValueType::Float) => Ok(Dynamic::Float(*v as f64)),
            (Dynamic::Array(items), ValueType::Array(element)) => items
                .iter()
                .map(|item| item.coerce_to(element))
                .collect::<Result<Vec<_>, _>>()
                .map(Dynamic::array),
            _ => Err(ConversionError::mismatch(ty, self.type_name())),
        }
    }
}

/// Coerce every argument to `element` and collect them into one pack.
///
/// This is how a variable-arity tail is boxed before reaching
/// [`TemplatePolicy::apply`](crate::TemplatePolicy::apply).
pub fn collect_varargs(args: &[Dynamic], element: &ValueType) -> Result<Vec<Dynamic>, ConversionError> {
    args.iter().map(|arg| arg.coerce_to(element)).collect()
}

impl fmt::Debug for Dynamic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dynamic::Null => write!(f, "Null"),
            Dynamic::Bool(v) => write!(f, "Bool({})", v),
            Dynamic::Int(v) => write!(f, "Int({})", v),
            Dynamic::Float(v) => write!(f, "Float({})", v),
            Dynamic::String(s) => write!(f, "String({:?})", s),
            Dynamic::Array(items) => f.debug_tuple("Array").field(items).finish(),
            Dynamic::Native(native) => write!(f, "Native({})", native.ty.name()),
        }
    }
}

impl fmt::Display for Dynamic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dynamic::Null => f.write_str("null"),
            Dynamic::Bool(v) => write!(f, "{}", v),
            Dynamic::Int(v) => write!(f, "{}", v),
            Dynamic::Float(v) => write!(f, "{}", v),
            Dynamic::String(s) => f.write_str(s),
            Dynamic::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Dynamic::Native(native) => write!(f, "<{}>", native.ty.name()),
        }
    }
}

impl PartialEq for Dynamic {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Dynamic::Null, Dynamic::Null) => true,
            (Dynamic::Bool(a), Dynamic::Bool(b)) => a == b,
            (Dynamic::Int(a), Dynamic::Int(b)) => a == b,
            (Dynamic::Float(a), Dynamic::Float(b)) => a == b,
            (Dynamic::String(a), Dynamic::String(b)) => a == b,
            (Dynamic::Array(a), Dynamic::Array(b)) => a == b,
            // Host values have no equality contract; compare identity
            (Dynamic::Native(a), Dynamic::Native(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Point(i32, i32);

    impl Native for Point {
        fn type_name() -> &'static str {
            "Point"
        }
    }

    #[test]
    fn type_names() {
        assert_eq!(Dynamic::Null.type_name(), "null");
        assert_eq!(Dynamic::Int(0).type_name(), "int");
        assert_eq!(Dynamic::Float(0.0).type_name(), "float");
        assert_eq!(Dynamic::Bool(false).type_name(), "bool");
        assert_eq!(Dynamic::String("".into()).type_name(), "string");
        assert_eq!(Dynamic::native(Point(1, 2)).type_name(), "Point");
    }

    #[test]
    fn conforms_to_primitives() {
        assert!(Dynamic::Int(1).conforms_to(&ValueType::Int));
        assert!(Dynamic::Int(1).conforms_to(&ValueType::Any));
        assert!(!Dynamic::Int(1).conforms_to(&ValueType::Float));
        assert!(!Dynamic::String("x".into()).conforms_to(&ValueType::Int));
    }

    #[test]
    fn null_conforms_to_reference_types_only() {
        assert!(Dynamic::Null.conforms_to(&ValueType::String));
        assert!(Dynamic::Null.conforms_to(&ValueType::native::<Point>()));
        assert!(!Dynamic::Null.conforms_to(&ValueType::Int));
    }

    #[test]
    fn native_conformance_uses_type_identity() {
        let value = Dynamic::native(Point(1, 2));
        assert!(value.conforms_to(&ValueType::native::<Point>()));
        assert!(!value.conforms_to(&ValueType::String));
        assert_eq!(value.as_native::<Point>(), Some(&Point(1, 2)));
    }

    #[test]
    fn coerce_widens_int_to_float() {
        assert_eq!(
            Dynamic::Int(3).coerce_to(&ValueType::Float).unwrap(),
            Dynamic::Float(3.0)
        );
        assert!(Dynamic::Float(3.0).coerce_to(&ValueType::Int).is_err());
    }

    #[test]
    fn coerce_keeps_identity_when_conforming() {
        let value = Dynamic::native(Point(0, 0));
        let coerced = value.coerce_to(&ValueType::Any).unwrap();
        assert!(value.same_instance(&coerced));
    }

    #[test]
    fn coerce_array_elements() {
        let ints = Dynamic::array([Dynamic::Int(1), Dynamic::Int(2)]);
        let floats = ints.coerce_to(&ValueType::array(ValueType::Float)).unwrap();
        assert_eq!(floats, Dynamic::array([Dynamic::Float(1.0), Dynamic::Float(2.0)]));
    }

    #[test]
    fn coerce_mismatch_reports_types() {
        let err = Dynamic::Bool(true).coerce_to(&ValueType::String).unwrap_err();
        assert_eq!(
            err,
            ConversionError::TypeMismatch {
                expected: "string".into(),
                actual: "bool".into()
            }
        );
    }

    #[test]
    fn collect_varargs_boxes_every_argument() {
        let args = [Dynamic::Int(1), Dynamic::Float(2.5)];
        let pack = collect_varargs(&args, &ValueType::Float).unwrap();
        assert_eq!(pack, vec![Dynamic::Float(1.0), Dynamic::Float(2.5)]);

        let args = [Dynamic::Int(1), Dynamic::String("x".into())];
        assert!(collect_varargs(&args, &ValueType::Int).is_err());
    }

    #[test]
    fn same_instance_tracks_shared_values() {
        let a = Dynamic::native(Point(1, 1));
        let b = a.clone();
        let c = Dynamic::native(Point(1, 1));
        assert!(a.same_instance(&b));
        assert!(!a.same_instance(&c));
        assert!(!Dynamic::Int(1).same_instance(&Dynamic::Int(1)));
    }

    #[test]
    fn downcast_arc_shares_allocation() {
        let value = NativeValue::new(Point(4, 5));
        let a = value.downcast_arc::<Point>().unwrap();
        let b = value.downcast_arc::<Point>().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(value.downcast_arc::<String>().is_none());
    }

    #[test]
    fn display() {
        assert_eq!(Dynamic::Int(24).to_string(), "24");
        assert_eq!(Dynamic::String("Bob".into()).to_string(), "Bob");
        assert_eq!(
            Dynamic::array([Dynamic::Int(1), Dynamic::Null]).to_string(),
            "[1, null]"
        );
    }
}
