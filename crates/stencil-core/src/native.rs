//! Host types that can travel through a call site as values.
//!
//! A Rust type implements [`Native`] to become a [`ValueType::Native`] with a
//! stable identity. The identity is a [`TypeHash`] derived from the type name,
//! so two declarations of the same name describe the same type.
//!
//! ```
//! use stencil_core::{Native, NativeType, TypeHash};
//!
//! struct Point {
//!     x: i32,
//!     y: i32,
//! }
//!
//! impl Native for Point {
//!     fn type_name() -> &'static str {
//!         "Point"
//!     }
//! }
//!
//! let ty = NativeType::of::<Point>();
//! assert_eq!(ty.hash(), TypeHash::from_name("Point"));
//! assert_eq!(ty.name(), "Point");
//! ```
//!
//! [`ValueType::Native`]: crate::ValueType::Native

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::TypeHash;

/// Trait for host types usable as template arguments or results.
pub trait Native: Send + Sync + 'static {
    /// The type name shown in signatures and diagnostics.
    fn type_name() -> &'static str;

    /// The type hash. Defaults to the hash of [`Native::type_name`].
    fn type_hash() -> TypeHash {
        TypeHash::from_name(Self::type_name())
    }
}

/// Identity of a [`Native`] type.
///
/// Equality and hashing only consider the hash; the name is for display.
#[derive(Clone, Copy)]
pub struct NativeType {
    hash: TypeHash,
    name: &'static str,
}

impl NativeType {
    /// The identity of `T`.
    pub fn of<T: Native>() -> Self {
        Self {
            hash: T::type_hash(),
            name: T::type_name(),
        }
    }

    /// Build an identity from parts.
    pub const fn new(hash: TypeHash, name: &'static str) -> Self {
        Self { hash, name }
    }

    /// The "absent" type. Templates reject it with a null-contract error.
    pub const fn absent() -> Self {
        Self {
            hash: TypeHash::EMPTY,
            name: "",
        }
    }

    /// Whether this is the absent type.
    pub const fn is_absent(&self) -> bool {
        self.hash.is_empty()
    }

    pub fn hash(&self) -> TypeHash {
        self.hash
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for NativeType {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
    }
}

impl Eq for NativeType {}

impl Hash for NativeType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.hash.hash(state);
    }
}

impl fmt::Debug for NativeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeType({}, {})", self.name, self.hash)
    }
}

impl fmt::Display for NativeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
