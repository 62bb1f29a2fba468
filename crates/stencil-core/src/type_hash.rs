//! Deterministic hash-based type identity.
//!
//! [`TypeHash`] is a 64-bit hash identifying value types and call-site
//! signatures. Hashes are computed from names, so the same name always yields
//! the same hash regardless of registration order:
//!
//! ```
//! use stencil_core::TypeHash;
//!
//! let a = TypeHash::from_name("JsonValue");
//! let b = TypeHash::from_name("JsonValue");
//! assert_eq!(a, b);
//!
//! let int = TypeHash::from_name("int");
//! let string = TypeHash::from_name("string");
//! let s1 = TypeHash::from_signature(string, &[string, int]);
//! let s2 = TypeHash::from_signature(string, &[int, string]);
//! assert_ne!(s1, s2);
//! ```

use std::fmt;
use xxhash_rust::xxh64::xxh64;

/// Domain-specific mixing constants for hash computation.
///
/// Different entity kinds hash into different domains so a type named `x`
/// never collides with a signature built from the same bytes.
pub mod hash_constants {
    /// Separator constant for composed hashes
    pub const SEP: u64 = 0x4bc94d6bd06053ad;

    /// Domain marker for type hashes
    pub const TYPE: u64 = 0x2fac10b63a6cc57c;

    /// Domain marker for call-site signature hashes
    pub const SIGNATURE: u64 = 0x5ea77ffbcdf5f302;

    /// Domain marker for array type hashes
    pub const ARRAY: u64 = 0x7d3c8b4a92e15f6d;

    /// Base for per-position parameter markers
    pub const PARAM: u64 = 0x9e3779b97f4a7c15;
}

/// A deterministic 64-bit hash identifying a type or a signature.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TypeHash(pub u64);

impl TypeHash {
    /// Empty hash, used as the "absent type" marker.
    pub const EMPTY: TypeHash = TypeHash(0);

    /// Create a type hash from a type name.
    #[inline]
    pub fn from_name(name: &str) -> Self {
        TypeHash(hash_constants::TYPE ^ xxh64(name.as_bytes(), 0))
    }

    /// Create the hash of an array type from its element hash.
    #[inline]
    pub fn from_array(element: TypeHash) -> Self {
        TypeHash(
            hash_constants::ARRAY
                .wrapping_mul(hash_constants::SEP)
                .wrapping_add(element.0),
        )
    }

    /// Create a signature hash from a return type and parameter types.
    ///
    /// Parameter order matters: `(string, int)` and `(int, string)` differ.
    #[inline]
    pub fn from_signature(return_type: TypeHash, param_hashes: &[TypeHash]) -> Self {
        let mut hash = hash_constants::SIGNATURE ^ return_type.0;
        for (i, param) in param_hashes.iter().enumerate() {
            let marker = hash_constants::PARAM.rotate_left(i as u32 % 64) ^ i as u64;
            // wrapping_mul keeps the fold non-commutative
            hash = hash
                .wrapping_mul(hash_constants::SEP)
                .wrapping_add(marker ^ param.0);
        }
        TypeHash(hash)
    }

    /// Check if this is the empty hash.
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
