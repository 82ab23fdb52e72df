//! Deterministic hash-based identity for templates and specializations.
//!
//! [`TypeHash`] is a 64-bit hash computed from a name, or from a
//! `(template, argument)` pair. The instantiation cache is keyed by these
//! hashes so a lookup never needs to re-mangle the argument.
//!
//! # Examples
//!
//! ```
//! use monogen_core::TypeHash;
//!
//! let int_hash = TypeHash::from_name("int");
//! assert_eq!(int_hash, TypeHash::from_name("int"));
//!
//! let node = TypeHash::from_name("Node");
//! let node_int = TypeHash::from_instance(node, int_hash);
//! assert_ne!(node_int, TypeHash::from_instance(node, TypeHash::from_name("char")));
//! ```

use std::fmt;
use xxhash_rust::xxh64::xxh64;

/// Domain-specific mixing constants for hash computation.
pub mod hash_constants {
    /// Separator constant mixed between template and argument.
    pub const SEP: u64 = 0x4bc94d6bd06053ad;

    /// Domain marker for name hashes.
    pub const TYPE: u64 = 0x2fac10b63a6cc57c;

    /// Domain marker for the argument slot of an instance hash.
    pub const ARGUMENT: u64 = 0x9e3779b97f4a7c15;
}

/// A deterministic 64-bit hash identifying a type name or a specialization.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TypeHash(pub u64);

impl TypeHash {
    /// Empty/invalid hash constant.
    pub const EMPTY: TypeHash = TypeHash(0);

    /// Create a hash from a template name, type name or generated symbol.
    #[inline]
    pub fn from_name(name: &str) -> Self {
        TypeHash(hash_constants::TYPE ^ xxh64(name.as_bytes(), 0))
    }

    /// Create the hash of `template` specialized for `argument`.
    ///
    /// Not commutative: swapping template and argument gives a different hash.
    #[inline]
    pub fn from_instance(template: TypeHash, argument: TypeHash) -> Self {
        TypeHash(
            template
                .0
                .wrapping_mul(hash_constants::SEP)
                .wrapping_add(hash_constants::ARGUMENT ^ argument.0),
        )
    }

    /// Check if this is an empty/invalid hash.
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
