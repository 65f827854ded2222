//! Opaque handles handed out by the native library.
//!
//! Every handle is a pointer-sized token. The zero value is the null sentinel
//! meaning "no object"; it is never a valid referent.

use std::fmt;
use std::hash::Hash;

/// Common behaviour of every native handle newtype.
pub trait RawHandle: Copy + Eq + Hash + fmt::Debug + fmt::Display {
    /// The null sentinel.
    const NULL: Self;
    /// Human readable family name, used in diagnostics.
    const FAMILY: &'static str;

    fn from_raw(raw: usize) -> Self;
    fn as_raw(self) -> usize;

    fn is_null(self) -> bool {
        self.as_raw() == 0
    }
}

macro_rules! native_handle {
    ($(#[$meta:meta])* $name:ident, $family:literal) => {
        $(#[$meta])*
        #[repr(transparent)]
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
        pub struct $name(usize);

        impl RawHandle for $name {
            const NULL: Self = $name(0);
            const FAMILY: &'static str = $family;

            fn from_raw(raw: usize) -> Self {
                $name(raw)
            }

            fn as_raw(self) -> usize {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({:#x})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}@{:#x}", $family, self.0)
            }
        }
    };
}

native_handle!(
    /// A native context: the unit of ownership every other handle belongs to.
    ContextRef,
    "context"
);
native_handle!(
    /// A runtime value (constant, global, argument, basic block, instruction, ...).
    ValueRef,
    "value"
);
native_handle!(
    /// A metadata or debug-information node.
    MetadataRef,
    "metadata"
);
native_handle!(
    /// An IR type.
    TypeRef,
    "type"
);
native_handle!(
    /// A native-side value cache registration (the owner of the two callback slots).
    ValueCacheRef,
    "value cache"
);

/// Token the wrapper layer hands to the native library when registering the
/// value-cache callbacks. It is passed back verbatim with every callback.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BridgeCookie(u64);

impl BridgeCookie {
    pub const fn new(raw: u64) -> Self {
        BridgeCookie(raw)
    }

    pub const fn as_raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for BridgeCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bridge#{}", self.0)
    }
}

/// Token passed back with every native diagnostic.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DiagnosticCookie(u64);

impl DiagnosticCookie {
    pub const fn new(raw: u64) -> Self {
        DiagnosticCookie(raw)
    }

    pub const fn as_raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for DiagnosticCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "diagnostics#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_is_zero() {
        assert!(ValueRef::NULL.is_null());
        assert!(ValueRef::default().is_null());
        assert!(!ValueRef::from_raw(0x10).is_null());
        assert_eq!(MetadataRef::NULL.as_raw(), 0);
    }

    #[test]
    fn display_names_the_family() {
        assert_eq!(ValueRef::from_raw(0x20).to_string(), "value@0x20");
        assert_eq!(format!("{:?}", TypeRef::from_raw(0x30)), "TypeRef(0x30)");
        assert_eq!(BridgeCookie::new(3).to_string(), "bridge#3");
    }
}
