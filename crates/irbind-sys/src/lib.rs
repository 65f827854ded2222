//! Native call surface consumed by the irbind wrapper layer.
//!
//! Nothing in this crate owns state. It defines the opaque handle types, the
//! kind tag tables, the callback signatures and the `NativeApi` trait a
//! native compiler library is reached through.

pub mod api;
pub mod error;
pub mod handles;
pub mod kinds;

pub use api::{DiagnosticHandler, ItemDeletedCallback, ItemReplacedCallback, NativeApi};
pub use error::{NativeError, NativeResult};
pub use handles::{
    BridgeCookie, ContextRef, DiagnosticCookie, MetadataRef, RawHandle, TypeRef, ValueCacheRef,
    ValueRef,
};
pub use kinds::{DiagnosticSeverity, MetadataKind, TypeKind, ValueKind, INSTRUCTION_MARKER};
