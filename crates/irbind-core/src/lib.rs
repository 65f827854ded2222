//! Reference-identity preserving wrappers over a native compiler library.
//!
//! A [`Session`] owns one native context. Every handle resolved through it
//! maps to exactly one `Rc` wrapper whose concrete class is reconstructed
//! from the native kind tag, and the value table follows deletions and
//! replacements the native side performs on its own.

#[macro_use]
pub mod wrapper;

pub mod bridge;
pub mod config;
pub mod diagnostics;
pub mod dispatch;
pub mod error;
pub mod interning;
pub mod metadata;
pub mod session;
pub mod types;
pub mod values;

pub use irbind_sys as sys;

pub use config::{CacheConfig, ConfigError, DiagnosticConfig, SessionConfig};
pub use error::{BindError, BindResult};
pub use metadata::{Metadata, MetadataClass};
pub use session::{Session, SessionId, SessionState};
pub use types::{Type, TypeClass};
pub use values::{BinaryOp, CastOp, Value, ValueClass};
pub use wrapper::{Interned, Wrapper};
