use thiserror::Error;

use crate::handles::ContextRef;

/// Errors reported by the native library itself.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NativeError {
    #[error("Invalid {family} handle {raw:#x}: the object was deleted or never existed")]
    InvalidHandle { family: &'static str, raw: usize },

    #[error("Handles belong to different contexts ({first} and {second})")]
    ContextMismatch { first: ContextRef, second: ContextRef },

    #[error("Unknown context {0}")]
    UnknownContext(ContextRef),

    #[error("Operation not supported by the native library: {0}")]
    Unsupported(String),
}

impl NativeError {
    pub fn invalid<H: crate::RawHandle>(handle: H) -> Self {
        NativeError::InvalidHandle {
            family: H::FAMILY,
            raw: handle.as_raw(),
        }
    }
}

/// Result type for native calls.
pub type NativeResult<T> = Result<T, NativeError>;
