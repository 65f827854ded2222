use irbind_sys::{BridgeCookie, ContextRef, MetadataRef, NativeError};
use miette::Diagnostic;
use thiserror::Error;

use crate::session::SessionId;

/// Errors surfaced by the interning layer.
///
/// Cross-session use, null handles on the strict paths and use after dispose
/// are programming errors: they are reported on every attempt and never
/// patched up. Unknown kind tags and callbacks for uncached handles are not
/// errors at all and never reach this type.
#[derive(Debug, Error, Diagnostic)]
pub enum BindError {
    #[error("{family} handle owned by context {found} was resolved through context {expected}")]
    #[diagnostic(
        code("BIND-SESSION-001"),
        help("Handles are only meaningful inside the session that produced them")
    )]
    CrossSession {
        family: &'static str,
        expected: ContextRef,
        found: ContextRef,
    },

    #[error("Null {family} handle cannot be interned")]
    #[diagnostic(code("BIND-HANDLE-001"))]
    NullHandle { family: &'static str },

    #[error("{0} has been disposed")]
    #[diagnostic(
        code("BIND-SESSION-002"),
        help("Resolve handles only while the owning session is alive")
    )]
    SessionDisposed(SessionId),

    #[error("Expected a {expected} wrapper, but the handle resolved to {found}")]
    #[diagnostic(code("BIND-TYPE-001"))]
    IncompatibleType { expected: &'static str, found: String },

    #[error("Native callback for {cookie} arrived after its value cache was torn down")]
    #[diagnostic(code("BIND-BRIDGE-001"))]
    TeardownViolation { cookie: BridgeCookie },

    #[error("Metadata node {handle} is not temporary and cannot be replaced")]
    #[diagnostic(
        code("BIND-MD-001"),
        help("Only temporary (forward declared) nodes may have their uses replaced")
    )]
    NonTemporaryReplacement { handle: MetadataRef },

    #[error("Native library error: {0}")]
    #[diagnostic(code("BIND-NATIVE-001"))]
    Native(#[from] NativeError),
}

/// Result type for interning operations.
pub type BindResult<T> = Result<T, BindError>;
