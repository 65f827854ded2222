//! The native call surface.
//!
//! `NativeApi` is the single entry point the wrapper layer uses to talk to the
//! native compiler library. Implementations are black boxes: they hand out
//! handles, answer kind and ownership queries, and report out-of-band
//! deletion and replacement of values through the two value-cache callback
//! slots.

use std::os::raw::c_char;

use crate::error::NativeResult;
use crate::handles::{
    BridgeCookie, ContextRef, DiagnosticCookie, MetadataRef, TypeRef, ValueCacheRef, ValueRef,
};
use crate::kinds::DiagnosticSeverity;

/// Invoked synchronously when the native library deletes a value.
pub type ItemDeletedCallback = extern "C" fn(cookie: BridgeCookie, value: ValueRef);

/// Invoked synchronously when the native library replaces all uses of `old`
/// with `new`.
pub type ItemReplacedCallback = extern "C" fn(cookie: BridgeCookie, old: ValueRef, new: ValueRef);

/// Invoked synchronously for every diagnostic raised inside a context.
/// `message` is a NUL terminated string valid only for the duration of the call.
pub type DiagnosticHandler =
    extern "C" fn(cookie: DiagnosticCookie, severity: DiagnosticSeverity, message: *const c_char);

/// Abstract native library.
///
/// Implementations must deliver callbacks synchronously from inside the native
/// operation that caused them, and must not hold any internal lock or borrow
/// while a callback runs: the callee is free to query the library again.
pub trait NativeApi {
    // ========================================================================
    // Contexts
    // ========================================================================

    /// Creates a new context. A null return means the library refused.
    fn context_create(&self) -> ContextRef;

    /// Destroys a context and every object it owns.
    fn context_dispose(&self, context: ContextRef);

    // ========================================================================
    // Values
    // ========================================================================

    /// Raw value ID of the referent.
    fn value_kind(&self, value: ValueRef) -> NativeResult<u32>;

    /// Context owning the referent.
    fn value_context(&self, value: ValueRef) -> NativeResult<ContextRef>;

    fn value_name(&self, value: ValueRef) -> NativeResult<String>;

    /// Redirects every use of `old` to `new`. Fires the replaced callback of
    /// each value cache registered on the owning context.
    fn value_replace_all_uses_with(&self, old: ValueRef, new: ValueRef) -> NativeResult<()>;

    /// Destroys a value. Fires the deleted callback of each value cache
    /// registered on the owning context.
    fn value_erase(&self, value: ValueRef) -> NativeResult<()>;

    // ========================================================================
    // Metadata
    // ========================================================================

    fn metadata_kind(&self, node: MetadataRef) -> NativeResult<u32>;

    fn metadata_context(&self, node: MetadataRef) -> NativeResult<ContextRef>;

    fn metadata_is_temporary(&self, node: MetadataRef) -> NativeResult<bool>;

    /// Replaces a temporary node with `replacement`. The temporary is
    /// destroyed by the library afterwards.
    fn metadata_replace_all_uses_with(
        &self,
        temporary: MetadataRef,
        replacement: MetadataRef,
    ) -> NativeResult<()>;

    // ========================================================================
    // Types
    // ========================================================================

    fn type_kind(&self, ty: TypeRef) -> NativeResult<u32>;

    fn type_context(&self, ty: TypeRef) -> NativeResult<ContextRef>;

    // ========================================================================
    // Callback slots
    // ========================================================================

    /// Registers the two value-cache callbacks for `context`. They stay armed
    /// until `dispose_value_cache` is called on the returned handle.
    fn create_value_cache(
        &self,
        context: ContextRef,
        on_deleted: ItemDeletedCallback,
        on_replaced: ItemReplacedCallback,
        cookie: BridgeCookie,
    ) -> NativeResult<ValueCacheRef>;

    /// Disarms a value-cache registration. No callback for it fires after
    /// this returns.
    fn dispose_value_cache(&self, cache: ValueCacheRef);

    /// Installs (or with `None`, removes) the diagnostic handler of a context.
    fn set_diagnostic_handler(
        &self,
        context: ContextRef,
        handler: Option<DiagnosticHandler>,
        cookie: DiagnosticCookie,
    );
}
