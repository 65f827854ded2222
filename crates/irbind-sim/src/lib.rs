//! In-process reference native library.
//!
//! `SimLibrary` implements [`NativeApi`] on top of a plain object store so the
//! wrapper layer can be exercised without a real compiler backend. It behaves
//! the way the native contract requires:
//!
//! - handles are address-like tokens, never zero,
//! - freed value addresses are reused by later allocations (most recently
//!   freed first), like a native allocator would,
//! - deletion and replacement callbacks fire synchronously, before the
//!   triggering call returns, and never while the store is borrowed.

use std::cell::RefCell;
use std::ffi::CString;

use irbind_sys::{
    BridgeCookie, ContextRef, DiagnosticCookie, DiagnosticHandler, DiagnosticSeverity,
    ItemDeletedCallback, ItemReplacedCallback, MetadataKind, MetadataRef, NativeApi, NativeError,
    NativeResult, RawHandle, TypeKind, TypeRef, ValueCacheRef, ValueKind, ValueRef,
};
use rustc_hash::FxHashMap;

const ADDRESS_BASE: usize = 0x1000;
const ADDRESS_STRIDE: usize = 0x10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Family {
    Value,
    Metadata,
    Type,
}

#[derive(Debug)]
struct SimObject {
    family: Family,
    context: ContextRef,
    kind: u32,
    name: String,
    temporary: bool,
}

#[derive(Debug, Default)]
struct SimContext {
    diagnostics: Option<(DiagnosticHandler, DiagnosticCookie)>,
}

#[derive(Debug, Clone, Copy)]
struct CacheRegistration {
    context: ContextRef,
    on_deleted: ItemDeletedCallback,
    on_replaced: ItemReplacedCallback,
    cookie: BridgeCookie,
}

#[derive(Debug)]
struct SimState {
    next_address: usize,
    free_values: Vec<usize>,
    contexts: FxHashMap<ContextRef, SimContext>,
    objects: FxHashMap<usize, SimObject>,
    caches: FxHashMap<ValueCacheRef, CacheRegistration>,
}

impl Default for SimState {
    fn default() -> Self {
        SimState {
            next_address: ADDRESS_BASE,
            free_values: Vec::new(),
            contexts: FxHashMap::default(),
            objects: FxHashMap::default(),
            caches: FxHashMap::default(),
        }
    }
}

impl SimState {
    fn fresh_address(&mut self) -> usize {
        let address = self.next_address;
        self.next_address += ADDRESS_STRIDE;
        address
    }

    fn object<H: RawHandle>(&self, handle: H, family: Family) -> NativeResult<&SimObject> {
        self.objects
            .get(&handle.as_raw())
            .filter(|object| object.family == family)
            .ok_or_else(|| NativeError::invalid(handle))
    }

    fn ensure_context(&self, context: ContextRef) -> NativeResult<()> {
        if self.contexts.contains_key(&context) {
            Ok(())
        } else {
            Err(NativeError::UnknownContext(context))
        }
    }

    fn registrations_for(&self, context: ContextRef) -> Vec<CacheRegistration> {
        self.caches
            .values()
            .filter(|registration| registration.context == context)
            .copied()
            .collect()
    }
}

/// The reference native library.
#[derive(Debug, Default)]
pub struct SimLibrary {
    state: RefCell<SimState>,
}

impl SimLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Native-side construction
    // ========================================================================

    pub fn add_value(&self, context: ContextRef, kind: ValueKind, name: &str) -> NativeResult<ValueRef> {
        self.add_value_raw(context, kind.as_raw(), name)
    }

    /// Allocates a value with an arbitrary tag, including tags the wrapper
    /// layer has never heard of.
    pub fn add_value_raw(&self, context: ContextRef, tag: u32, name: &str) -> NativeResult<ValueRef> {
        let mut state = self.state.borrow_mut();
        state.ensure_context(context)?;
        let address = match state.free_values.pop() {
            Some(address) => address,
            None => state.fresh_address(),
        };
        state.objects.insert(
            address,
            SimObject {
                family: Family::Value,
                context,
                kind: tag,
                name: name.to_string(),
                temporary: false,
            },
        );
        log::trace!("sim: allocated value {:#x} (tag {}) in {}", address, tag, context);
        Ok(ValueRef::from_raw(address))
    }

    pub fn add_metadata(&self, context: ContextRef, kind: MetadataKind) -> NativeResult<MetadataRef> {
        self.insert_metadata(context, kind.as_raw(), false)
    }

    pub fn add_metadata_raw(&self, context: ContextRef, tag: u32) -> NativeResult<MetadataRef> {
        self.insert_metadata(context, tag, false)
    }

    /// Allocates a temporary (forward-declared) node that can later be
    /// replaced through `metadata_replace_all_uses_with`.
    pub fn add_temporary_metadata(
        &self,
        context: ContextRef,
        kind: MetadataKind,
    ) -> NativeResult<MetadataRef> {
        self.insert_metadata(context, kind.as_raw(), true)
    }

    fn insert_metadata(&self, context: ContextRef, tag: u32, temporary: bool) -> NativeResult<MetadataRef> {
        let mut state = self.state.borrow_mut();
        state.ensure_context(context)?;
        let address = state.fresh_address();
        state.objects.insert(
            address,
            SimObject {
                family: Family::Metadata,
                context,
                kind: tag,
                name: String::new(),
                temporary,
            },
        );
        Ok(MetadataRef::from_raw(address))
    }

    pub fn add_type(&self, context: ContextRef, kind: TypeKind) -> NativeResult<TypeRef> {
        self.add_type_raw(context, kind.as_raw())
    }

    pub fn add_type_raw(&self, context: ContextRef, tag: u32) -> NativeResult<TypeRef> {
        let mut state = self.state.borrow_mut();
        state.ensure_context(context)?;
        let address = state.fresh_address();
        state.objects.insert(
            address,
            SimObject {
                family: Family::Type,
                context,
                kind: tag,
                name: String::new(),
                temporary: false,
            },
        );
        Ok(TypeRef::from_raw(address))
    }

    // ========================================================================
    // Native-side mutation (what an optimization pass would do)
    // ========================================================================

    /// Destroys a value and notifies every value cache of its context.
    pub fn delete_value(&self, value: ValueRef) -> NativeResult<()> {
        let registrations = {
            let mut state = self.state.borrow_mut();
            let context = state.object(value, Family::Value)?.context;
            state.objects.remove(&value.as_raw());
            state.free_values.push(value.as_raw());
            state.registrations_for(context)
        };
        log::trace!("sim: deleted {} ({} cache(s) to notify)", value, registrations.len());
        for registration in registrations {
            (registration.on_deleted)(registration.cookie, value);
        }
        Ok(())
    }

    /// Redirects every use of `old` to `new` and notifies every value cache
    /// of their context. `old` stays allocated.
    pub fn replace_all_uses_with(&self, old: ValueRef, new: ValueRef) -> NativeResult<()> {
        {
            let state = self.state.borrow();
            let first = state.object(old, Family::Value)?.context;
            let second = state.object(new, Family::Value)?.context;
            if first != second {
                return Err(NativeError::ContextMismatch { first, second });
            }
            if old == new {
                return Err(NativeError::Unsupported(format!(
                    "cannot replace {} with itself",
                    old
                )));
            }
        }
        log::trace!("sim: replaced {} with {}", old, new);
        self.report_replacement(old, new)
    }

    /// Fires the replacement callbacks of the context owning `old` without
    /// checking `new` at all, as a misbehaving native pass would.
    pub fn report_replacement(&self, old: ValueRef, new: ValueRef) -> NativeResult<()> {
        let registrations = {
            let state = self.state.borrow();
            let context = state.object(old, Family::Value)?.context;
            state.registrations_for(context)
        };
        for registration in registrations {
            (registration.on_replaced)(registration.cookie, old, new);
        }
        Ok(())
    }

    /// Raises a diagnostic in `context`. Returns whether a handler received it.
    pub fn emit_diagnostic(
        &self,
        context: ContextRef,
        severity: DiagnosticSeverity,
        message: &str,
    ) -> NativeResult<bool> {
        let handler = {
            let state = self.state.borrow();
            state
                .contexts
                .get(&context)
                .ok_or(NativeError::UnknownContext(context))?
                .diagnostics
        };
        let Some((handler, cookie)) = handler else {
            return Ok(false);
        };
        let text = CString::new(message.replace('\0', " "))
            .map_err(|e| NativeError::Unsupported(e.to_string()))?;
        handler(cookie, severity, text.as_ptr());
        Ok(true)
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    pub fn is_live<H: RawHandle>(&self, handle: H) -> bool {
        self.state.borrow().objects.contains_key(&handle.as_raw())
    }

    pub fn context_count(&self) -> usize {
        self.state.borrow().contexts.len()
    }

    pub fn registered_cache_count(&self, context: ContextRef) -> usize {
        self.state.borrow().registrations_for(context).len()
    }

    pub fn has_diagnostic_handler(&self, context: ContextRef) -> bool {
        self.state
            .borrow()
            .contexts
            .get(&context)
            .is_some_and(|ctx| ctx.diagnostics.is_some())
    }
}

impl NativeApi for SimLibrary {
    fn context_create(&self) -> ContextRef {
        let mut state = self.state.borrow_mut();
        let context = ContextRef::from_raw(state.fresh_address());
        state.contexts.insert(context, SimContext::default());
        log::trace!("sim: created {}", context);
        context
    }

    fn context_dispose(&self, context: ContextRef) {
        let mut state = self.state.borrow_mut();
        if state.contexts.remove(&context).is_none() {
            return;
        }
        state.objects.retain(|_, object| object.context != context);
        let stale = state.caches.len();
        state.caches.retain(|_, registration| registration.context != context);
        if stale != state.caches.len() {
            log::warn!("sim: {} disposed with value caches still registered", context);
        }
        log::trace!("sim: disposed {}", context);
    }

    fn value_kind(&self, value: ValueRef) -> NativeResult<u32> {
        Ok(self.state.borrow().object(value, Family::Value)?.kind)
    }

    fn value_context(&self, value: ValueRef) -> NativeResult<ContextRef> {
        Ok(self.state.borrow().object(value, Family::Value)?.context)
    }

    fn value_name(&self, value: ValueRef) -> NativeResult<String> {
        Ok(self.state.borrow().object(value, Family::Value)?.name.clone())
    }

    fn value_replace_all_uses_with(&self, old: ValueRef, new: ValueRef) -> NativeResult<()> {
        self.replace_all_uses_with(old, new)
    }

    fn value_erase(&self, value: ValueRef) -> NativeResult<()> {
        self.delete_value(value)
    }

    fn metadata_kind(&self, node: MetadataRef) -> NativeResult<u32> {
        Ok(self.state.borrow().object(node, Family::Metadata)?.kind)
    }

    fn metadata_context(&self, node: MetadataRef) -> NativeResult<ContextRef> {
        Ok(self.state.borrow().object(node, Family::Metadata)?.context)
    }

    fn metadata_is_temporary(&self, node: MetadataRef) -> NativeResult<bool> {
        Ok(self.state.borrow().object(node, Family::Metadata)?.temporary)
    }

    fn metadata_replace_all_uses_with(
        &self,
        temporary: MetadataRef,
        replacement: MetadataRef,
    ) -> NativeResult<()> {
        let mut state = self.state.borrow_mut();
        let temp = state.object(temporary, Family::Metadata)?;
        let (first, is_temporary) = (temp.context, temp.temporary);
        let second = state.object(replacement, Family::Metadata)?.context;
        if first != second {
            return Err(NativeError::ContextMismatch { first, second });
        }
        if !is_temporary {
            return Err(NativeError::Unsupported(format!(
                "{} is not a temporary node",
                temporary
            )));
        }
        state.objects.remove(&temporary.as_raw());
        Ok(())
    }

    fn type_kind(&self, ty: TypeRef) -> NativeResult<u32> {
        Ok(self.state.borrow().object(ty, Family::Type)?.kind)
    }

    fn type_context(&self, ty: TypeRef) -> NativeResult<ContextRef> {
        Ok(self.state.borrow().object(ty, Family::Type)?.context)
    }

    fn create_value_cache(
        &self,
        context: ContextRef,
        on_deleted: ItemDeletedCallback,
        on_replaced: ItemReplacedCallback,
        cookie: BridgeCookie,
    ) -> NativeResult<ValueCacheRef> {
        let mut state = self.state.borrow_mut();
        state.ensure_context(context)?;
        let cache = ValueCacheRef::from_raw(state.fresh_address());
        state.caches.insert(
            cache,
            CacheRegistration {
                context,
                on_deleted,
                on_replaced,
                cookie,
            },
        );
        Ok(cache)
    }

    fn dispose_value_cache(&self, cache: ValueCacheRef) {
        self.state.borrow_mut().caches.remove(&cache);
    }

    fn set_diagnostic_handler(
        &self,
        context: ContextRef,
        handler: Option<DiagnosticHandler>,
        cookie: DiagnosticCookie,
    ) {
        if let Some(ctx) = self.state.borrow_mut().contexts.get_mut(&context) {
            ctx.diagnostics = handler.map(|handler| (handler, cookie));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn freed_value_addresses_are_reused() {
        let sim = SimLibrary::new();
        let ctx = sim.context_create();
        let first = sim.add_value(ctx, ValueKind::Add, "a").unwrap();
        sim.delete_value(first).unwrap();
        assert!(!sim.is_live(first));
        let second = sim.add_value(ctx, ValueKind::Load, "b").unwrap();
        assert_eq!(first, second);
        assert_eq!(sim.value_kind(second).unwrap(), ValueKind::Load.as_raw());
    }

    #[test]
    fn queries_on_dead_handles_fail() {
        let sim = SimLibrary::new();
        let ctx = sim.context_create();
        let value = sim.add_value(ctx, ValueKind::Argument, "x").unwrap();
        sim.delete_value(value).unwrap();
        assert_eq!(sim.value_name(value), Err(NativeError::invalid(value)));
    }

    #[test]
    fn families_do_not_alias() {
        let sim = SimLibrary::new();
        let ctx = sim.context_create();
        let node = sim.add_metadata(ctx, MetadataKind::DIFile).unwrap();
        let as_value = ValueRef::from_raw(node.as_raw());
        assert!(sim.value_kind(as_value).is_err());
    }

    #[test]
    fn disposing_a_context_frees_its_objects() {
        let sim = SimLibrary::new();
        let ctx = sim.context_create();
        let ty = sim.add_type(ctx, TypeKind::Integer).unwrap();
        sim.context_dispose(ctx);
        assert!(!sim.is_live(ty));
        assert_eq!(sim.context_count(), 0);
        assert!(sim.add_type(ctx, TypeKind::Void).is_err());
    }

    #[test]
    fn only_temporaries_can_be_replaced() {
        let sim = SimLibrary::new();
        let ctx = sim.context_create();
        let temp = sim.add_temporary_metadata(ctx, MetadataKind::DICompositeType).unwrap();
        let fin = sim.add_metadata(ctx, MetadataKind::DICompositeType).unwrap();
        assert!(sim.metadata_replace_all_uses_with(fin, temp).is_err());
        sim.metadata_replace_all_uses_with(temp, fin).unwrap();
        assert!(!sim.is_live(temp));
        assert!(sim.is_live(fin));
    }
}
