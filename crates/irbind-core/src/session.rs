//! The ownership scope for one native context and its interning tables.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use irbind_sys::{BridgeCookie, ContextRef, MetadataRef, NativeApi, RawHandle, TypeRef, ValueRef};

use crate::bridge::ValueCache;
use crate::config::SessionConfig;
use crate::diagnostics::DiagnosticForwarder;
use crate::dispatch::KindDispatchFactory;
use crate::error::{BindError, BindResult};
use crate::interning::HandleInterningMap;
use crate::metadata::Metadata;
use crate::types::Type;
use crate::values::Value;
use crate::wrapper::{Interned, Wrapper};

static NEXT_SESSION: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

impl SessionId {
    fn next() -> Self {
        SessionId(NEXT_SESSION.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Live,
    Disposing,
    Disposed,
}

type MetadataMap = HandleInterningMap<KindDispatchFactory<Metadata>>;
type TypeMap = HandleInterningMap<KindDispatchFactory<Type>>;

/// Owns a native context and guarantees one wrapper per handle inside it.
pub struct Session {
    id: SessionId,
    api: Rc<dyn NativeApi>,
    context: ContextRef,
    config: SessionConfig,
    state: Cell<SessionState>,
    values: ValueCache,
    metadata: MetadataMap,
    types: TypeMap,
    diagnostics: RefCell<Option<DiagnosticForwarder>>,
}

impl Session {
    pub fn new(api: Rc<dyn NativeApi>) -> BindResult<Self> {
        Self::with_config(api, SessionConfig::default())
    }

    pub fn with_config(api: Rc<dyn NativeApi>, config: SessionConfig) -> BindResult<Self> {
        let context = api.context_create();
        if context.is_null() {
            return Err(BindError::NullHandle {
                family: ContextRef::FAMILY,
            });
        }

        let values = match ValueCache::new(Rc::clone(&api), context, config.cache.value_capacity) {
            Ok(values) => values,
            Err(err) => {
                api.context_dispose(context);
                return Err(err);
            }
        };
        let metadata = HandleInterningMap::with_capacity(
            KindDispatchFactory::new(Rc::clone(&api), context),
            config.cache.metadata_capacity,
        );
        let types = HandleInterningMap::with_capacity(
            KindDispatchFactory::new(Rc::clone(&api), context),
            config.cache.type_capacity,
        );

        let diagnostics = config.diagnostics.forward_to_log.then(|| {
            DiagnosticForwarder::install(
                Rc::clone(&api),
                context,
                config.diagnostics.min_severity,
            )
        });

        let id = SessionId::next();
        log::info!("{} created with context {}", id, context);

        Ok(Session {
            id,
            api,
            context,
            config,
            state: Cell::new(SessionState::Live),
            values,
            metadata,
            types,
            diagnostics: RefCell::new(diagnostics),
        })
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn context_handle(&self) -> ContextRef {
        self.context
    }

    pub fn state(&self) -> SessionState {
        self.state.get()
    }

    pub fn is_disposed(&self) -> bool {
        self.state.get() != SessionState::Live
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Cookie the native side uses to report value mutations for this session.
    pub fn bridge_cookie(&self) -> BridgeCookie {
        self.values.cookie()
    }

    fn ensure_live(&self) -> BindResult<()> {
        if self.is_disposed() {
            return Err(BindError::SessionDisposed(self.id));
        }
        Ok(())
    }

    fn ensure_owned(&self, family: &'static str, owner: ContextRef) -> BindResult<()> {
        if owner != self.context {
            return Err(BindError::CrossSession {
                family,
                expected: self.context,
                found: owner,
            });
        }
        Ok(())
    }

    // ========================================================================
    // Resolution
    // ========================================================================

    pub fn resolve_value(&self, handle: ValueRef) -> BindResult<Option<Rc<Value>>> {
        self.ensure_live()?;
        if handle.is_null() {
            return Ok(None);
        }
        self.values.get_or_create(handle).map(Some)
    }

    pub fn resolve_metadata(&self, handle: MetadataRef) -> BindResult<Option<Rc<Metadata>>> {
        self.ensure_live()?;
        if handle.is_null() {
            return Ok(None);
        }
        self.metadata.get_or_create(handle).map(Some)
    }

    pub fn resolve_type(&self, handle: TypeRef) -> BindResult<Option<Rc<Type>>> {
        self.ensure_live()?;
        if handle.is_null() {
            return Ok(None);
        }
        self.types.get_or_create(handle).map(Some)
    }

    /// Resolves `handle` and narrows it to `T`.
    ///
    /// The wrapper stays interned even when the narrowing fails.
    pub fn resolve<T: Wrapper>(
        &self,
        handle: <T::Base as Interned>::Handle,
    ) -> BindResult<Option<T>> {
        let Some(base) = T::Base::resolve_in(self, handle)? else {
            return Ok(None);
        };
        T::from_base(base)
            .map(Some)
            .map_err(|base| BindError::IncompatibleType {
                expected: T::NAME,
                found: base.class_name(),
            })
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Replaces every use of `old` with `new`. The bridge redirects the
    /// entry for `old` before this returns.
    pub fn replace_all_uses_with(&self, old: &Value, new: &Value) -> BindResult<()> {
        self.ensure_live()?;
        self.ensure_owned(ValueRef::FAMILY, old.context())?;
        self.ensure_owned(ValueRef::FAMILY, new.context())?;
        self.api
            .value_replace_all_uses_with(old.handle(), new.handle())?;
        Ok(())
    }

    /// Destroys `value` natively. The bridge evicts it before this returns.
    pub fn erase_value(&self, value: &Value) -> BindResult<()> {
        self.ensure_live()?;
        self.ensure_owned(ValueRef::FAMILY, value.context())?;
        self.api.value_erase(value.handle())?;
        Ok(())
    }

    /// Resolves a forward declared node to `replacement` and forgets it.
    pub fn replace_metadata_uses(&self, temporary: &Metadata, replacement: &Metadata) -> BindResult<()> {
        self.ensure_live()?;
        self.ensure_owned(MetadataRef::FAMILY, temporary.context())?;
        self.ensure_owned(MetadataRef::FAMILY, replacement.context())?;
        if !temporary.is_temporary()? {
            return Err(BindError::NonTemporaryReplacement {
                handle: temporary.handle(),
            });
        }

        self.api
            .metadata_replace_all_uses_with(temporary.handle(), replacement.handle())?;
        self.remove_deleted_node(temporary);
        Ok(())
    }

    /// Evicts a node the native side has destroyed. Returns whether it was
    /// cached.
    pub fn remove_deleted_node(&self, node: &Metadata) -> bool {
        let evicted = self.metadata.remove(node.handle()).is_some();
        if evicted {
            log::debug!("{}: evicted deleted {}", self.id, node.handle());
        }
        evicted
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    pub fn cached_values(&self) -> Vec<Rc<Value>> {
        self.values.items()
    }

    pub fn cached_metadata(&self) -> Vec<Rc<Metadata>> {
        self.metadata.items()
    }

    pub fn cached_types(&self) -> Vec<Rc<Type>> {
        self.types.items()
    }

    // ========================================================================
    // Teardown
    // ========================================================================

    /// Releases the native context. Safe to call more than once.
    pub fn dispose(&self) {
        if self.state.get() != SessionState::Live {
            return;
        }
        self.state.set(SessionState::Disposing);

        let forwarder = self.diagnostics.borrow_mut().take();
        if let Some(mut forwarder) = forwarder {
            forwarder.uninstall();
        }
        self.values.shutdown();
        self.metadata.clear();
        self.types.clear();
        self.api.context_dispose(self.context);

        self.state.set(SessionState::Disposed);
        log::info!("{} disposed", self.id);
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl PartialEq for Session {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Session {}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("context", &self.context)
            .field("state", &self.state.get())
            .finish()
    }
}

impl Interned for Value {
    type Handle = ValueRef;

    fn resolve_in(session: &Session, handle: ValueRef) -> BindResult<Option<Rc<Self>>> {
        session.resolve_value(handle)
    }

    fn class_name(&self) -> String {
        format!("{:?}", self.class())
    }
}

impl Interned for Metadata {
    type Handle = MetadataRef;

    fn resolve_in(session: &Session, handle: MetadataRef) -> BindResult<Option<Rc<Self>>> {
        session.resolve_metadata(handle)
    }

    fn class_name(&self) -> String {
        format!("{:?}", self.class())
    }
}

impl Interned for Type {
    type Handle = TypeRef;

    fn resolve_in(session: &Session, handle: TypeRef) -> BindResult<Option<Rc<Self>>> {
        session.resolve_type(handle)
    }

    fn class_name(&self) -> String {
        format!("{:?}", self.class())
    }
}
