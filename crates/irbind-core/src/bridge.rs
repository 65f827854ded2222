//! Native mutation bridge.
//!
//! The native library reports deletion and replacement of values through two
//! callbacks registered per value cache. Each registration carries a
//! [`BridgeCookie`] that keys a thread-local registry of weak references to
//! the value tables, so a callback can find its table without any pointer
//! crossing the boundary.
//!
//! A callback whose cookie is no longer registered means the native side kept
//! firing after the cache was torn down. There is no way to report that
//! across `extern "C"`, so the process is aborted.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use irbind_sys::{BridgeCookie, ContextRef, NativeApi, RawHandle, ValueCacheRef, ValueRef};
use rustc_hash::FxHashMap;

use crate::dispatch::KindDispatchFactory;
use crate::error::{BindError, BindResult};
use crate::interning::{HandleInterningMap, ItemFactory};
use crate::values::Value;

pub type ValueMap = HandleInterningMap<KindDispatchFactory<Value>>;

static NEXT_COOKIE: AtomicU64 = AtomicU64::new(1);

/// A session's value table together with the entries the bridge redirected.
///
/// A redirected entry is keyed by the replaced handle but holds the wrapper
/// of its replacement. `redirects` maps each replacement handle to the keys
/// pointing at it, so a later deletion or replacement of that handle reaches
/// them too.
pub struct BridgedValues {
    map: ValueMap,
    redirects: RefCell<FxHashMap<ValueRef, Vec<ValueRef>>>,
}

impl BridgedValues {
    fn new(map: ValueMap) -> Self {
        BridgedValues {
            map,
            redirects: RefCell::new(FxHashMap::default()),
        }
    }

    /// Whether a callback about `handle` concerns this table.
    fn tracks(&self, handle: ValueRef) -> bool {
        self.map.contains(handle) || self.redirects.borrow().contains_key(&handle)
    }

    fn unlink(&self, target: ValueRef, source: ValueRef) {
        let mut redirects = self.redirects.borrow_mut();
        if let Some(sources) = redirects.get_mut(&target) {
            sources.retain(|s| *s != source);
            if sources.is_empty() {
                redirects.remove(&target);
            }
        }
    }

    /// Removes the entry for `handle` and every entry redirected to it.
    /// Returns how many entries were dropped.
    fn evict(&self, handle: ValueRef) -> usize {
        let mut evicted = 0;
        if let Some(item) = self.map.remove(handle) {
            evicted += 1;
            if item.handle() != handle {
                self.unlink(item.handle(), handle);
            }
        }

        let sources = self.redirects.borrow_mut().remove(&handle).unwrap_or_default();
        for source in sources {
            if self.map.remove(source).is_some() {
                evicted += 1;
            }
        }
        evicted
    }

    /// Points `old`, and every entry already redirected to `old`, at
    /// `replacement`.
    fn redirect(&self, old: ValueRef, replacement: Rc<Value>) {
        let new = replacement.handle();
        let mut sources = self.redirects.borrow_mut().remove(&old).unwrap_or_default();
        sources.retain(|source| *source != new);

        if let Some(previous) = self.map.rebind(old, Rc::clone(&replacement)) {
            if previous.handle() != old {
                self.unlink(previous.handle(), old);
            }
        }
        for source in &sources {
            self.map.rebind(*source, Rc::clone(&replacement));
        }

        sources.push(old);
        self.redirects.borrow_mut().entry(new).or_default().extend(sources);
    }

    fn clear(&self) {
        self.redirects.borrow_mut().clear();
        self.map.clear();
    }
}

thread_local! {
    static BRIDGES: RefCell<FxHashMap<BridgeCookie, Weak<BridgedValues>>> =
        RefCell::new(FxHashMap::default());
}

fn register(cookie: BridgeCookie, table: &Rc<BridgedValues>) {
    BRIDGES.with(|bridges| {
        bridges.borrow_mut().insert(cookie, Rc::downgrade(table));
    });
}

fn unregister(cookie: BridgeCookie) {
    BRIDGES.with(|bridges| {
        bridges.borrow_mut().remove(&cookie);
    });
}

fn registered_table(cookie: BridgeCookie) -> BindResult<Rc<BridgedValues>> {
    BRIDGES
        .with(|bridges| bridges.borrow().get(&cookie).and_then(Weak::upgrade))
        .ok_or(BindError::TeardownViolation { cookie })
}

#[cfg(test)]
fn is_registered(cookie: BridgeCookie) -> bool {
    BRIDGES.with(|bridges| bridges.borrow().contains_key(&cookie))
}

/// Evicts `value`, and every entry redirected to it, from the table behind
/// `cookie`.
pub(crate) fn handle_item_deleted(cookie: BridgeCookie, value: ValueRef) -> BindResult<()> {
    let table = registered_table(cookie)?;
    let evicted = table.evict(value);
    if evicted > 0 {
        log::debug!("{}: evicted deleted {} ({} entries)", cookie, value, evicted);
    }
    Ok(())
}

/// Points the entry for `old` at a newly built wrapper of `new`.
///
/// The wrapper is constructed even when `new` already has one, and no entry
/// is added for `new` itself. The wrapper previously handed out for `old` is
/// left as it was. If `new` cannot be resolved the entry for `old` is evicted
/// instead, so the table never keeps answering for a replaced value.
pub(crate) fn handle_item_replaced(
    cookie: BridgeCookie,
    old: ValueRef,
    new: ValueRef,
) -> BindResult<()> {
    let table = registered_table(cookie)?;
    if !table.tracks(old) {
        return Ok(());
    }

    let created = if new.is_null() {
        Err(BindError::NullHandle {
            family: ValueRef::FAMILY,
        })
    } else {
        table.map.factory().create(new)
    };
    match created {
        Ok(replacement) => {
            table.redirect(old, Rc::new(replacement));
            log::debug!("{}: redirected {} to {}", cookie, old, new);
        }
        Err(err) => {
            log::warn!("{}: could not resolve {} replacing {}: {}", cookie, new, old, err);
            table.evict(old);
        }
    }
    Ok(())
}

fn fatal(err: BindError) -> ! {
    log::error!("{}", err);
    std::process::abort()
}

extern "C" fn on_item_deleted(cookie: BridgeCookie, value: ValueRef) {
    if let Err(err) = handle_item_deleted(cookie, value) {
        fatal(err)
    }
}

extern "C" fn on_item_replaced(cookie: BridgeCookie, old: ValueRef, new: ValueRef) {
    if let Err(err) = handle_item_replaced(cookie, old, new) {
        fatal(err)
    }
}

/// The value table of a session together with its native registration.
pub struct ValueCache {
    table: Rc<BridgedValues>,
    cookie: BridgeCookie,
    native: Cell<Option<ValueCacheRef>>,
    api: Rc<dyn NativeApi>,
}

impl ValueCache {
    /// Creates the table and arms the native callbacks for `context`.
    pub fn new(api: Rc<dyn NativeApi>, context: ContextRef, capacity: usize) -> BindResult<Self> {
        let factory = KindDispatchFactory::new(Rc::clone(&api), context);
        let table = Rc::new(BridgedValues::new(HandleInterningMap::with_capacity(
            factory, capacity,
        )));
        let cookie = BridgeCookie::new(NEXT_COOKIE.fetch_add(1, Ordering::Relaxed));

        // The registry entry must exist before the native side can fire.
        register(cookie, &table);
        let native =
            match api.create_value_cache(context, on_item_deleted, on_item_replaced, cookie) {
                Ok(native) => native,
                Err(err) => {
                    unregister(cookie);
                    return Err(err.into());
                }
            };
        log::debug!("{} registered for context {}", cookie, context);

        Ok(ValueCache {
            table,
            cookie,
            native: Cell::new(Some(native)),
            api,
        })
    }

    pub fn cookie(&self) -> BridgeCookie {
        self.cookie
    }

    pub fn is_armed(&self) -> bool {
        self.native.get().is_some()
    }

    pub fn get_or_create(&self, handle: ValueRef) -> BindResult<Rc<Value>> {
        self.table.map.get_or_create(handle)
    }

    pub fn lookup(&self, handle: ValueRef) -> Option<Rc<Value>> {
        self.table.map.lookup(handle)
    }

    pub fn items(&self) -> Vec<Rc<Value>> {
        self.table.map.items()
    }

    pub fn len(&self) -> usize {
        self.table.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.map.is_empty()
    }

    /// Disarms the native callbacks, then forgets the registry entry, then
    /// clears the table. Idempotent.
    pub fn shutdown(&self) {
        let Some(native) = self.native.take() else {
            return;
        };
        self.api.dispose_value_cache(native);
        unregister(self.cookie);
        self.table.clear();
        log::debug!("{} shut down", self.cookie);
    }
}

impl Drop for ValueCache {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use irbind_sim::SimLibrary;
    use irbind_sys::{RawHandle, ValueKind};

    fn setup() -> (Rc<SimLibrary>, ContextRef, ValueCache) {
        let sim = Rc::new(SimLibrary::new());
        let context = sim.context_create();
        let api: Rc<dyn NativeApi> = sim.clone();
        let cache = ValueCache::new(api, context, 8).unwrap();
        (sim, context, cache)
    }

    #[test]
    fn unknown_cookie_is_a_teardown_violation() {
        let cookie = BridgeCookie::new(u64::MAX);
        assert!(matches!(
            handle_item_deleted(cookie, ValueRef::from_raw(0x1000)),
            Err(BindError::TeardownViolation { .. })
        ));
        assert!(matches!(
            handle_item_replaced(cookie, ValueRef::from_raw(0x1000), ValueRef::from_raw(0x1010)),
            Err(BindError::TeardownViolation { .. })
        ));
    }

    #[test]
    fn callbacks_after_shutdown_are_violations() {
        let (sim, context, cache) = setup();
        let cookie = cache.cookie();
        assert!(is_registered(cookie));
        assert_eq!(sim.registered_cache_count(context), 1);

        cache.shutdown();
        assert!(!cache.is_armed());
        assert!(!is_registered(cookie));
        assert_eq!(sim.registered_cache_count(context), 0);
        assert!(matches!(
            handle_item_deleted(cookie, ValueRef::from_raw(0x1000)),
            Err(BindError::TeardownViolation { cookie: c }) if c == cookie
        ));

        // second shutdown is a no-op
        cache.shutdown();
    }

    #[test]
    fn uncached_handles_are_ignored() {
        let (sim, context, cache) = setup();
        let a = sim.add_value(context, ValueKind::Load, "a").unwrap();
        let b = sim.add_value(context, ValueKind::Load, "b").unwrap();

        handle_item_deleted(cache.cookie(), a).unwrap();
        handle_item_replaced(cache.cookie(), a, b).unwrap();
        assert!(cache.is_empty());
    }

    #[test]
    fn unresolvable_replacement_evicts() {
        let (sim, context, cache) = setup();
        let a = sim.add_value(context, ValueKind::Load, "a").unwrap();
        cache.get_or_create(a).unwrap();

        handle_item_replaced(cache.cookie(), a, ValueRef::NULL).unwrap();
        assert!(cache.lookup(a).is_none());
    }

    #[test]
    fn replacement_builds_a_fresh_wrapper() {
        let (sim, context, cache) = setup();
        let a = sim.add_value(context, ValueKind::Load, "a").unwrap();
        let b = sim.add_value(context, ValueKind::Load, "b").unwrap();
        let wa = cache.get_or_create(a).unwrap();
        let wb = cache.get_or_create(b).unwrap();

        handle_item_replaced(cache.cookie(), a, b).unwrap();
        let redirected = cache.lookup(a).unwrap();
        assert_eq!(redirected.handle(), b);
        assert!(!Rc::ptr_eq(&redirected, &wa));
        assert!(!Rc::ptr_eq(&redirected, &wb));
        assert!(Rc::ptr_eq(&cache.lookup(b).unwrap(), &wb));
    }

    #[test]
    fn replacement_does_not_intern_the_new_handle() {
        let (sim, context, cache) = setup();
        let a = sim.add_value(context, ValueKind::Load, "a").unwrap();
        let b = sim.add_value(context, ValueKind::Load, "b").unwrap();
        cache.get_or_create(a).unwrap();

        handle_item_replaced(cache.cookie(), a, b).unwrap();
        assert_eq!(cache.len(), 1);
        assert!(cache.lookup(b).is_none());
    }

    #[test]
    fn deleting_the_replacement_evicts_redirected_entries() {
        let (sim, context, cache) = setup();
        let a = sim.add_value(context, ValueKind::Load, "a").unwrap();
        let b = sim.add_value(context, ValueKind::Load, "b").unwrap();
        let c = sim.add_value(context, ValueKind::Load, "c").unwrap();
        cache.get_or_create(a).unwrap();
        cache.get_or_create(c).unwrap();

        handle_item_replaced(cache.cookie(), a, b).unwrap();
        handle_item_replaced(cache.cookie(), c, b).unwrap();
        assert_eq!(cache.len(), 2);

        handle_item_deleted(cache.cookie(), b).unwrap();
        assert!(cache.is_empty());
    }

    #[test]
    fn chained_replacement_follows_through() {
        let (sim, context, cache) = setup();
        let a = sim.add_value(context, ValueKind::Load, "a").unwrap();
        let b = sim.add_value(context, ValueKind::Load, "b").unwrap();
        let c = sim.add_value(context, ValueKind::Phi, "c").unwrap();
        cache.get_or_create(a).unwrap();

        handle_item_replaced(cache.cookie(), a, b).unwrap();
        // `b` itself was never interned, but `a` now points at it
        handle_item_replaced(cache.cookie(), b, c).unwrap();
        assert_eq!(cache.lookup(a).unwrap().handle(), c);
        assert!(cache.lookup(b).is_some());

        handle_item_deleted(cache.cookie(), c).unwrap();
        assert!(cache.is_empty());
    }

    #[test]
    fn deleting_a_redirected_handle_leaves_the_replacement() {
        let (sim, context, cache) = setup();
        let a = sim.add_value(context, ValueKind::Load, "a").unwrap();
        let b = sim.add_value(context, ValueKind::Load, "b").unwrap();
        let c = sim.add_value(context, ValueKind::Load, "c").unwrap();
        cache.get_or_create(a).unwrap();
        let wb = cache.get_or_create(b).unwrap();

        handle_item_replaced(cache.cookie(), a, b).unwrap();
        handle_item_deleted(cache.cookie(), a).unwrap();
        assert!(cache.lookup(a).is_none());
        assert!(Rc::ptr_eq(&cache.lookup(b).unwrap(), &wb));

        // `a` no longer follows `b`
        cache.get_or_create(c).unwrap();
        handle_item_replaced(cache.cookie(), b, c).unwrap();
        assert!(cache.lookup(a).is_none());
    }

    #[test]
    fn foreign_or_dead_replacements_evict() {
        let (sim, context, cache) = setup();
        let elsewhere = sim.context_create();
        let a = sim.add_value(context, ValueKind::Load, "a").unwrap();
        let b = sim.add_value(context, ValueKind::Load, "b").unwrap();
        let foreign = sim.add_value(elsewhere, ValueKind::Load, "f").unwrap();
        let dead = sim.add_value(context, ValueKind::Load, "d").unwrap();
        sim.delete_value(dead).unwrap();
        cache.get_or_create(a).unwrap();
        cache.get_or_create(b).unwrap();

        handle_item_replaced(cache.cookie(), a, foreign).unwrap();
        assert!(cache.lookup(a).is_none());
        handle_item_replaced(cache.cookie(), b, dead).unwrap();
        assert!(cache.lookup(b).is_none());
    }

    #[test]
    fn dropping_the_cache_disarms_it() {
        let (sim, context, cache) = setup();
        let cookie = cache.cookie();
        drop(cache);
        assert!(!is_registered(cookie));
        assert_eq!(sim.registered_cache_count(context), 0);
    }
}
