//! Handle to wrapper interning.
//!
//! A `HandleInterningMap` guarantees that, for as long as an entry exists,
//! every lookup of the same handle returns the very same `Rc`. Construction
//! of new wrappers is delegated to an [`ItemFactory`], invoked at most once
//! per miss.

use std::cell::RefCell;
use std::rc::Rc;

use irbind_sys::RawHandle;
use rustc_hash::FxHashMap;

use crate::error::{BindError, BindResult};

/// Builds the wrapper for a handle seen for the first time.
pub trait ItemFactory {
    type Handle: RawHandle;
    type Item;

    fn create(&self, handle: Self::Handle) -> BindResult<Self::Item>;
}

pub struct HandleInterningMap<F: ItemFactory> {
    factory: F,
    items: RefCell<FxHashMap<F::Handle, Rc<F::Item>>>,
}

impl<F: ItemFactory> HandleInterningMap<F> {
    pub fn new(factory: F) -> Self {
        Self::with_capacity(factory, 0)
    }

    pub fn with_capacity(factory: F, capacity: usize) -> Self {
        HandleInterningMap {
            factory,
            items: RefCell::new(FxHashMap::with_capacity_and_hasher(
                capacity,
                Default::default(),
            )),
        }
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// Returns the interned wrapper for `handle`, creating it on a miss.
    ///
    /// The table is not borrowed while the factory runs, so a native callback
    /// fired from inside construction can still update it.
    pub fn get_or_create(&self, handle: F::Handle) -> BindResult<Rc<F::Item>> {
        if handle.is_null() {
            return Err(BindError::NullHandle {
                family: F::Handle::FAMILY,
            });
        }

        if let Some(existing) = self.lookup(handle) {
            return Ok(existing);
        }

        let created = Rc::new(self.factory.create(handle)?);
        log::trace!("interned {}", handle);

        let mut items = self.items.borrow_mut();
        let entry = items.entry(handle).or_insert(created);
        Ok(Rc::clone(entry))
    }

    /// Read-only probe; never constructs.
    pub fn lookup(&self, handle: F::Handle) -> Option<Rc<F::Item>> {
        self.items.borrow().get(&handle).cloned()
    }

    pub fn contains(&self, handle: F::Handle) -> bool {
        self.items.borrow().contains_key(&handle)
    }

    /// Evicts `handle`. Evicting an absent handle is a no-op.
    pub fn remove(&self, handle: F::Handle) -> Option<Rc<F::Item>> {
        self.items.borrow_mut().remove(&handle)
    }

    /// Points the entry for `handle` at `item`, replacing whatever was there.
    pub fn rebind(&self, handle: F::Handle, item: Rc<F::Item>) -> Option<Rc<F::Item>> {
        self.items.borrow_mut().insert(handle, item)
    }

    pub fn clear(&self) {
        // Drop the wrappers after the borrow is released.
        let drained: Vec<_> = self.items.borrow_mut().drain().collect();
        drop(drained);
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    /// Snapshot of every interned wrapper, in no particular order.
    pub fn items(&self) -> Vec<Rc<F::Item>> {
        self.items.borrow().values().cloned().collect()
    }
}
