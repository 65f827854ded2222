//! Kind-driven reconstruction of wrapper subtypes.
//!
//! The concrete wrapper type of a handle lives in native memory as a small
//! integer tag, not in any Rust type. Each wrapper family describes its tag
//! space once through [`KindFamily`]; [`dispatch`] and
//! [`KindDispatchFactory`] implement the shared algorithm:
//!
//! 1. reject handles owned by another context,
//! 2. read the tag from the native side (never from a cache),
//! 3. classify it, specific tags first, then coarse ranges, then the
//!    family's generic fallback,
//! 4. build the wrapper for that class.

use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

use irbind_sys::{ContextRef, NativeApi, NativeResult, RawHandle};

use crate::error::{BindError, BindResult};
use crate::interning::ItemFactory;

/// A family of wrappers sharing one tag space.
pub trait KindFamily {
    type Handle: RawHandle;
    type Class: Copy + fmt::Debug;

    fn owning_context(api: &dyn NativeApi, handle: Self::Handle) -> NativeResult<ContextRef>;

    fn kind_tag(api: &dyn NativeApi, handle: Self::Handle) -> NativeResult<u32>;

    /// Total mapping from tag to class. Must never fail.
    fn classify(tag: u32) -> Self::Class;

    /// Whether `class` is the family's catch-all.
    fn is_fallback(class: Self::Class) -> bool;
}

/// Validates ownership and classifies `handle`.
pub fn dispatch<K: KindFamily>(
    api: &dyn NativeApi,
    context: ContextRef,
    handle: K::Handle,
) -> BindResult<K::Class> {
    let owner = K::owning_context(api, handle)?;
    if owner != context {
        return Err(BindError::CrossSession {
            family: K::Handle::FAMILY,
            expected: context,
            found: owner,
        });
    }

    let tag = K::kind_tag(api, handle)?;
    let class = K::classify(tag);
    if K::is_fallback(class) {
        log::debug!("{} has unrecognized kind tag {}, using {:?}", handle, tag, class);
    }
    Ok(class)
}

/// A wrapper type that can be built from a classified handle.
pub trait Wrapped: Sized {
    type Family: KindFamily;

    fn construct(
        api: Rc<dyn NativeApi>,
        context: ContextRef,
        handle: <Self::Family as KindFamily>::Handle,
        class: <Self::Family as KindFamily>::Class,
    ) -> Self;
}

/// The interning factory shared by every family.
pub struct KindDispatchFactory<W: Wrapped> {
    api: Rc<dyn NativeApi>,
    context: ContextRef,
    _wrapper: PhantomData<fn() -> W>,
}

impl<W: Wrapped> KindDispatchFactory<W> {
    pub fn new(api: Rc<dyn NativeApi>, context: ContextRef) -> Self {
        KindDispatchFactory {
            api,
            context,
            _wrapper: PhantomData,
        }
    }

    pub fn context(&self) -> ContextRef {
        self.context
    }
}

impl<W: Wrapped> ItemFactory for KindDispatchFactory<W> {
    type Handle = <W::Family as KindFamily>::Handle;
    type Item = W;

    fn create(&self, handle: Self::Handle) -> BindResult<W> {
        let class = dispatch::<W::Family>(&*self.api, self.context, handle)?;
        Ok(W::construct(Rc::clone(&self.api), self.context, handle, class))
    }
}
