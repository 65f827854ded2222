//! Typed access to interned wrappers.
//!
//! Each family has one base wrapper (`Value`, `Metadata`, `Type`) that is
//! interned as an `Rc`. Subtypes are zero-cost views over that `Rc`: a view
//! can only be obtained when the class recorded at construction belongs to
//! it, so `Session::resolve::<Branch>` fails instead of handing back a
//! `Load`.

use std::rc::Rc;

use irbind_sys::RawHandle;

use crate::error::BindResult;
use crate::session::Session;

/// A base wrapper stored in one of the session's interning maps.
pub trait Interned: Sized {
    type Handle: RawHandle;

    /// Resolves through the session's map for this family. Null yields `None`.
    fn resolve_in(session: &Session, handle: Self::Handle) -> BindResult<Option<Rc<Self>>>;

    /// Name of the concrete class, for error reporting.
    fn class_name(&self) -> String;
}

/// Anything `Session::resolve` can produce: the base `Rc` itself or a view.
pub trait Wrapper: Sized {
    type Base: Interned;

    const NAME: &'static str;

    /// Narrows `base`, handing it back unchanged when the class does not fit.
    fn from_base(base: Rc<Self::Base>) -> Result<Self, Rc<Self::Base>>;
}

/// Declares subtype views over a base wrapper.
///
/// Each entry names the view and the predicate over the base's class that
/// admits it.
macro_rules! typed_views {
    ($base:ident, $class:ty; $( $(#[$meta:meta])* $name:ident => |$c:ident| $accepts:expr; )*) => {
        $(
            $(#[$meta])*
            #[derive(Clone)]
            pub struct $name(::std::rc::Rc<$base>);

            impl $name {
                pub fn accepts($c: $class) -> bool {
                    $accepts
                }

                pub fn as_rc(&self) -> &::std::rc::Rc<$base> {
                    &self.0
                }

                pub fn into_inner(self) -> ::std::rc::Rc<$base> {
                    self.0
                }
            }

            impl ::std::ops::Deref for $name {
                type Target = $base;

                fn deref(&self) -> &$base {
                    &self.0
                }
            }

            impl ::std::fmt::Debug for $name {
                fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                    f.debug_tuple(stringify!($name)).field(&*self.0).finish()
                }
            }

            impl $crate::wrapper::Wrapper for $name {
                type Base = $base;

                const NAME: &'static str = stringify!($name);

                fn from_base(
                    base: ::std::rc::Rc<$base>,
                ) -> ::std::result::Result<Self, ::std::rc::Rc<$base>> {
                    if Self::accepts(base.class()) {
                        Ok($name(base))
                    } else {
                        Err(base)
                    }
                }
            }
        )*
    };
}

/// Implements `Wrapper` for the base `Rc` itself, which accepts every class.
macro_rules! base_wrapper {
    ($base:ident) => {
        impl $crate::wrapper::Wrapper for ::std::rc::Rc<$base> {
            type Base = $base;

            const NAME: &'static str = stringify!($base);

            fn from_base(
                base: ::std::rc::Rc<$base>,
            ) -> ::std::result::Result<Self, ::std::rc::Rc<$base>> {
                Ok(base)
            }
        }
    };
}
