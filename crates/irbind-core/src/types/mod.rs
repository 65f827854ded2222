//! The type family.

use std::fmt;
use std::rc::Rc;

use irbind_sys::{ContextRef, NativeApi, NativeResult, TypeKind, TypeRef};

use crate::dispatch::{KindFamily, Wrapped};

/// Concrete class of a type.
///
/// Scalar kinds have no dedicated class; they land in `Type` together with
/// the decoded kind, or `None` for tags this crate does not know.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeClass {
    Type(Option<TypeKind>),
    Integer,
    Function,
    Struct,
    Array,
    Pointer,
    Vector,
}

impl TypeClass {
    pub fn is_sequential(self) -> bool {
        matches!(self, TypeClass::Array | TypeClass::Vector)
    }

    pub fn is_aggregate(self) -> bool {
        self.is_sequential() || self == TypeClass::Struct
    }

    /// The native kind, when it is known.
    pub fn kind(self) -> Option<TypeKind> {
        match self {
            TypeClass::Type(kind) => kind,
            TypeClass::Integer => Some(TypeKind::Integer),
            TypeClass::Function => Some(TypeKind::Function),
            TypeClass::Struct => Some(TypeKind::Struct),
            TypeClass::Array => Some(TypeKind::Array),
            TypeClass::Pointer => Some(TypeKind::Pointer),
            TypeClass::Vector => Some(TypeKind::Vector),
        }
    }
}

pub struct TypeFamily;

impl KindFamily for TypeFamily {
    type Handle = TypeRef;
    type Class = TypeClass;

    fn owning_context(api: &dyn NativeApi, handle: TypeRef) -> NativeResult<ContextRef> {
        api.type_context(handle)
    }

    fn kind_tag(api: &dyn NativeApi, handle: TypeRef) -> NativeResult<u32> {
        api.type_kind(handle)
    }

    fn classify(tag: u32) -> TypeClass {
        match TypeKind::from_raw(tag) {
            Some(TypeKind::Integer) => TypeClass::Integer,
            Some(TypeKind::Function) => TypeClass::Function,
            Some(TypeKind::Struct) => TypeClass::Struct,
            Some(TypeKind::Array) => TypeClass::Array,
            Some(TypeKind::Pointer) => TypeClass::Pointer,
            Some(TypeKind::Vector) => TypeClass::Vector,
            other => TypeClass::Type(other),
        }
    }

    fn is_fallback(class: TypeClass) -> bool {
        class == TypeClass::Type(None)
    }
}

/// Interned wrapper of a native type.
pub struct Type {
    context: ContextRef,
    handle: TypeRef,
    class: TypeClass,
}

impl Type {
    pub fn handle(&self) -> TypeRef {
        self.handle
    }

    pub fn class(&self) -> TypeClass {
        self.class
    }

    pub fn context(&self) -> ContextRef {
        self.context
    }

    pub fn kind(&self) -> Option<TypeKind> {
        self.class.kind()
    }
}

impl Wrapped for Type {
    type Family = TypeFamily;

    fn construct(
        _api: Rc<dyn NativeApi>,
        context: ContextRef,
        handle: TypeRef,
        class: TypeClass,
    ) -> Self {
        Type {
            context,
            handle,
            class,
        }
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Type")
            .field("handle", &self.handle)
            .field("class", &self.class)
            .field("context", &self.context)
            .finish()
    }
}

base_wrapper!(Type);

typed_views! {
    Type, TypeClass;

    IntegerType => |c| c == TypeClass::Integer;
    FunctionType => |c| c == TypeClass::Function;
    StructType => |c| c == TypeClass::Struct;
    ArrayType => |c| c == TypeClass::Array;
    PointerType => |c| c == TypeClass::Pointer;
    VectorType => |c| c == TypeClass::Vector;
    SequentialType => |c| c.is_sequential();
    AggregateType => |c| c.is_aggregate();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_kinds_get_classes() {
        assert_eq!(TypeFamily::classify(TypeKind::Struct.as_raw()), TypeClass::Struct);
        assert_eq!(TypeFamily::classify(TypeKind::Integer.as_raw()), TypeClass::Integer);
        assert_eq!(
            TypeFamily::classify(TypeKind::Double.as_raw()),
            TypeClass::Type(Some(TypeKind::Double))
        );
    }

    #[test]
    fn retired_and_future_tags_are_generic() {
        assert_eq!(TypeFamily::classify(15), TypeClass::Type(None));
        assert_eq!(TypeFamily::classify(99), TypeClass::Type(None));
        assert!(TypeFamily::is_fallback(TypeClass::Type(None)));
        assert!(!TypeFamily::is_fallback(TypeClass::Type(Some(TypeKind::Void))));
    }

    #[test]
    fn aggregates() {
        assert!(TypeClass::Array.is_sequential());
        assert!(TypeClass::Vector.is_aggregate());
        assert!(TypeClass::Struct.is_aggregate());
        assert!(!TypeClass::Struct.is_sequential());
        assert!(!TypeClass::Pointer.is_aggregate());
        assert_eq!(TypeClass::Pointer.kind(), Some(TypeKind::Pointer));
    }
}
