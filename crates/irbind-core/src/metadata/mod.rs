//! The metadata family: strings, value bridges, tuples and debug-info nodes.

#![allow(clippy::upper_case_acronyms)]

mod views;

use std::fmt;
use std::rc::Rc;

use irbind_sys::{ContextRef, MetadataKind, MetadataRef, NativeApi, NativeResult};

use crate::dispatch::{KindFamily, Wrapped};
use crate::error::BindResult;

pub use views::*;

macro_rules! metadata_classes {
    ($($name:ident),* $(,)?) => {
        /// Concrete class of a metadata node. `Metadata` is the catch-all for
        /// tags this crate does not know.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum MetadataClass {
            Metadata,
            $($name,)*
        }

        impl MetadataClass {
            pub fn from_kind(kind: MetadataKind) -> MetadataClass {
                match kind {
                    $(MetadataKind::$name => MetadataClass::$name,)*
                }
            }
        }
    };
}

metadata_classes! {
    MDString,
    ConstantAsMetadata,
    LocalAsMetadata,
    DistinctMDOperandPlaceholder,
    DIArgList,
    MDTuple,
    DILocation,
    DIExpression,
    DIGlobalVariableExpression,
    GenericDINode,
    DISubrange,
    DIEnumerator,
    DIBasicType,
    DIDerivedType,
    DICompositeType,
    DISubroutineType,
    DIFile,
    DICompileUnit,
    DISubprogram,
    DILexicalBlock,
    DILexicalBlockFile,
    DINamespace,
    DIModule,
    DITemplateTypeParameter,
    DITemplateValueParameter,
    DIGlobalVariable,
    DILocalVariable,
    DILabel,
    DIObjCProperty,
    DIImportedEntity,
    DIAssignID,
    DIMacro,
    DIMacroFile,
    DICommonBlock,
    DIStringType,
    DIGenericSubrange,
}

impl MetadataClass {
    pub fn is_value_as_metadata(self) -> bool {
        matches!(
            self,
            MetadataClass::ConstantAsMetadata | MetadataClass::LocalAsMetadata
        )
    }

    /// Nodes with operands, i.e. everything but strings, value bridges and
    /// the placeholder kinds.
    pub fn is_md_node(self) -> bool {
        !matches!(
            self,
            MetadataClass::Metadata
                | MetadataClass::MDString
                | MetadataClass::ConstantAsMetadata
                | MetadataClass::LocalAsMetadata
                | MetadataClass::DistinctMDOperandPlaceholder
                | MetadataClass::DIArgList
        )
    }

    pub fn is_di_node(self) -> bool {
        self.is_md_node()
            && !matches!(
                self,
                MetadataClass::MDTuple
                    | MetadataClass::DILocation
                    | MetadataClass::DIExpression
                    | MetadataClass::DIGlobalVariableExpression
                    | MetadataClass::DIAssignID
            )
    }

    pub fn is_type(self) -> bool {
        matches!(
            self,
            MetadataClass::DIBasicType
                | MetadataClass::DIDerivedType
                | MetadataClass::DICompositeType
                | MetadataClass::DISubroutineType
                | MetadataClass::DIStringType
        )
    }

    pub fn is_local_scope(self) -> bool {
        matches!(
            self,
            MetadataClass::DISubprogram
                | MetadataClass::DILexicalBlock
                | MetadataClass::DILexicalBlockFile
        )
    }

    pub fn is_scope(self) -> bool {
        self.is_type()
            || self.is_local_scope()
            || matches!(
                self,
                MetadataClass::DIFile
                    | MetadataClass::DICompileUnit
                    | MetadataClass::DINamespace
                    | MetadataClass::DIModule
                    | MetadataClass::DICommonBlock
            )
    }

    pub fn is_variable(self) -> bool {
        matches!(
            self,
            MetadataClass::DIGlobalVariable | MetadataClass::DILocalVariable
        )
    }

    pub fn is_template_parameter(self) -> bool {
        matches!(
            self,
            MetadataClass::DITemplateTypeParameter | MetadataClass::DITemplateValueParameter
        )
    }

    pub fn is_macro_node(self) -> bool {
        matches!(self, MetadataClass::DIMacro | MetadataClass::DIMacroFile)
    }
}

pub struct MetadataFamily;

impl KindFamily for MetadataFamily {
    type Handle = MetadataRef;
    type Class = MetadataClass;

    fn owning_context(api: &dyn NativeApi, handle: MetadataRef) -> NativeResult<ContextRef> {
        api.metadata_context(handle)
    }

    fn kind_tag(api: &dyn NativeApi, handle: MetadataRef) -> NativeResult<u32> {
        api.metadata_kind(handle)
    }

    fn classify(tag: u32) -> MetadataClass {
        MetadataKind::from_raw(tag)
            .map(MetadataClass::from_kind)
            .unwrap_or(MetadataClass::Metadata)
    }

    fn is_fallback(class: MetadataClass) -> bool {
        class == MetadataClass::Metadata
    }
}

/// Interned wrapper of a native metadata node.
pub struct Metadata {
    api: Rc<dyn NativeApi>,
    context: ContextRef,
    handle: MetadataRef,
    class: MetadataClass,
}

impl Metadata {
    pub fn handle(&self) -> MetadataRef {
        self.handle
    }

    pub fn class(&self) -> MetadataClass {
        self.class
    }

    pub fn context(&self) -> ContextRef {
        self.context
    }

    /// Whether the node is a forward declaration awaiting replacement.
    pub fn is_temporary(&self) -> BindResult<bool> {
        Ok(self.api.metadata_is_temporary(self.handle)?)
    }
}

impl Wrapped for Metadata {
    type Family = MetadataFamily;

    fn construct(
        api: Rc<dyn NativeApi>,
        context: ContextRef,
        handle: MetadataRef,
        class: MetadataClass,
    ) -> Self {
        Metadata {
            api,
            context,
            handle,
            class,
        }
    }
}

impl fmt::Debug for Metadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Metadata")
            .field("handle", &self.handle)
            .field("class", &self.class)
            .field("context", &self.context)
            .finish()
    }
}

base_wrapper!(Metadata);
