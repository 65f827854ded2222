use super::{Metadata, MetadataClass};

typed_views! {
    Metadata, MetadataClass;

    MDString => |c| c == MetadataClass::MDString;
    ValueAsMetadata => |c| c.is_value_as_metadata();
    ConstantAsMetadata => |c| c == MetadataClass::ConstantAsMetadata;
    LocalAsMetadata => |c| c == MetadataClass::LocalAsMetadata;
    DistinctMDOperandPlaceholder => |c| c == MetadataClass::DistinctMDOperandPlaceholder;
    DIArgList => |c| c == MetadataClass::DIArgList;

    /// Any node with operands.
    MDNode => |c| c.is_md_node();
    MDTuple => |c| c == MetadataClass::MDTuple;
    DILocation => |c| c == MetadataClass::DILocation;
    DIExpression => |c| c == MetadataClass::DIExpression;
    DIGlobalVariableExpression => |c| c == MetadataClass::DIGlobalVariableExpression;
    DIAssignID => |c| c == MetadataClass::DIAssignID;

    /// Any debug-info node.
    DINode => |c| c.is_di_node();
    GenericDINode => |c| c == MetadataClass::GenericDINode;
    DISubrange => |c| c == MetadataClass::DISubrange;
    DIGenericSubrange => |c| c == MetadataClass::DIGenericSubrange;
    DIEnumerator => |c| c == MetadataClass::DIEnumerator;
    DIImportedEntity => |c| c == MetadataClass::DIImportedEntity;
    DIObjCProperty => |c| c == MetadataClass::DIObjCProperty;
    DILabel => |c| c == MetadataClass::DILabel;

    DIScope => |c| c.is_scope();
    DILocalScope => |c| c.is_local_scope();
    DIFile => |c| c == MetadataClass::DIFile;
    DICompileUnit => |c| c == MetadataClass::DICompileUnit;
    DISubprogram => |c| c == MetadataClass::DISubprogram;
    DILexicalBlock => |c| c == MetadataClass::DILexicalBlock;
    DILexicalBlockFile => |c| c == MetadataClass::DILexicalBlockFile;
    DINamespace => |c| c == MetadataClass::DINamespace;
    DIModule => |c| c == MetadataClass::DIModule;
    DICommonBlock => |c| c == MetadataClass::DICommonBlock;

    DIType => |c| c.is_type();
    DIBasicType => |c| c == MetadataClass::DIBasicType;
    DIDerivedType => |c| c == MetadataClass::DIDerivedType;
    DICompositeType => |c| c == MetadataClass::DICompositeType;
    DISubroutineType => |c| c == MetadataClass::DISubroutineType;
    DIStringType => |c| c == MetadataClass::DIStringType;

    DIVariable => |c| c.is_variable();
    DIGlobalVariable => |c| c == MetadataClass::DIGlobalVariable;
    DILocalVariable => |c| c == MetadataClass::DILocalVariable;

    DITemplateParameter => |c| c.is_template_parameter();
    DITemplateTypeParameter => |c| c == MetadataClass::DITemplateTypeParameter;
    DITemplateValueParameter => |c| c == MetadataClass::DITemplateValueParameter;

    DIMacroNode => |c| c.is_macro_node();
    DIMacro => |c| c == MetadataClass::DIMacro;
    DIMacroFile => |c| c == MetadataClass::DIMacroFile;
}
