//! Kind tag spaces reported by the native library.
//!
//! The numbering mirrors the native library's internal enumerations. Tags the
//! current tables do not name are still valid: newer native versions add
//! kinds, and the wrapper layer is expected to degrade gracefully on them.

use serde::{Deserialize, Serialize};

macro_rules! tag_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident = $value:expr,)*
        }
    ) => {
        $(#[$meta])*
        #[repr(u32)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($(#[$vmeta])* $variant = $value,)*
        }

        impl $name {
            /// Every tag this table names, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant,)*];

            /// Decodes a raw tag. `None` means the tag is not in this table.
            pub fn from_raw(raw: u32) -> Option<Self> {
                match raw {
                    $(x if x == ($value) => Some($name::$variant),)*
                    _ => None,
                }
            }

            pub fn as_raw(self) -> u32 {
                self as u32
            }
        }
    };
}

/// Position of the bare `Instruction` marker. Opcode tags follow it.
pub const INSTRUCTION_MARKER: u32 = 24;

tag_enum! {
    /// Native value IDs.
    pub enum ValueKind {
        Function = 0,
        GlobalAlias = 1,
        GlobalIFunc = 2,
        GlobalVariable = 3,
        BlockAddress = 4,
        ConstantExpr = 5,
        ConstantArray = 6,
        ConstantStruct = 7,
        ConstantVector = 8,
        UndefValue = 9,
        ConstantAggregateZero = 10,
        ConstantDataArray = 11,
        ConstantDataVector = 12,
        ConstantInt = 13,
        ConstantFP = 14,
        ConstantPointerNull = 15,
        ConstantTokenNone = 16,
        Argument = 17,
        BasicBlock = 18,
        MetadataAsValue = 19,
        InlineAsm = 20,
        MemoryUse = 21,
        MemoryDef = 22,
        MemoryPhi = 23,
        Instruction = INSTRUCTION_MARKER,

        // terminators
        Return = INSTRUCTION_MARKER + 1,
        Branch = INSTRUCTION_MARKER + 2,
        Switch = INSTRUCTION_MARKER + 3,
        IndirectBranch = INSTRUCTION_MARKER + 4,
        Invoke = INSTRUCTION_MARKER + 5,
        Resume = INSTRUCTION_MARKER + 6,
        Unreachable = INSTRUCTION_MARKER + 7,
        CleanupReturn = INSTRUCTION_MARKER + 8,
        CatchReturn = INSTRUCTION_MARKER + 9,
        CatchSwitch = INSTRUCTION_MARKER + 10,

        // binary operators
        Add = INSTRUCTION_MARKER + 11,
        FAdd = INSTRUCTION_MARKER + 12,
        Sub = INSTRUCTION_MARKER + 13,
        FSub = INSTRUCTION_MARKER + 14,
        Mul = INSTRUCTION_MARKER + 15,
        FMul = INSTRUCTION_MARKER + 16,
        UDiv = INSTRUCTION_MARKER + 17,
        SDiv = INSTRUCTION_MARKER + 18,
        FDiv = INSTRUCTION_MARKER + 19,
        URem = INSTRUCTION_MARKER + 20,
        SRem = INSTRUCTION_MARKER + 21,
        FRem = INSTRUCTION_MARKER + 22,

        // logical operators
        Shl = INSTRUCTION_MARKER + 23,
        LShr = INSTRUCTION_MARKER + 24,
        AShr = INSTRUCTION_MARKER + 25,
        And = INSTRUCTION_MARKER + 26,
        Or = INSTRUCTION_MARKER + 27,
        Xor = INSTRUCTION_MARKER + 28,

        // memory operators
        Alloca = INSTRUCTION_MARKER + 29,
        Load = INSTRUCTION_MARKER + 30,
        Store = INSTRUCTION_MARKER + 31,
        GetElementPtr = INSTRUCTION_MARKER + 32,
        Fence = INSTRUCTION_MARKER + 33,
        AtomicCmpXchg = INSTRUCTION_MARKER + 34,
        AtomicRMW = INSTRUCTION_MARKER + 35,

        // conversions
        Trunc = INSTRUCTION_MARKER + 36,
        ZExt = INSTRUCTION_MARKER + 37,
        SExt = INSTRUCTION_MARKER + 38,
        FPToUI = INSTRUCTION_MARKER + 39,
        FPToSI = INSTRUCTION_MARKER + 40,
        UIToFP = INSTRUCTION_MARKER + 41,
        SIToFP = INSTRUCTION_MARKER + 42,
        FPTrunc = INSTRUCTION_MARKER + 43,
        FPExt = INSTRUCTION_MARKER + 44,
        PtrToInt = INSTRUCTION_MARKER + 45,
        IntToPtr = INSTRUCTION_MARKER + 46,
        BitCast = INSTRUCTION_MARKER + 47,
        AddrSpaceCast = INSTRUCTION_MARKER + 48,

        // exception pads
        CleanupPad = INSTRUCTION_MARKER + 49,
        CatchPad = INSTRUCTION_MARKER + 50,

        ICmp = INSTRUCTION_MARKER + 51,
        FCmp = INSTRUCTION_MARKER + 52,
        Phi = INSTRUCTION_MARKER + 53,
        Call = INSTRUCTION_MARKER + 54,
        Select = INSTRUCTION_MARKER + 55,
        UserOp1 = INSTRUCTION_MARKER + 56,
        UserOp2 = INSTRUCTION_MARKER + 57,
        VaArg = INSTRUCTION_MARKER + 58,
        ExtractElement = INSTRUCTION_MARKER + 59,
        InsertElement = INSTRUCTION_MARKER + 60,
        ShuffleVector = INSTRUCTION_MARKER + 61,
        ExtractValue = INSTRUCTION_MARKER + 62,
        InsertValue = INSTRUCTION_MARKER + 63,
        LandingPad = INSTRUCTION_MARKER + 64,
    }
}

impl ValueKind {
    /// First tag of the contiguous constant range.
    pub const CONSTANT_FIRST: u32 = ValueKind::Function as u32;
    /// Last tag of the contiguous constant range (inclusive).
    pub const CONSTANT_LAST: u32 = ValueKind::ConstantTokenNone as u32;
    pub const CONSTANT_DATA_FIRST: u32 = ValueKind::UndefValue as u32;
    pub const CONSTANT_DATA_LAST: u32 = ValueKind::ConstantTokenNone as u32;
    pub const CONSTANT_AGGREGATE_FIRST: u32 = ValueKind::ConstantArray as u32;
    pub const CONSTANT_AGGREGATE_LAST: u32 = ValueKind::ConstantVector as u32;

    pub fn is_constant_tag(raw: u32) -> bool {
        (Self::CONSTANT_FIRST..=Self::CONSTANT_LAST).contains(&raw)
    }

    /// True for opcode tags, i.e. anything strictly past the bare marker.
    pub fn is_instruction_tag(raw: u32) -> bool {
        raw > INSTRUCTION_MARKER
    }
}

tag_enum! {
    /// Native metadata IDs.
    pub enum MetadataKind {
        MDString = 0,
        ConstantAsMetadata = 1,
        LocalAsMetadata = 2,
        DistinctMDOperandPlaceholder = 3,
        DIArgList = 4,
        MDTuple = 5,
        DILocation = 6,
        DIExpression = 7,
        DIGlobalVariableExpression = 8,
        GenericDINode = 9,
        DISubrange = 10,
        DIEnumerator = 11,
        DIBasicType = 12,
        DIDerivedType = 13,
        DICompositeType = 14,
        DISubroutineType = 15,
        DIFile = 16,
        DICompileUnit = 17,
        DISubprogram = 18,
        DILexicalBlock = 19,
        DILexicalBlockFile = 20,
        DINamespace = 21,
        DIModule = 22,
        DITemplateTypeParameter = 23,
        DITemplateValueParameter = 24,
        DIGlobalVariable = 25,
        DILocalVariable = 26,
        DILabel = 27,
        DIObjCProperty = 28,
        DIImportedEntity = 29,
        DIAssignID = 30,
        DIMacro = 31,
        DIMacroFile = 32,
        DICommonBlock = 33,
        DIStringType = 34,
        DIGenericSubrange = 35,
    }
}

tag_enum! {
    /// Native type kinds. Tag 15 is retired and intentionally absent.
    pub enum TypeKind {
        Void = 0,
        Half = 1,
        Float = 2,
        Double = 3,
        X86Fp80 = 4,
        Fp128 = 5,
        PpcFp128 = 6,
        Label = 7,
        Integer = 8,
        Function = 9,
        Struct = 10,
        Array = 11,
        Pointer = 12,
        Vector = 13,
        Metadata = 14,
        Token = 16,
        ScalableVector = 17,
        BFloat = 18,
        X86Amx = 19,
        TargetExt = 20,
    }
}

/// Severity of a diagnostic raised by the native library. Lower is more severe.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    Error = 0,
    Warning = 1,
    Remark = 2,
    Note = 3,
}

impl DiagnosticSeverity {
    /// True when `self` is as severe as `threshold` or more.
    pub fn is_at_least(self, threshold: DiagnosticSeverity) -> bool {
        (self as u32) <= (threshold as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_kind_tags_follow_the_instruction_marker() {
        assert_eq!(ValueKind::Return.as_raw(), INSTRUCTION_MARKER + 1);
        assert_eq!(ValueKind::LandingPad.as_raw(), 88);
        assert_eq!(ValueKind::from_raw(37), Some(ValueKind::Sub));
        assert_eq!(ValueKind::from_raw(89), None);
        assert!(ValueKind::is_instruction_tag(89));
        assert!(!ValueKind::is_instruction_tag(INSTRUCTION_MARKER));
    }

    #[test]
    fn every_table_entry_decodes_to_itself() {
        for kind in ValueKind::ALL {
            assert_eq!(ValueKind::from_raw(kind.as_raw()), Some(*kind));
        }
        for kind in MetadataKind::ALL {
            assert_eq!(MetadataKind::from_raw(kind.as_raw()), Some(*kind));
        }
        for kind in TypeKind::ALL {
            assert_eq!(TypeKind::from_raw(kind.as_raw()), Some(*kind));
        }
    }

    #[test]
    fn constant_range_covers_globals_and_data() {
        assert!(ValueKind::is_constant_tag(ValueKind::Function.as_raw()));
        assert!(ValueKind::is_constant_tag(ValueKind::ConstantTokenNone.as_raw()));
        assert!(!ValueKind::is_constant_tag(ValueKind::Argument.as_raw()));
    }

    #[test]
    fn retired_type_tag_is_unknown() {
        assert_eq!(TypeKind::from_raw(15), None);
    }

    #[test]
    fn severity_ordering() {
        assert!(DiagnosticSeverity::Error.is_at_least(DiagnosticSeverity::Warning));
        assert!(DiagnosticSeverity::Warning.is_at_least(DiagnosticSeverity::Warning));
        assert!(!DiagnosticSeverity::Note.is_at_least(DiagnosticSeverity::Remark));
    }
}
