//! The value family: constants, globals, arguments, blocks and instructions.

mod views;

use std::fmt;
use std::rc::Rc;

use irbind_sys::{ContextRef, NativeApi, NativeResult, ValueKind, ValueRef};

use crate::dispatch::{KindFamily, Wrapped};
use crate::error::BindResult;

pub use views::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    FAdd,
    Sub,
    FSub,
    Mul,
    FMul,
    UDiv,
    SDiv,
    FDiv,
    URem,
    SRem,
    FRem,
    Shl,
    LShr,
    AShr,
    And,
    Or,
    Xor,
}

impl BinaryOp {
    pub fn is_floating_point(self) -> bool {
        matches!(
            self,
            BinaryOp::FAdd | BinaryOp::FSub | BinaryOp::FMul | BinaryOp::FDiv | BinaryOp::FRem
        )
    }

    pub fn is_logical(self) -> bool {
        matches!(
            self,
            BinaryOp::Shl
                | BinaryOp::LShr
                | BinaryOp::AShr
                | BinaryOp::And
                | BinaryOp::Or
                | BinaryOp::Xor
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CastOp {
    Trunc,
    ZExt,
    SExt,
    FPToUI,
    FPToSI,
    UIToFP,
    SIToFP,
    FPTrunc,
    FPExt,
    PtrToInt,
    IntToPtr,
    BitCast,
    AddrSpaceCast,
}

/// Concrete class of a value, fixed when its wrapper is built.
///
/// `Value`, `Constant` and `Instruction` are the catch-alls for tags with no
/// dedicated class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueClass {
    Value,
    Argument,
    BasicBlock,
    MetadataAsValue,
    InlineAsm,

    // constants
    Constant,
    Function,
    GlobalAlias,
    GlobalIFunc,
    GlobalVariable,
    BlockAddress,
    ConstantExpression,
    ConstantArray,
    ConstantStruct,
    ConstantVector,
    UndefValue,
    ConstantAggregateZero,
    ConstantDataArray,
    ConstantDataVector,
    ConstantInt,
    ConstantFP,
    ConstantPointerNull,

    // instructions
    Instruction,
    Return,
    Branch,
    Switch,
    IndirectBranch,
    Invoke,
    Resume,
    Unreachable,
    CleanupReturn,
    CatchReturn,
    CatchSwitch,
    BinaryOperator(BinaryOp),
    Alloca,
    Load,
    Store,
    GetElementPtr,
    Fence,
    AtomicCmpXchg,
    AtomicRMW,
    Cast(CastOp),
    CleanupPad,
    CatchPad,
    ICmp,
    FCmp,
    Phi,
    Call,
    Select,
    UserOp1,
    UserOp2,
    VaArg,
    ExtractElement,
    InsertElement,
    ShuffleVector,
    ExtractValue,
    InsertValue,
    LandingPad,
}

impl ValueClass {
    /// The dedicated class for `kind`, if it has one.
    pub fn specific(kind: ValueKind) -> Option<ValueClass> {
        use ValueKind as K;

        let class = match kind {
            K::Argument => ValueClass::Argument,
            K::BasicBlock => ValueClass::BasicBlock,
            K::MetadataAsValue => ValueClass::MetadataAsValue,
            K::InlineAsm => ValueClass::InlineAsm,

            K::Function => ValueClass::Function,
            K::GlobalAlias => ValueClass::GlobalAlias,
            K::GlobalIFunc => ValueClass::GlobalIFunc,
            K::GlobalVariable => ValueClass::GlobalVariable,
            K::BlockAddress => ValueClass::BlockAddress,
            K::ConstantExpr => ValueClass::ConstantExpression,
            K::ConstantArray => ValueClass::ConstantArray,
            K::ConstantStruct => ValueClass::ConstantStruct,
            K::ConstantVector => ValueClass::ConstantVector,
            K::UndefValue => ValueClass::UndefValue,
            K::ConstantAggregateZero => ValueClass::ConstantAggregateZero,
            K::ConstantDataArray => ValueClass::ConstantDataArray,
            K::ConstantDataVector => ValueClass::ConstantDataVector,
            K::ConstantInt => ValueClass::ConstantInt,
            K::ConstantFP => ValueClass::ConstantFP,
            K::ConstantPointerNull => ValueClass::ConstantPointerNull,

            K::Return => ValueClass::Return,
            K::Branch => ValueClass::Branch,
            K::Switch => ValueClass::Switch,
            K::IndirectBranch => ValueClass::IndirectBranch,
            K::Invoke => ValueClass::Invoke,
            K::Resume => ValueClass::Resume,
            K::Unreachable => ValueClass::Unreachable,
            K::CleanupReturn => ValueClass::CleanupReturn,
            K::CatchReturn => ValueClass::CatchReturn,
            K::CatchSwitch => ValueClass::CatchSwitch,

            K::Add => ValueClass::BinaryOperator(BinaryOp::Add),
            K::FAdd => ValueClass::BinaryOperator(BinaryOp::FAdd),
            K::Sub => ValueClass::BinaryOperator(BinaryOp::Sub),
            K::FSub => ValueClass::BinaryOperator(BinaryOp::FSub),
            K::Mul => ValueClass::BinaryOperator(BinaryOp::Mul),
            K::FMul => ValueClass::BinaryOperator(BinaryOp::FMul),
            K::UDiv => ValueClass::BinaryOperator(BinaryOp::UDiv),
            K::SDiv => ValueClass::BinaryOperator(BinaryOp::SDiv),
            K::FDiv => ValueClass::BinaryOperator(BinaryOp::FDiv),
            K::URem => ValueClass::BinaryOperator(BinaryOp::URem),
            K::SRem => ValueClass::BinaryOperator(BinaryOp::SRem),
            K::FRem => ValueClass::BinaryOperator(BinaryOp::FRem),
            K::Shl => ValueClass::BinaryOperator(BinaryOp::Shl),
            K::LShr => ValueClass::BinaryOperator(BinaryOp::LShr),
            K::AShr => ValueClass::BinaryOperator(BinaryOp::AShr),
            K::And => ValueClass::BinaryOperator(BinaryOp::And),
            K::Or => ValueClass::BinaryOperator(BinaryOp::Or),
            K::Xor => ValueClass::BinaryOperator(BinaryOp::Xor),

            K::Alloca => ValueClass::Alloca,
            K::Load => ValueClass::Load,
            K::Store => ValueClass::Store,
            K::GetElementPtr => ValueClass::GetElementPtr,
            K::Fence => ValueClass::Fence,
            K::AtomicCmpXchg => ValueClass::AtomicCmpXchg,
            K::AtomicRMW => ValueClass::AtomicRMW,

            K::Trunc => ValueClass::Cast(CastOp::Trunc),
            K::ZExt => ValueClass::Cast(CastOp::ZExt),
            K::SExt => ValueClass::Cast(CastOp::SExt),
            K::FPToUI => ValueClass::Cast(CastOp::FPToUI),
            K::FPToSI => ValueClass::Cast(CastOp::FPToSI),
            K::UIToFP => ValueClass::Cast(CastOp::UIToFP),
            K::SIToFP => ValueClass::Cast(CastOp::SIToFP),
            K::FPTrunc => ValueClass::Cast(CastOp::FPTrunc),
            K::FPExt => ValueClass::Cast(CastOp::FPExt),
            K::PtrToInt => ValueClass::Cast(CastOp::PtrToInt),
            K::IntToPtr => ValueClass::Cast(CastOp::IntToPtr),
            K::BitCast => ValueClass::Cast(CastOp::BitCast),
            K::AddrSpaceCast => ValueClass::Cast(CastOp::AddrSpaceCast),

            K::CleanupPad => ValueClass::CleanupPad,
            K::CatchPad => ValueClass::CatchPad,
            K::ICmp => ValueClass::ICmp,
            K::FCmp => ValueClass::FCmp,
            K::Phi => ValueClass::Phi,
            K::Call => ValueClass::Call,
            K::Select => ValueClass::Select,
            K::UserOp1 => ValueClass::UserOp1,
            K::UserOp2 => ValueClass::UserOp2,
            K::VaArg => ValueClass::VaArg,
            K::ExtractElement => ValueClass::ExtractElement,
            K::InsertElement => ValueClass::InsertElement,
            K::ShuffleVector => ValueClass::ShuffleVector,
            K::ExtractValue => ValueClass::ExtractValue,
            K::InsertValue => ValueClass::InsertValue,
            K::LandingPad => ValueClass::LandingPad,

            K::ConstantTokenNone
            | K::MemoryUse
            | K::MemoryDef
            | K::MemoryPhi
            | K::Instruction => return None,
        };
        Some(class)
    }

    pub fn is_global_object(self) -> bool {
        matches!(
            self,
            ValueClass::Function | ValueClass::GlobalIFunc | ValueClass::GlobalVariable
        )
    }

    pub fn is_global_value(self) -> bool {
        self.is_global_object() || self == ValueClass::GlobalAlias
    }

    pub fn is_constant_data(self) -> bool {
        matches!(
            self,
            ValueClass::UndefValue
                | ValueClass::ConstantAggregateZero
                | ValueClass::ConstantDataArray
                | ValueClass::ConstantDataVector
                | ValueClass::ConstantInt
                | ValueClass::ConstantFP
                | ValueClass::ConstantPointerNull
        )
    }

    pub fn is_constant(self) -> bool {
        self.is_global_value()
            || self.is_constant_data()
            || matches!(
                self,
                ValueClass::Constant
                    | ValueClass::BlockAddress
                    | ValueClass::ConstantExpression
                    | ValueClass::ConstantArray
                    | ValueClass::ConstantStruct
                    | ValueClass::ConstantVector
            )
    }

    pub fn is_terminator(self) -> bool {
        matches!(
            self,
            ValueClass::Return
                | ValueClass::Branch
                | ValueClass::Switch
                | ValueClass::IndirectBranch
                | ValueClass::Invoke
                | ValueClass::Resume
                | ValueClass::Unreachable
                | ValueClass::CleanupReturn
                | ValueClass::CatchReturn
                | ValueClass::CatchSwitch
        )
    }

    pub fn is_binary_operator(self) -> bool {
        matches!(self, ValueClass::BinaryOperator(_))
    }

    pub fn is_cast(self) -> bool {
        matches!(self, ValueClass::Cast(_))
    }

    pub fn is_cmp(self) -> bool {
        matches!(self, ValueClass::ICmp | ValueClass::FCmp)
    }

    pub fn is_funclet_pad(self) -> bool {
        matches!(self, ValueClass::CleanupPad | ValueClass::CatchPad)
    }

    /// Single-operand instructions.
    pub fn is_unary_instruction(self) -> bool {
        self.is_cast()
            || matches!(
                self,
                ValueClass::Alloca | ValueClass::Load | ValueClass::VaArg | ValueClass::ExtractValue
            )
    }

    pub fn is_instruction(self) -> bool {
        match self {
            ValueClass::Value
            | ValueClass::Argument
            | ValueClass::BasicBlock
            | ValueClass::MetadataAsValue
            | ValueClass::InlineAsm => false,
            other => !other.is_constant(),
        }
    }
}

/// Tag space of [`ValueClass`].
pub struct ValueFamily;

impl KindFamily for ValueFamily {
    type Handle = ValueRef;
    type Class = ValueClass;

    fn owning_context(api: &dyn NativeApi, handle: ValueRef) -> NativeResult<ContextRef> {
        api.value_context(handle)
    }

    fn kind_tag(api: &dyn NativeApi, handle: ValueRef) -> NativeResult<u32> {
        api.value_kind(handle)
    }

    fn classify(tag: u32) -> ValueClass {
        if let Some(class) = ValueKind::from_raw(tag).and_then(ValueClass::specific) {
            return class;
        }

        if ValueKind::is_constant_tag(tag) {
            ValueClass::Constant
        } else if ValueKind::is_instruction_tag(tag) {
            ValueClass::Instruction
        } else {
            ValueClass::Value
        }
    }

    fn is_fallback(class: ValueClass) -> bool {
        matches!(
            class,
            ValueClass::Value | ValueClass::Constant | ValueClass::Instruction
        )
    }
}

/// Interned wrapper of a native value.
pub struct Value {
    api: Rc<dyn NativeApi>,
    context: ContextRef,
    handle: ValueRef,
    class: ValueClass,
}

impl Value {
    pub fn handle(&self) -> ValueRef {
        self.handle
    }

    pub fn class(&self) -> ValueClass {
        self.class
    }

    pub fn context(&self) -> ContextRef {
        self.context
    }

    /// Name as currently recorded natively. Fails once the value is gone.
    pub fn name(&self) -> BindResult<String> {
        Ok(self.api.value_name(self.handle)?)
    }
}

impl Wrapped for Value {
    type Family = ValueFamily;

    fn construct(
        api: Rc<dyn NativeApi>,
        context: ContextRef,
        handle: ValueRef,
        class: ValueClass,
    ) -> Self {
        Value {
            api,
            context,
            handle,
            class,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Value")
            .field("handle", &self.handle)
            .field("class", &self.class)
            .field("context", &self.context)
            .finish()
    }
}

base_wrapper!(Value);
