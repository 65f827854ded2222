use super::{BinaryOp, CastOp, Value, ValueClass};

typed_views! {
    Value, ValueClass;

    Argument => |c| c == ValueClass::Argument;
    BasicBlock => |c| c == ValueClass::BasicBlock;
    MetadataAsValue => |c| c == ValueClass::MetadataAsValue;
    InlineAsm => |c| c == ValueClass::InlineAsm;

    /// Any constant, including globals.
    Constant => |c| c.is_constant();
    ConstantData => |c| c.is_constant_data();
    GlobalValue => |c| c.is_global_value();
    GlobalObject => |c| c.is_global_object();
    Function => |c| c == ValueClass::Function;
    GlobalAlias => |c| c == ValueClass::GlobalAlias;
    GlobalIFunc => |c| c == ValueClass::GlobalIFunc;
    GlobalVariable => |c| c == ValueClass::GlobalVariable;
    BlockAddress => |c| c == ValueClass::BlockAddress;
    ConstantExpression => |c| c == ValueClass::ConstantExpression;
    ConstantArray => |c| c == ValueClass::ConstantArray;
    ConstantStruct => |c| c == ValueClass::ConstantStruct;
    ConstantVector => |c| c == ValueClass::ConstantVector;
    UndefValue => |c| c == ValueClass::UndefValue;
    ConstantAggregateZero => |c| c == ValueClass::ConstantAggregateZero;
    ConstantDataArray => |c| c == ValueClass::ConstantDataArray;
    ConstantDataVector => |c| c == ValueClass::ConstantDataVector;
    ConstantInt => |c| c == ValueClass::ConstantInt;
    ConstantFP => |c| c == ValueClass::ConstantFP;
    ConstantPointerNull => |c| c == ValueClass::ConstantPointerNull;

    /// Any instruction, including opcodes this crate has no class for.
    Instruction => |c| c.is_instruction();
    Terminator => |c| c.is_terminator();
    UnaryInstruction => |c| c.is_unary_instruction();
    ReturnInstruction => |c| c == ValueClass::Return;
    Branch => |c| c == ValueClass::Branch;
    Switch => |c| c == ValueClass::Switch;
    IndirectBranch => |c| c == ValueClass::IndirectBranch;
    Invoke => |c| c == ValueClass::Invoke;
    Resume => |c| c == ValueClass::Resume;
    Unreachable => |c| c == ValueClass::Unreachable;
    CleanupReturn => |c| c == ValueClass::CleanupReturn;
    CatchReturn => |c| c == ValueClass::CatchReturn;
    CatchSwitch => |c| c == ValueClass::CatchSwitch;
    BinaryOperator => |c| c.is_binary_operator();
    Alloca => |c| c == ValueClass::Alloca;
    Load => |c| c == ValueClass::Load;
    Store => |c| c == ValueClass::Store;
    GetElementPtr => |c| c == ValueClass::GetElementPtr;
    Fence => |c| c == ValueClass::Fence;
    AtomicCmpXchg => |c| c == ValueClass::AtomicCmpXchg;
    AtomicRMW => |c| c == ValueClass::AtomicRMW;
    Cast => |c| c.is_cast();
    FuncletPad => |c| c.is_funclet_pad();
    CleanupPad => |c| c == ValueClass::CleanupPad;
    CatchPad => |c| c == ValueClass::CatchPad;
    Cmp => |c| c.is_cmp();
    ICmp => |c| c == ValueClass::ICmp;
    FCmp => |c| c == ValueClass::FCmp;
    Phi => |c| c == ValueClass::Phi;
    Call => |c| c == ValueClass::Call;
    Select => |c| c == ValueClass::Select;
    UserOp1 => |c| c == ValueClass::UserOp1;
    UserOp2 => |c| c == ValueClass::UserOp2;
    VaArg => |c| c == ValueClass::VaArg;
    ExtractElement => |c| c == ValueClass::ExtractElement;
    InsertElement => |c| c == ValueClass::InsertElement;
    ShuffleVector => |c| c == ValueClass::ShuffleVector;
    ExtractValue => |c| c == ValueClass::ExtractValue;
    InsertValue => |c| c == ValueClass::InsertValue;
    LandingPad => |c| c == ValueClass::LandingPad;
}

impl BinaryOperator {
    pub fn opcode(&self) -> BinaryOp {
        match self.class() {
            ValueClass::BinaryOperator(op) => op,
            other => unreachable!("binary operator view over {:?}", other),
        }
    }
}

impl Cast {
    pub fn opcode(&self) -> CastOp {
        match self.class() {
            ValueClass::Cast(op) => op,
            other => unreachable!("cast view over {:?}", other),
        }
    }
}

impl Cmp {
    pub fn is_floating_point(&self) -> bool {
        self.class() == ValueClass::FCmp
    }
}
