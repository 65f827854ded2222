mod common;

use common::fixture;
use irbind_core::metadata::{DIBasicType, DICompileUnit, DIScope, DIType, MDNode};
use irbind_core::types::{AggregateType, IntegerType, SequentialType, StructType};
use irbind_core::values::{
    BinaryOperator, Branch, Cast, Constant, GlobalValue, Instruction, ReturnInstruction,
    Terminator,
};
use irbind_core::{BinaryOp, BindError, CastOp, MetadataClass, TypeClass, ValueClass};
use irbind_sys::{MetadataKind, TypeKind, ValueKind, INSTRUCTION_MARKER};

#[test]
fn value_tags_pick_the_most_derived_class() {
    let f = fixture();
    let cases = [
        (ValueKind::Return, ValueClass::Return),
        (ValueKind::Branch, ValueClass::Branch),
        (ValueKind::Add, ValueClass::BinaryOperator(BinaryOp::Add)),
        (ValueKind::Xor, ValueClass::BinaryOperator(BinaryOp::Xor)),
        (ValueKind::ZExt, ValueClass::Cast(CastOp::ZExt)),
        (ValueKind::Argument, ValueClass::Argument),
        (ValueKind::BasicBlock, ValueClass::BasicBlock),
        (ValueKind::Function, ValueClass::Function),
        (ValueKind::GlobalVariable, ValueClass::GlobalVariable),
        (ValueKind::ConstantInt, ValueClass::ConstantInt),
        (ValueKind::ConstantExpr, ValueClass::ConstantExpression),
        (ValueKind::MetadataAsValue, ValueClass::MetadataAsValue),
        (ValueKind::ICmp, ValueClass::ICmp),
        (ValueKind::Phi, ValueClass::Phi),
        (ValueKind::CatchPad, ValueClass::CatchPad),
        (ValueKind::LandingPad, ValueClass::LandingPad),
    ];

    for (kind, expected) in cases {
        let handle = f.value(kind, "v");
        let value = f.session.resolve_value(handle).unwrap().unwrap();
        assert_eq!(value.class(), expected, "{:?}", kind);
        assert_eq!(value.handle(), handle);
        assert_eq!(value.context(), f.context());
    }
}

#[test]
fn value_views_follow_the_hierarchy() {
    let f = fixture();
    let ret = f.value(ValueKind::Return, "");
    let br = f.value(ValueKind::Branch, "");
    let add = f.value(ValueKind::Add, "");
    let cast = f.value(ValueKind::BitCast, "");
    let global = f.value(ValueKind::GlobalAlias, "g");

    let ret_view = f.session.resolve::<ReturnInstruction>(ret).unwrap().unwrap();
    assert_eq!(ret_view.class(), ValueClass::Return);
    assert!(f.session.resolve::<Terminator>(ret).unwrap().is_some());
    assert!(f.session.resolve::<Instruction>(ret).unwrap().is_some());
    assert!(f.session.resolve::<Branch>(br).unwrap().is_some());
    assert!(f.session.resolve::<Terminator>(add).is_err());

    let add_view = f.session.resolve::<BinaryOperator>(add).unwrap().unwrap();
    assert_eq!(add_view.opcode(), BinaryOp::Add);

    let cast_view = f.session.resolve::<Cast>(cast).unwrap().unwrap();
    assert_eq!(cast_view.opcode(), CastOp::BitCast);

    assert!(f.session.resolve::<GlobalValue>(global).unwrap().is_some());
    assert!(f.session.resolve::<Constant>(global).unwrap().is_some());
    assert!(f.session.resolve::<Instruction>(global).is_err());
}

#[test]
fn unknown_value_tags_fall_back() {
    let f = fixture();

    let future_opcode = f.value_tag(INSTRUCTION_MARKER + 500);
    let value = f.session.resolve_value(future_opcode).unwrap().unwrap();
    assert_eq!(value.class(), ValueClass::Instruction);
    assert!(f.session.resolve::<Instruction>(future_opcode).unwrap().is_some());

    let token = f.value(ValueKind::ConstantTokenNone, "");
    let value = f.session.resolve_value(token).unwrap().unwrap();
    assert_eq!(value.class(), ValueClass::Constant);

    let memory_phi = f.value(ValueKind::MemoryPhi, "");
    let value = f.session.resolve_value(memory_phi).unwrap().unwrap();
    assert_eq!(value.class(), ValueClass::Value);

    let bare_marker = f.value_tag(INSTRUCTION_MARKER);
    let value = f.session.resolve_value(bare_marker).unwrap().unwrap();
    assert_eq!(value.class(), ValueClass::Value);
}

#[test]
fn metadata_tags_pick_the_most_derived_class() {
    let f = fixture();

    let basic = f.metadata(MetadataKind::DIBasicType);
    let unit = f.metadata(MetadataKind::DICompileUnit);
    let tuple = f.metadata(MetadataKind::MDTuple);
    let string = f.metadata(MetadataKind::MDString);

    let basic_view = f.session.resolve::<DIBasicType>(basic).unwrap().unwrap();
    assert_eq!(basic_view.class(), MetadataClass::DIBasicType);
    assert!(f.session.resolve::<DIType>(basic).unwrap().is_some());
    assert!(f.session.resolve::<DIScope>(basic).unwrap().is_some());

    let unit_view = f.session.resolve::<DICompileUnit>(unit).unwrap().unwrap();
    assert_eq!(unit_view.class(), MetadataClass::DICompileUnit);
    assert!(!unit_view.is_temporary().unwrap());
    assert!(f.session.resolve::<DIType>(unit).is_err());

    assert!(f.session.resolve::<MDNode>(tuple).unwrap().is_some());
    assert!(matches!(
        f.session.resolve::<MDNode>(string),
        Err(BindError::IncompatibleType { expected: "MDNode", .. })
    ));
}

#[test]
fn unknown_metadata_tags_are_generic() {
    let f = fixture();
    let node = f.sim.add_metadata_raw(f.context(), 4096).unwrap();
    let metadata = f.session.resolve_metadata(node).unwrap().unwrap();
    assert_eq!(metadata.class(), MetadataClass::Metadata);
    assert_eq!(f.session.cached_metadata().len(), 1);
}

#[test]
fn type_tags_pick_the_most_derived_class() {
    let f = fixture();

    let int = f.ty(TypeKind::Integer);
    let strukt = f.ty(TypeKind::Struct);
    let array = f.ty(TypeKind::Array);
    let double = f.ty(TypeKind::Double);
    let retired = f.sim.add_type_raw(f.context(), 15).unwrap();

    assert!(f.session.resolve::<IntegerType>(int).unwrap().is_some());
    assert!(f.session.resolve::<StructType>(strukt).unwrap().is_some());
    assert!(f.session.resolve::<AggregateType>(strukt).unwrap().is_some());
    assert!(f.session.resolve::<SequentialType>(strukt).is_err());
    assert!(f.session.resolve::<SequentialType>(array).unwrap().is_some());

    let double = f.session.resolve_type(double).unwrap().unwrap();
    assert_eq!(double.class(), TypeClass::Type(Some(TypeKind::Double)));
    assert_eq!(double.kind(), Some(TypeKind::Double));

    let retired = f.session.resolve_type(retired).unwrap().unwrap();
    assert_eq!(retired.class(), TypeClass::Type(None));
    assert_eq!(f.session.cached_types().len(), 5);
}
