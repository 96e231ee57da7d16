//! Mapping between language [`Type`]s and LLVM types.

use inkwell::context::Context;
use inkwell::types::{BasicMetadataTypeEnum, BasicType, BasicTypeEnum, FunctionType};
use inkwell::values::BasicValueEnum;
use inkwell::AddressSpace;
use kscope_parser::ast::{Prototype, Type};

/// Returns the LLVM representation of `ty`, or `None` for `void`.
/// Strings are `i8*`. [`Type::Invalid`] never reaches a prototype and has no representation either.
pub fn ir_type(context: &Context, ty: Type) -> Option<BasicTypeEnum<'_>> {
    match ty {
        Type::Double => Some(context.f64_type().into()),
        Type::String => Some(context.i8_type().ptr_type(AddressSpace::default()).into()),
        Type::Void | Type::Invalid => None,
    }
}

/// Builds the LLVM function type of `prototype`.
pub fn fn_type<'ctx>(context: &'ctx Context, prototype: &Prototype) -> FunctionType<'ctx> {
    let params: Vec<BasicMetadataTypeEnum> = prototype
        .params
        .iter()
        .filter_map(|param| ir_type(context, param.ty))
        .map(Into::into)
        .collect();
    match ir_type(context, prototype.ret) {
        Some(ret) => ret.fn_type(&params, false),
        None => context.void_type().fn_type(&params, false),
    }
}

/// Infers the language type of a value produced while lowering an expression.
///
/// Floats are [`Type::Double`]. The only pointers an expression yields are `i8*` strings. Comparisons are promoted
/// back to `double` before they escape, so anything else is [`Type::Invalid`].
pub fn type_of(value: BasicValueEnum<'_>) -> Type {
    match value {
        BasicValueEnum::FloatValue(_) => Type::Double,
        BasicValueEnum::PointerValue(_) => Type::String,
        _ => Type::Invalid,
    }
}
