//! Lowers AST declarations into an LLVM [`Module`].

use crate::scope::{Binding, FuncId, Scope, ScopeTable};
use crate::types::{fn_type, ir_type, type_of};
use inkwell::basic_block::BasicBlock;
use inkwell::builder::Builder;
use inkwell::context::Context;
use inkwell::module::Module;
use inkwell::values::{
    BasicValue, BasicValueEnum, FunctionValue, InstructionValue, IntValue, PointerValue,
};
use inkwell::FloatPredicate;
use kscope_parser::ast::{Decl, Expr, Function, Operator, Prototype, Stmt, Type};
use kscope_source::{CompileError, CompileResult};
use std::collections::HashMap;

mod expr;
mod stmt;

/// A declared function and its language level signature.
#[derive(Debug, Clone, PartialEq)]
pub struct Signature<'ctx> {
    pub id: FuncId,
    pub value: FunctionValue<'ctx>,
    pub params: Vec<Type>,
    pub ret: Type,
}

/// State shared by every declaration lowered in one run.
pub struct CompilationContext<'ctx> {
    pub context: &'ctx Context,
    pub module: Module<'ctx>,
    pub builder: Builder<'ctx>,
    pub scopes: ScopeTable<'ctx>,
    functions: HashMap<String, Signature<'ctx>>,
}

impl<'ctx> CompilationContext<'ctx> {
    pub fn new(context: &'ctx Context, name: &str) -> Self {
        Self {
            context,
            module: context.create_module(name),
            builder: context.create_builder(),
            scopes: ScopeTable::new(),
            functions: HashMap::new(),
        }
    }

    /// Returns the signature of an already declared function.
    pub fn function(&self, name: &str) -> Option<&Signature<'ctx>> {
        self.functions.get(name)
    }

    /// Consumes `self` and returns the generated [`Module`].
    #[must_use]
    pub fn into_module(self) -> Module<'ctx> {
        self.module
    }
}

/// Insertion point: the block new instructions are appended to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor<'ctx> {
    pub func: FuncId,
    pub function: FunctionValue<'ctx>,
    pub block: BasicBlock<'ctx>,
}

impl<'ctx> Cursor<'ctx> {
    /// Returns a cursor in the same function pointing at `block`.
    pub fn with_block(self, block: BasicBlock<'ctx>) -> Self {
        Self { block, ..self }
    }

    /// A block is dead if nothing branches to it and it is not the entry block.
    fn is_dead(self) -> bool {
        self.function.get_first_basic_block() != Some(self.block) && self.block.get_first_use().is_none()
    }

    fn is_terminated(self) -> bool {
        self.block.get_terminator().is_some()
    }

    fn function_name(self) -> String {
        self.function.get_name().to_string_lossy().into_owned()
    }
}

/// Generate IR from an abstract syntax tree.
///
/// Declarations are lowered one at a time in parse order. A function can only be called once its `def` or `extern`
/// has been lowered.
pub struct Codegen<'a, 'ctx> {
    ctx: &'a mut CompilationContext<'ctx>,
}

impl<'a, 'ctx> Codegen<'a, 'ctx> {
    pub fn new(ctx: &'a mut CompilationContext<'ctx>) -> Self {
        Self { ctx }
    }

    /// Lowers one top-level declaration.
    pub fn codegen_decl(&mut self, decl: &Decl) -> CompileResult<()> {
        match decl {
            Decl::Function(func) => self.codegen_function(func).map(|_| ()),
            Decl::Extern(prototype) => self.codegen_prototype(prototype).map(|_| ()),
            Decl::Const { ident, value } => {
                let value = self.codegen_expr(None, value)?;
                self.set_var(None, ident, value)
            }
        }
    }

    /// Declares the function described by `prototype` or returns the existing declaration with the same signature.
    pub fn codegen_prototype(&mut self, prototype: &Prototype) -> CompileResult<Signature<'ctx>> {
        for (i, param) in prototype.params.iter().enumerate() {
            if prototype.params[..i].iter().any(|prev| prev.ident == param.ident) {
                return Err(CompileError::resolution(format!(
                    "duplicate parameter {} in function: {}",
                    param.ident, prototype.ident
                )));
            }
        }

        let params: Vec<Type> = prototype.params.iter().map(|param| param.ty).collect();
        if let Some(existing) = self.ctx.functions.get(&prototype.ident) {
            if existing.params != params || existing.ret != prototype.ret {
                return Err(CompileError::resolution(format!(
                    "conflicting declaration for function: {}",
                    prototype.ident
                )));
            }
            return Ok(existing.clone());
        }

        let value = self.ctx.module.add_function(
            &prototype.ident,
            fn_type(self.ctx.context, prototype),
            None,
        );
        name_params(value, prototype);

        let signature = Signature {
            id: FuncId(self.ctx.functions.len()),
            value,
            params,
            ret: prototype.ret,
        };
        self.ctx
            .functions
            .insert(prototype.ident.clone(), signature.clone());
        Ok(signature)
    }

    /// Lowers a function definition.
    pub fn codegen_function(&mut self, func: &Function) -> CompileResult<Signature<'ctx>> {
        let prototype = &func.prototype;
        let signature = self.codegen_prototype(prototype)?;
        let function = signature.value;
        if function.count_basic_blocks() > 0 {
            return Err(CompileError::resolution(format!(
                "function already defined: {}",
                prototype.ident
            )));
        }
        // A previous `extern` may have used other parameter names.
        name_params(function, prototype);

        let entry = self.ctx.context.append_basic_block(function, "entry");
        let at = Cursor {
            func: signature.id,
            function,
            block: entry,
        };

        self.ctx.scopes.enter_function(signature.id);
        for (param, value) in prototype.params.iter().zip(function.get_param_iter()) {
            self.set_var(Some(at), &param.ident, value)?;
        }

        let end = self.codegen_stmts(at, &func.body)?;
        if !end.is_terminated() {
            let builder = self.builder_at(end);
            if end.is_dead() {
                builder.build_unreachable().map_err(CompileError::internal)?;
            } else if prototype.ret == Type::Void {
                builder.build_return(None).map_err(CompileError::internal)?;
            } else {
                return Err(CompileError::ty(format!(
                    "non-void function: {} needs return",
                    prototype.ident
                )));
            }
        }
        self.ctx.scopes.exit_function(signature.id);

        Ok(signature)
    }
}

/// Variable resolution.
impl<'a, 'ctx> Codegen<'a, 'ctx> {
    /// Returns the current value of `name`. At global scope (`at == None`) only constants are visible. Inside a
    /// function, locals are loaded from their slot and globals are used directly.
    fn retrieve_var(
        &mut self,
        at: Option<Cursor<'ctx>>,
        name: &str,
    ) -> CompileResult<BasicValueEnum<'ctx>> {
        let (scope, binding) = self
            .ctx
            .scopes
            .resolve(at.map(|at| at.func), name)
            .ok_or_else(|| CompileError::resolution(format!("could not identify var: {}", name)))?;

        match (scope, at) {
            (Scope::Local(_), Some(at)) => {
                let slot = slot_pointer(name, binding)?;
                let _ty = ir_type(self.ctx.context, binding.ty).ok_or_else(|| {
                    CompileError::internal(format!("variable {} has no storage type", name))
                })?;
                self.builder_at(at)
                    .build_load(slot, name)
                    .map_err(CompileError::internal)
            }
            _ => Ok(binding.value),
        }
    }

    /// Assigns `value` to `name`.
    ///
    /// At global scope the binding is recorded before the value is checked to be a constant, so a failed
    /// non-constant assignment stays bound.
    fn set_var(
        &mut self,
        at: Option<Cursor<'ctx>>,
        name: &str,
        value: BasicValueEnum<'ctx>,
    ) -> CompileResult<()> {
        let at = match at {
            Some(at) => at,
            None => {
                let binding = Binding {
                    value,
                    ty: type_of(value),
                };
                self.ctx.scopes.bind(Scope::Global, name, binding);
                if !is_constant(value) {
                    return Err(CompileError::resolution(format!(
                        "{} is not equal to constant expression",
                        name
                    )));
                }
                return Ok(());
            }
        };

        if let Some(slot) = self.ctx.scopes.get(Scope::Local(at.func), name) {
            return self.store(at, name, value, slot);
        }

        if self.ctx.scopes.get(Scope::Global, name).is_some() {
            return Err(CompileError::resolution(format!(
                "cannot write to constant variable: {}",
                name
            )));
        }

        // first assignment declares the local
        let ty = type_of(value);
        let slot = Binding {
            value: self.entry_alloca(at, ty, name)?.into(),
            ty,
        };
        self.ctx.scopes.bind(Scope::Local(at.func), name, slot);
        self.store(at, name, value, slot)
    }

    fn store(
        &mut self,
        at: Cursor<'ctx>,
        name: &str,
        value: BasicValueEnum<'ctx>,
        slot: Binding<'ctx>,
    ) -> CompileResult<()> {
        let ptr = slot_pointer(name, slot)?;
        if slot.ty != type_of(value) {
            return Err(CompileError::ty(format!(
                "cannot store incompatible type for: {}",
                name
            )));
        }
        self.builder_at(at)
            .build_store(ptr, value)
            .map_err(CompileError::internal)?;
        Ok(())
    }

    /// Allocates a stack slot at the top of the entry block, so it dominates every use in the function.
    fn entry_alloca(&self, at: Cursor<'ctx>, ty: Type, name: &str) -> CompileResult<PointerValue<'ctx>> {
        let ir_ty = ir_type(self.ctx.context, ty).ok_or_else(|| {
            CompileError::ty(format!("cannot store value of type {} in: {}", ty, name))
        })?;
        let entry = at
            .function
            .get_first_basic_block()
            .ok_or_else(|| CompileError::internal("function has no entry block"))?;

        let builder = self.ctx.context.create_builder();
        match entry.get_first_instruction() {
            Some(first) => builder.position_before(&first),
            None => builder.position_at_end(entry),
        }
        builder
            .build_alloca(ir_ty, name)
            .map_err(CompileError::internal)
    }
}

/// Codegen utilities
impl<'a, 'ctx> Codegen<'a, 'ctx> {
    /// Positions the shared builder at the end of the block under `at`.
    fn builder_at(&self, at: Cursor<'ctx>) -> &Builder<'ctx> {
        self.ctx.builder.position_at_end(at.block);
        &self.ctx.builder
    }

    /// Creates a block named after its role, suffixed with a hash of the parent block name and the role.
    fn child_block(&self, at: Cursor<'ctx>, role: &str) -> BasicBlock<'ctx> {
        let parent = at.block.get_name().to_string_lossy();
        let digest = format!("{:x}", md5::compute(format!("{}{}", parent, role)));
        let name = format!("{}_{}", role, &digest[..8]);
        self.ctx.context.append_basic_block(at.function, &name)
    }

    /// Ends the block under `at` with a branch to `target`, unless it is already terminated.
    /// Dead blocks end in `unreachable` instead.
    fn seal(&self, at: Cursor<'ctx>, target: BasicBlock<'ctx>) -> CompileResult<()> {
        if at.is_terminated() {
            return Ok(());
        }
        let builder = self.builder_at(at);
        if at.is_dead() {
            builder.build_unreachable()
        } else {
            builder.build_unconditional_branch(target)
        }
        .map_err(CompileError::internal)?;
        Ok(())
    }

    /// Remembers the current end of the block under `at`. See [`Codegen::truncate`].
    fn mark(&self, at: Cursor<'ctx>) -> Option<InstructionValue<'ctx>> {
        at.block.get_last_instruction()
    }

    /// Erases every instruction appended to the block under `at` since `mark`.
    fn truncate(&self, at: Cursor<'ctx>, mark: Option<InstructionValue<'ctx>>) {
        while let Some(last) = at.block.get_last_instruction() {
            if Some(last) == mark {
                break;
            }
            last.erase_from_basic_block();
        }
    }
}

fn name_params(function: FunctionValue<'_>, prototype: &Prototype) {
    for (value, param) in function.get_param_iter().zip(&prototype.params) {
        value.set_name(&param.ident);
    }
}

fn slot_pointer<'ctx>(name: &str, binding: Binding<'ctx>) -> CompileResult<PointerValue<'ctx>> {
    match binding.value {
        BasicValueEnum::PointerValue(ptr) => Ok(ptr),
        _ => Err(CompileError::resolution(format!(
            "cannot write to variable {}",
            name
        ))),
    }
}

fn is_constant(value: BasicValueEnum<'_>) -> bool {
    match value {
        BasicValueEnum::FloatValue(value) => value.is_const(),
        _ => false,
    }
}
