use inkwell::context::Context;
use inkwell::module::Module;
use kscope_codegen::{Codegen, CompilationContext};
use kscope_parser::ast::Decl;
use kscope_parser::parser::Parser;
use kscope_source::{CompileError, CompileResult, Source};

/// Compiles a whole program into a verified [`Module`] owned by `context`. Stops at the first error.
pub fn compile<'ctx>(context: &'ctx Context, source: &str) -> CompileResult<Module<'ctx>> {
    compile_with(context, source, |_| {})
}

/// Like [`compile`] but calls `inspect` with every declaration right before it is lowered.
pub fn compile_with<'ctx>(
    context: &'ctx Context,
    source: &str,
    mut inspect: impl FnMut(&Decl),
) -> CompileResult<Module<'ctx>> {
    let source = Source::new(source);
    let mut parser = Parser::new(&source);
    let mut ctx = CompilationContext::new(context, "kscope");

    while let Some(decl) = parser.next_declaration()? {
        inspect(&decl);
        Codegen::new(&mut ctx).codegen_decl(&decl)?;
    }

    let module = ctx.into_module();
    module
        .verify()
        .map_err(|err| CompileError::internal(err.to_string()))?;
    Ok(module)
}
