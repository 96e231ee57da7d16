//! Lowers the kscope AST into an LLVM [`inkwell::module::Module`].

pub mod codegen;
pub mod scope;
pub mod types;

pub use codegen::{Codegen, CompilationContext, Cursor, Signature};
