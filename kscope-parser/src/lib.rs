//! Tokenizer, AST and parser for the kscope language.

pub mod ast;
pub mod lexer;
pub mod parser;
