use crate::ast::{Decl, Expr, Function, Operator, Param, Prototype, Stmt, Type};
use crate::lexer::{Token, Tokenizer};
use kscope_source::{CompileError, CompileResult, Source};
use std::mem;

mod decl;
mod expr;
mod stmt;

/// Recursive descent parser.
///
/// Every `parse_*` method expects the current token to be the first token of its construct and leaves the current
/// token just past it. The first grammar violation is returned as a [`CompileError::Parse`].
pub struct Parser<'a> {
    /// Cached token for peeking.
    current_token: Token,
    tokenizer: Tokenizer<'a>,
}

impl<'a> Parser<'a> {
    pub fn new(source: &Source<'a>) -> Self {
        let mut tokenizer = Tokenizer::new(source.content);
        Self {
            current_token: tokenizer.next_token(),
            tokenizer,
        }
    }
}

/// Parse utilities
impl<'a> Parser<'a> {
    fn next(&mut self) -> Token {
        let token = self.tokenizer.next_token();
        mem::replace(&mut self.current_token, token)
    }

    /// Predicate that tests whether the current token has the same discriminant and eats it if yes as a side effect.
    fn eat(&mut self, tok: Token) -> bool {
        if mem::discriminant(&self.current_token) == mem::discriminant(&tok) {
            self.next(); // eat token
            true
        } else {
            false
        }
    }

    fn expect(&mut self, tok: Token, message: &str) -> CompileResult<()> {
        if self.eat(tok) {
            Ok(())
        } else {
            Err(CompileError::parse(message))
        }
    }

    /// Eats an identifier and returns its text.
    fn expect_ident(&mut self, message: &str) -> CompileResult<String> {
        if let Token::Identifier(ref mut ident) = self.current_token {
            let ident = mem::take(ident);
            self.next();
            Ok(ident)
        } else {
            Err(CompileError::parse(message))
        }
    }
}
