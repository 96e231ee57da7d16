use super::*;

impl<'a> Parser<'a> {
    /// Parses every remaining top-level declaration.
    pub fn parse_program(&mut self) -> CompileResult<Vec<Decl>> {
        let mut decls = Vec::new();
        while let Some(decl) = self.next_declaration()? {
            decls.push(decl);
        }
        Ok(decls)
    }

    /// Parses the next top-level declaration or returns `None` at end of input.
    /// Stray `;` between declarations are skipped.
    pub fn next_declaration(&mut self) -> CompileResult<Option<Decl>> {
        loop {
            match self.current_token {
                Token::Eof => return Ok(None),
                Token::Semi => {
                    self.next();
                }
                Token::Def => return self.parse_fn_declaration().map(Some),
                Token::Extern => return self.parse_extern_declaration().map(Some),
                Token::Const => return self.parse_const_declaration().map(Some),
                _ => {
                    return Err(CompileError::parse(format!(
                        "unknown token when parsing top level: {}",
                        self.current_token
                    )))
                }
            }
        }
    }

    fn parse_fn_declaration(&mut self) -> CompileResult<Decl> {
        self.expect(Token::Def, "expected def")?;
        let prototype = self.parse_prototype()?;
        let body = self.parse_block()?;
        Ok(Decl::Function(Function { prototype, body }))
    }

    fn parse_extern_declaration(&mut self) -> CompileResult<Decl> {
        self.expect(Token::Extern, "expected extern")?;
        let prototype = self.parse_prototype()?;
        self.expect(Token::Semi, "expected ; after extern statement")?;
        Ok(Decl::Extern(prototype))
    }

    fn parse_const_declaration(&mut self) -> CompileResult<Decl> {
        let (ident, value) = self.parse_assignment()?;
        self.eat(Token::Semi);
        Ok(Decl::Const { ident, value })
    }

    /// Parses `type ident(type ident, ...)`.
    pub fn parse_prototype(&mut self) -> CompileResult<Prototype> {
        let ret = match self.current_token {
            Token::TypeDouble => Type::Double,
            Token::TypeString => Type::String,
            Token::TypeVoid => Type::Void,
            _ => {
                return Err(CompileError::parse(
                    "expected function return type before name",
                ))
            }
        };
        self.next();

        let ident = self.expect_ident("invalid identifier for function definition")?;
        self.expect(Token::OpenParen, "expected ( for function definition")?;

        let mut params = Vec::new();
        if !self.eat(Token::CloseParen) {
            loop {
                params.push(self.parse_param()?);

                if self.eat(Token::CloseParen) {
                    break;
                } else if !self.eat(Token::Comma) {
                    return Err(CompileError::parse(
                        "expected , or ) in function prototype",
                    ));
                }
            }
        }

        Ok(Prototype { ident, params, ret })
    }

    fn parse_param(&mut self) -> CompileResult<Param> {
        // void is only valid as a return type
        let ty = match self.current_token {
            Token::TypeDouble => Type::Double,
            Token::TypeString => Type::String,
            _ => return Err(CompileError::parse("expected type for function parameter")),
        };
        self.next();

        let ident = self.expect_ident("invalid identifier for function parameter")?;
        Ok(Param { ident, ty })
    }
}
