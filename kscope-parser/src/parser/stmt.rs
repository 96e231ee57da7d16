use super::*;

impl<'a> Parser<'a> {
    /// Parses a statement.
    /// `if` and `while` end with a block and may omit the trailing `;`. Every other statement requires it.
    pub fn parse_stmt(&mut self) -> CompileResult<Stmt> {
        match self.current_token {
            Token::If => {
                let stmt = self.parse_if_stmt()?;
                self.eat(Token::Semi);
                return Ok(stmt);
            }
            Token::While => {
                let stmt = self.parse_while_stmt()?;
                self.eat(Token::Semi);
                return Ok(stmt);
            }
            _ => {}
        }

        let stmt = match self.current_token {
            Token::Set | Token::Const => {
                let (ident, value) = self.parse_assignment()?;
                Stmt::Assignment { ident, value }
            }
            Token::Return => self.parse_return_stmt()?,
            _ => Stmt::Expr(self.parse_expr()?), // expression statement
        };
        self.expect(Token::Semi, "expected ; at end of statement")?;
        Ok(stmt)
    }

    /// Parses `{ stmt+ }`.
    pub fn parse_block(&mut self) -> CompileResult<Vec<Stmt>> {
        self.expect(Token::OpenBrace, "expected { for statement block")?;

        let mut body = Vec::new();
        loop {
            body.push(self.parse_stmt()?);

            if self.eat(Token::CloseBrace) {
                break;
            }
        }

        Ok(body)
    }

    /// Parses `set ident = expr` (or `const ident = expr`) without the trailing `;`.
    pub(super) fn parse_assignment(&mut self) -> CompileResult<(String, Expr)> {
        self.next(); // eat `set` or `const`
        let ident = self.expect_ident("expected identifier after set")?;
        self.expect(Token::Equals, "expected = in set statement")?;
        let value = self.parse_expr()?;
        Ok((ident, value))
    }

    fn parse_return_stmt(&mut self) -> CompileResult<Stmt> {
        self.expect(Token::Return, "expected return")?;
        let expr = self.parse_expr()?;
        Ok(Stmt::Return(expr))
    }

    fn parse_if_stmt(&mut self) -> CompileResult<Stmt> {
        self.expect(Token::If, "expected if")?;
        let cond = self.parse_expr()?;
        let then_body = self.parse_block()?;

        let else_body = if self.eat(Token::Else) {
            Some(self.parse_block()?)
        } else {
            None
        };

        Ok(Stmt::If {
            cond,
            then_body,
            else_body,
        })
    }

    fn parse_while_stmt(&mut self) -> CompileResult<Stmt> {
        self.expect(Token::While, "expected while")?;
        let cond = self.parse_expr()?;
        let body = self.parse_block()?;
        Ok(Stmt::While { cond, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;

    fn stmt(source: &str) -> String {
        let source = Source::new(source);
        let mut parser = Parser::new(&source);
        let stmt = parser.parse_stmt().unwrap();
        assert_eq!(parser.current_token, Token::Eof);
        stmt.to_string()
    }

    fn error(source: &str) -> String {
        Parser::new(&Source::new(source))
            .parse_stmt()
            .unwrap_err()
            .to_string()
    }

    #[test]
    fn test_assignment() {
        assert_snapshot!(stmt("set x = 1 + 2;"), @"set x = (1.0 + 2.0);");
        assert_snapshot!(stmt("const x = y;"), @"set x = y;");
    }

    #[test]
    fn test_return() {
        assert_snapshot!(stmt("return f(x) * 2;"), @"return (f(x) * 2.0);");
    }

    #[test]
    fn test_if() {
        assert_snapshot!(
            stmt("if a > b { return a; } else { return b; }"),
            @"if (a > b) { return a; } else { return b; }"
        );
        assert_snapshot!(stmt("if x { f(); g(); };"), @"if x { f(); g(); }");
        assert_snapshot!(
            stmt("if x { if y { set z = 1; } }"),
            @"if x { if y { set z = 1.0; } }"
        );
    }

    #[test]
    fn test_while() {
        assert_snapshot!(
            stmt("while i < 10.0 { set i = i + 1.0; }"),
            @"while (i < 10.0) { set i = (i + 1.0); }"
        );
    }

    #[test]
    fn test_errors() {
        assert_eq!(error("set = 1;"), "expected identifier after set");
        assert_eq!(error("set x 1;"), "expected = in set statement");
        assert_eq!(error("return 1"), "expected ; at end of statement");
        assert_eq!(error("f() }"), "expected ; at end of statement");
        assert_eq!(error("if x return 1;"), "expected { for statement block");
        assert_eq!(
            error("while x { }"),
            "unknown token when parsing primary: }"
        );
        assert_eq!(
            error("if x { return 1; "),
            "unknown token when parsing primary: end of input"
        );
    }
}
