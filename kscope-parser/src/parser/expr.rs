use super::*;

impl<'a> Parser<'a> {
    /* Expressions */
    /// Parses any expression.
    /// This is equivalent to parsing a primary expression followed by [`Self::parse_binop_rhs`] with
    /// `min_precedence = 0`.
    pub fn parse_expr(&mut self) -> CompileResult<Expr> {
        let lhs = self.parse_primary_expr()?;
        self.parse_binop_rhs(0, lhs) // 0 to accept any operator
    }

    /// Parses a primary (atom) expression.
    fn parse_primary_expr(&mut self) -> CompileResult<Expr> {
        match self.current_token {
            Token::NumberLit(_) | Token::StringLit(_) => self.parse_literal_expr(),
            Token::Identifier(_) => self.parse_identifier_or_call_expr(),
            Token::OpenParen => self.parse_paren_expr(),
            _ => Err(CompileError::parse(format!(
                "unknown token when parsing primary: {}",
                self.current_token
            ))),
        }
    }

    /// Returns the operator under the cursor without consuming it.
    fn peek_operator(&self) -> Option<Operator> {
        self.current_token.as_operator()
    }

    /// Precedence climbing.
    /// Folds `lhs` with every following operator that binds at least as tight as `min_precedence`.
    fn parse_binop_rhs(&mut self, min_precedence: i32, mut lhs: Expr) -> CompileResult<Expr> {
        loop {
            let op = match self.peek_operator() {
                Some(op) if op.precedence() >= min_precedence => op,
                _ => return Ok(lhs), // not a valid binop or binds too loosely, stop parsing
            };
            self.next(); // eat operator

            let mut rhs = self.parse_primary_expr()?;

            // If the next operator binds tighter, let it take `rhs` as its lhs.
            if let Some(next_op) = self.peek_operator() {
                if op.precedence() < next_op.precedence() {
                    rhs = self.parse_binop_rhs(op.precedence() + 1, rhs)?;
                }
            }

            lhs = Expr::Binary {
                lhs: Box::new(lhs),
                op,
                rhs: Box::new(rhs),
            };
        }
    }

    /* Expressions.Literals */
    /// Parses a literal expression.
    /// A literal can be either a number literal or a string literal.
    fn parse_literal_expr(&mut self) -> CompileResult<Expr> {
        match self.next() {
            Token::NumberLit(val) => Ok(Expr::NumberLit(val)),
            Token::StringLit(val) => Ok(Expr::StringLit(val)),
            token => Err(CompileError::parse(format!(
                "unknown token when parsing literal: {}",
                token
            ))),
        }
    }

    /* Expressions.Identifier */
    /// Parses an identifier or a call expression.
    fn parse_identifier_or_call_expr(&mut self) -> CompileResult<Expr> {
        let ident = self.expect_ident("expected identifier")?;

        if self.eat(Token::OpenParen) {
            // parse call expression
            let mut args = Vec::new();

            if !self.eat(Token::CloseParen) {
                loop {
                    args.push(self.parse_expr()?);

                    if self.eat(Token::CloseParen) {
                        break;
                    } else if !self.eat(Token::Comma) {
                        return Err(CompileError::parse("expected , or ) in function call"));
                    }
                }
            }

            Ok(Expr::Call { ident, args })
        } else {
            // parse identifier expression
            Ok(Expr::Identifier(ident))
        }
    }

    fn parse_paren_expr(&mut self) -> CompileResult<Expr> {
        self.expect(Token::OpenParen, "expected (")?;
        let expr = self.parse_expr()?;
        self.expect(Token::CloseParen, "expected closing ) for expression")?;
        Ok(expr)
    }
}
