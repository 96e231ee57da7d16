use super::*;

/* Statements */
impl<'a, 'ctx> Codegen<'a, 'ctx> {
    /// Lowers `stmts` in order starting at `at`. Returns the cursor of the block control falls out of.
    pub fn codegen_stmts(&mut self, at: Cursor<'ctx>, stmts: &[Stmt]) -> CompileResult<Cursor<'ctx>> {
        stmts
            .iter()
            .try_fold(at, |at, stmt| self.codegen_stmt(at, stmt))
    }

    pub fn codegen_stmt(&mut self, at: Cursor<'ctx>, stmt: &Stmt) -> CompileResult<Cursor<'ctx>> {
        if at.is_terminated() {
            return Err(CompileError::ty(format!(
                "unreachable statement after return in function: {}",
                at.function_name()
            )));
        }

        match stmt {
            Stmt::Assignment { ident, value } => {
                let value = self.codegen_expr(Some(at), value)?;
                self.set_var(Some(at), ident, value)?;
                Ok(at)
            }
            Stmt::Return(expr) => {
                let value = self.codegen_expr(Some(at), expr)?;
                let name = at.function_name();
                let ret = self.ctx.function(&name).map(|signature| signature.ret);
                if ret != Some(type_of(value)) {
                    return Err(CompileError::ty(format!(
                        "return type mismatch in function: {}",
                        name
                    )));
                }
                self.builder_at(at)
                    .build_return(Some(&value))
                    .map_err(CompileError::internal)?;
                Ok(at)
            }
            Stmt::If {
                cond,
                then_body,
                else_body,
            } => self.codegen_if(at, cond, then_body, else_body.as_deref()),
            Stmt::While { cond, body } => self.codegen_while(at, cond, body),
            Stmt::Expr(Expr::Call { ident, args }) => {
                // result of a void call may be discarded
                self.codegen_call(at, ident, args)?;
                Ok(at)
            }
            Stmt::Expr(expr) => {
                self.codegen_expr(Some(at), expr)?;
                Ok(at)
            }
        }
    }

    /// Lowers `cond` and compares it greater than zero.
    fn codegen_condition(
        &mut self,
        at: Cursor<'ctx>,
        cond: &Expr,
    ) -> CompileResult<IntValue<'ctx>> {
        let value = match self.codegen_expr(Some(at), cond)? {
            BasicValueEnum::FloatValue(value) => value,
            value => {
                return Err(CompileError::ty(format!(
                    "condition must be a double, found: {}",
                    type_of(value)
                )))
            }
        };
        let zero = self.ctx.context.f64_type().const_zero();
        self.builder_at(at)
            .build_float_compare(FloatPredicate::OGT, value, zero, "cond")
            .map_err(CompileError::internal)
    }

    fn codegen_if(
        &mut self,
        at: Cursor<'ctx>,
        cond: &Expr,
        then_body: &[Stmt],
        else_body: Option<&[Stmt]>,
    ) -> CompileResult<Cursor<'ctx>> {
        let cond = self.codegen_condition(at, cond)?;

        let then_block = self.child_block(at, "if-true-block");
        let else_block = else_body.map(|_| self.child_block(at, "if-false-block"));
        let after_block = self.child_block(at, "if-after-block");

        self.builder_at(at)
            .build_conditional_branch(cond, then_block, else_block.unwrap_or(after_block))
            .map_err(CompileError::internal)?;

        let then_end = self.codegen_stmts(at.with_block(then_block), then_body)?;
        self.seal(then_end, after_block)?;

        if let (Some(else_block), Some(else_body)) = (else_block, else_body) {
            let else_end = self.codegen_stmts(at.with_block(else_block), else_body)?;
            self.seal(else_end, after_block)?;
        }

        Ok(at.with_block(after_block))
    }

    fn codegen_while(
        &mut self,
        at: Cursor<'ctx>,
        cond: &Expr,
        body: &[Stmt],
    ) -> CompileResult<Cursor<'ctx>> {
        let test_block = self.child_block(at, "while-test");
        let loop_block = self.child_block(at, "while-loop");
        let after_block = self.child_block(at, "while-after");

        self.builder_at(at)
            .build_unconditional_branch(test_block)
            .map_err(CompileError::internal)?;

        let test = at.with_block(test_block);
        let cond = self.codegen_condition(test, cond)?;
        self.builder_at(test)
            .build_conditional_branch(cond, loop_block, after_block)
            .map_err(CompileError::internal)?;

        let body_end = self.codegen_stmts(at.with_block(loop_block), body)?;
        self.seal(body_end, test_block)?;

        Ok(at.with_block(after_block))
    }
}
