use super::*;
use inkwell::values::BasicMetadataValueEnum;

/* Expressions */
impl<'a, 'ctx> Codegen<'a, 'ctx> {
    /// Lowers `expr` at `at`. `None` means global scope, where only constants and names of constants are allowed.
    pub fn codegen_expr(
        &mut self,
        at: Option<Cursor<'ctx>>,
        expr: &Expr,
    ) -> CompileResult<BasicValueEnum<'ctx>> {
        match expr {
            Expr::NumberLit(val) => Ok(self.ctx.context.f64_type().const_float(*val).into()),
            Expr::StringLit(text) => {
                let at = at.ok_or_else(|| {
                    CompileError::resolution("cannot use string literal at top level")
                })?;
                self.codegen_string(at, text)
            }
            Expr::Identifier(ident) => self.retrieve_var(at, ident),
            Expr::Call { ident, args } => {
                let at = at.ok_or_else(|| {
                    CompileError::resolution("cannot use call expression at top level")
                })?;
                self.codegen_call(at, ident, args)?.ok_or_else(|| {
                    CompileError::ty(format!("cannot use void value of call to: {}", ident))
                })
            }
            Expr::Binary { lhs, op, rhs } => {
                let at = at.ok_or_else(|| {
                    CompileError::resolution("cannot use binary expression at top level")
                })?;
                let mark = self.mark(at);
                let result = self.codegen_binary(at, lhs, *op, rhs);
                if result.is_err() {
                    self.truncate(at, mark);
                }
                result
            }
        }
    }

    /// Emits `text` as a private NUL terminated global and returns an `i8*` to its first byte.
    fn codegen_string(&mut self, at: Cursor<'ctx>, text: &str) -> CompileResult<BasicValueEnum<'ctx>> {
        let global = self
            .builder_at(at)
            .build_global_string_ptr(text, "str")
            .map_err(CompileError::internal)?;
        Ok(global.as_pointer_value().into())
    }

    fn codegen_binary(
        &mut self,
        at: Cursor<'ctx>,
        lhs: &Expr,
        op: Operator,
        rhs: &Expr,
    ) -> CompileResult<BasicValueEnum<'ctx>> {
        let lhs = self.codegen_expr(Some(at), lhs)?;
        let rhs = self.codegen_expr(Some(at), rhs)?;

        let (lhs, rhs) = match (lhs, rhs) {
            (BasicValueEnum::FloatValue(lhs), BasicValueEnum::FloatValue(rhs)) => (lhs, rhs),
            (lhs, rhs) if type_of(lhs) != type_of(rhs) => {
                return Err(CompileError::ty("types in binary expression must match"))
            }
            (lhs, _) if type_of(lhs) == Type::String => {
                return Err(CompileError::ty(format!(
                    "unsupported operator for double: {}",
                    op
                )))
            }
            _ => return Err(CompileError::ty("unexpected type in binary expression")),
        };

        let builder = self.builder_at(at);
        let pred = match op {
            Operator::Add => return built(builder.build_float_add(lhs, rhs, "addtmp")),
            Operator::Sub => return built(builder.build_float_sub(lhs, rhs, "subtmp")),
            Operator::Mul => return built(builder.build_float_mul(lhs, rhs, "multmp")),
            Operator::Less => FloatPredicate::OLT,
            Operator::Greater => FloatPredicate::OGT,
            Operator::Equal => FloatPredicate::OEQ,
            Operator::NotEqual => FloatPredicate::ONE,
        };
        // i1 is promoted back to 1.0 or 0.0
        let cmp = builder
            .build_float_compare(pred, lhs, rhs, "cmptmp")
            .map_err(CompileError::internal)?;
        built(builder.build_unsigned_int_to_float(cmp, self.ctx.context.f64_type(), "booltmp"))
    }

    /// Lowers a call to an already declared function. Returns `None` for `void` functions.
    pub fn codegen_call(
        &mut self,
        at: Cursor<'ctx>,
        ident: &str,
        args: &[Expr],
    ) -> CompileResult<Option<BasicValueEnum<'ctx>>> {
        let callee = match self.ctx.function(ident) {
            Some(callee) => callee.clone(),
            None => {
                return Err(CompileError::resolution(format!(
                    "could not find function: {}",
                    ident
                )))
            }
        };
        if callee.params.len() != args.len() {
            return Err(CompileError::resolution(format!(
                "incorrect number of arguments passed to: {}",
                ident
            )));
        }

        let mark = self.mark(at);
        let mut values: Vec<BasicMetadataValueEnum> = Vec::with_capacity(args.len());
        for (arg, ty) in args.iter().zip(&callee.params) {
            let value = match self.codegen_expr(Some(at), arg) {
                Ok(value) if type_of(value) == *ty => value,
                Ok(_) => {
                    self.truncate(at, mark);
                    return Err(CompileError::ty(format!(
                        "argument type mismatch in call to: {}",
                        ident
                    )));
                }
                Err(err) => {
                    self.truncate(at, mark);
                    return Err(err);
                }
            };
            values.push(value.into());
        }

        let name = if callee.ret == Type::Void { "" } else { "calltmp" };
        let call = self
            .builder_at(at)
            .build_call(callee.value, &values, name)
            .map_err(CompileError::internal)?;
        Ok(call.try_as_basic_value().left())
    }
}

fn built<'ctx, V: Into<BasicValueEnum<'ctx>>>(
    result: Result<V, inkwell::builder::BuilderError>,
) -> CompileResult<BasicValueEnum<'ctx>> {
    result.map(Into::into).map_err(CompileError::internal)
}

#[cfg(test)]
mod tests {
    use super::super::tests::{assert_verified, compile, compile_err, func, opcodes};
    use super::*;
    use inkwell::values::InstructionOpcode;
    use kscope_parser::parser::Parser;
    use kscope_source::Source;

    /// Lowers `decls`, then lowers `expr` into the entry block of a fresh `void` function named `host`. Returns the
    /// opcodes left in that block and the type of the result.
    fn lower(decls: &str, expr: &str) -> (Vec<InstructionOpcode>, CompileResult<Type>) {
        let context = Context::create();
        let mut ctx = CompilationContext::new(&context, "test");
        let source = Source::new(decls);
        for decl in Parser::new(&source).parse_program().unwrap() {
            Codegen::new(&mut ctx).codegen_decl(&decl).unwrap();
        }

        let host = Codegen::new(&mut ctx)
            .codegen_prototype(&Prototype {
                ident: "host".to_string(),
                params: Vec::new(),
                ret: Type::Void,
            })
            .unwrap();
        let entry = context.append_basic_block(host.value, "entry");
        ctx.scopes.enter_function(host.id);
        let at = Cursor {
            func: host.id,
            function: host.value,
            block: entry,
        };

        let source = Source::new(expr);
        let expr = Parser::new(&source).parse_expr().unwrap();
        let result = Codegen::new(&mut ctx).codegen_expr(Some(at), &expr);
        (opcodes(entry), result.map(type_of))
    }

    #[test]
    fn test_scenario_e_mixed_types() {
        let (opcodes, result) = lower("extern string name();", "name() + 1");
        assert_eq!(
            result.unwrap_err().to_string(),
            "types in binary expression must match"
        );
        assert!(opcodes.is_empty());
    }

    #[test]
    fn test_nested_failure_rolls_back() {
        let (opcodes, result) = lower(
            "extern double sqrt(double x); extern string name();",
            "sqrt(4) * (sqrt(9) - name())",
        );
        assert!(result.is_err());
        assert!(opcodes.is_empty());
    }

    #[test]
    fn test_string_operands() {
        let (opcodes, result) = lower("", r#""a" + "b""#);
        assert_eq!(
            result.unwrap_err().to_string(),
            "unsupported operator for double: +"
        );
        assert!(opcodes.is_empty());
    }

    #[test]
    fn test_comparison_promotes_to_double() {
        let (opcodes, result) = lower("extern double sqrt(double x);", "sqrt(2) < 2");
        assert_eq!(result.unwrap(), Type::Double);
        assert_eq!(
            opcodes,
            vec![
                InstructionOpcode::Call,
                InstructionOpcode::FCmp,
                InstructionOpcode::UIToFP
            ]
        );
    }

    #[test]
    fn test_constant_operands_fold() {
        let (opcodes, result) = lower("const one = 1;", "one + 2 * 3");
        assert_eq!(result.unwrap(), Type::Double);
        assert!(opcodes.is_empty());
    }

    #[test]
    fn test_string_literal() {
        let (opcodes, result) = lower("", r#""hello""#);
        assert_eq!(result.unwrap(), Type::String);
        // the text lives in a global, not on the stack
        assert!(opcodes.is_empty());

        let context = Context::create();
        let module = compile(
            &context,
            r#"extern void puts(string s); def void main() { puts("hello"); }"#,
        )
        .unwrap();
        assert_verified(&module);
        assert!(module
            .print_to_string()
            .to_string()
            .contains(r#"c"hello\00""#));
    }

    #[test]
    fn test_call_errors() {
        assert_eq!(
            compile_err("def void f() { g(); }"),
            "could not find function: g"
        );
        assert_eq!(
            compile_err("extern double sin(double x); def double f() { return sin(); }"),
            "incorrect number of arguments passed to: sin"
        );
        assert_eq!(
            compile_err(r#"extern double sin(double x); def double f() { return sin("x"); }"#),
            "argument type mismatch in call to: sin"
        );
        assert_eq!(
            compile_err("extern void tick(); def double f() { return tick(); }"),
            "cannot use void value of call to: tick"
        );
    }

    #[test]
    fn test_argument_mismatch_rolls_back() {
        let (opcodes, result) = lower(
            "extern double len(string s); extern double sqrt(double x);",
            "len(sqrt(1) + 2)",
        );
        assert_eq!(
            result.unwrap_err().to_string(),
            "argument type mismatch in call to: len"
        );
        assert!(opcodes.is_empty());
    }

    #[test]
    fn test_string_argument() {
        let context = Context::create();
        let module = compile(
            &context,
            r#"extern void puts(string s); def void main() { puts("hi"); set s = "yo"; puts(s); }"#,
        )
        .unwrap();
        assert_verified(&module);
        let entry = func(&module, "main").get_first_basic_block().unwrap();
        assert_eq!(
            opcodes(entry),
            vec![
                InstructionOpcode::Alloca,
                InstructionOpcode::Call,
                InstructionOpcode::Store,
                InstructionOpcode::Load,
                InstructionOpcode::Call,
                InstructionOpcode::Return
            ]
        );
    }

    #[test]
    fn test_arithmetic() {
        let context = Context::create();
        let module = compile(&context, "def double f(double x) { return x * 2 + 1 - x; }").unwrap();
        assert_verified(&module);
        let entry = func(&module, "f").get_first_basic_block().unwrap();
        assert_eq!(
            opcodes(entry),
            vec![
                InstructionOpcode::Alloca,
                InstructionOpcode::Store,
                InstructionOpcode::Load,
                InstructionOpcode::FMul,
                InstructionOpcode::FAdd,
                InstructionOpcode::Load,
                InstructionOpcode::FSub,
                InstructionOpcode::Return
            ]
        );
    }
}
