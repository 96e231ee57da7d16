//! Abstract syntax tree and type model.
//!
//! Every node renders to display text through [`fmt::Display`].

use std::fmt;

/// Types known to the language. Expression types are inferred during code generation, never during parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    Double,
    String,
    Void,
    Invalid,
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Type::Double => "double",
            Type::String => "string",
            Type::Void => "void",
            Type::Invalid => "<invalid>",
        })
    }
}

/// A binary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// `=` (equality, not assignment)
    Equal,
    /// `!`
    NotEqual,
    Less,
    Greater,
    Add,
    Sub,
    Mul,
}

impl Operator {
    /// Returns the binding strength of the operator. Higher binds tighter.
    pub fn precedence(self) -> i32 {
        match self {
            Operator::Equal | Operator::NotEqual => 0,
            Operator::Less | Operator::Greater => 10,
            Operator::Add | Operator::Sub => 20,
            Operator::Mul => 40,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Operator::Equal => '=',
            Operator::NotEqual => '!',
            Operator::Less => '<',
            Operator::Greater => '>',
            Operator::Add => '+',
            Operator::Sub => '-',
            Operator::Mul => '*',
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    NumberLit(f64),
    StringLit(String),
    /// A variable reference (e.g. `foo`).
    Identifier(String),
    /// A function call (e.g. `foo(1, bar)`).
    Call { ident: String, args: Vec<Expr> },
    /// A binary expression (e.g. `1+1`).
    Binary {
        lhs: Box<Expr>,
        op: Operator,
        rhs: Box<Expr>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `set x = expr;` or `const x = expr;`. The first assignment to a local declares it.
    Assignment { ident: String, value: Expr },
    Return(Expr),
    If {
        cond: Expr,
        then_body: Vec<Stmt>,
        else_body: Option<Vec<Stmt>>,
    },
    While { cond: Expr, body: Vec<Stmt> },
    /// Expression statement.
    Expr(Expr),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub ident: String,
    pub ty: Type,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Prototype {
    pub ident: String,
    pub params: Vec<Param>,
    pub ret: Type,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub prototype: Prototype,
    pub body: Vec<Stmt>,
}

/// A top-level declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum Decl {
    /// `def <prototype> { ... }`
    Function(Function),
    /// `extern <prototype>;`
    Extern(Prototype),
    /// `const x = expr;`
    Const { ident: String, value: Expr },
}

fn write_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

fn write_block(f: &mut fmt::Formatter<'_>, body: &[Stmt]) -> fmt::Result {
    f.write_str("{")?;
    for stmt in body {
        write!(f, " {}", stmt)?;
    }
    f.write_str(" }")
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::NumberLit(val) => write!(f, "{:?}", val),
            Expr::StringLit(val) => write!(f, "\"{}\"", val),
            Expr::Identifier(ident) => f.write_str(ident),
            Expr::Call { ident, args } => {
                write!(f, "{}(", ident)?;
                write_list(f, args)?;
                f.write_str(")")
            }
            Expr::Binary { lhs, op, rhs } => write!(f, "({} {} {})", lhs, op, rhs),
        }
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stmt::Assignment { ident, value } => write!(f, "set {} = {};", ident, value),
            Stmt::Return(expr) => write!(f, "return {};", expr),
            Stmt::If {
                cond,
                then_body,
                else_body,
            } => {
                write!(f, "if {} ", cond)?;
                write_block(f, then_body)?;
                if let Some(else_body) = else_body {
                    f.write_str(" else ")?;
                    write_block(f, else_body)?;
                }
                Ok(())
            }
            Stmt::While { cond, body } => {
                write!(f, "while {} ", cond)?;
                write_block(f, body)
            }
            Stmt::Expr(expr) => write!(f, "{};", expr),
        }
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.ty, self.ident)
    }
}

impl fmt::Display for Prototype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}(", self.ret, self.ident)?;
        write_list(f, &self.params)?;
        f.write_str(")")
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "def {} ", self.prototype)?;
        write_block(f, &self.body)
    }
}

impl fmt::Display for Decl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decl::Function(func) => write!(f, "{}", func),
            Decl::Extern(prototype) => write!(f, "extern {};", prototype),
            Decl::Const { ident, value } => write!(f, "const {} = {};", ident, value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precedence_table() {
        assert!(Operator::Mul.precedence() > Operator::Add.precedence());
        assert_eq!(Operator::Add.precedence(), Operator::Sub.precedence());
        assert!(Operator::Sub.precedence() > Operator::Less.precedence());
        assert_eq!(Operator::Less.precedence(), Operator::Greater.precedence());
        assert!(Operator::Greater.precedence() > Operator::Equal.precedence());
        assert_eq!(Operator::Equal.precedence(), 0);
        assert_eq!(Operator::NotEqual.precedence(), 0);
    }

    #[test]
    fn test_render_expr() {
        let expr = Expr::Binary {
            lhs: Box::new(Expr::Call {
                ident: "f".to_string(),
                args: vec![Expr::NumberLit(1.0), Expr::StringLit("s".to_string())],
            }),
            op: Operator::NotEqual,
            rhs: Box::new(Expr::Identifier("x".to_string())),
        };
        assert_eq!(expr.to_string(), r#"(f(1.0, "s") ! x)"#);
    }

    #[test]
    fn test_render_decl() {
        let decl = Decl::Extern(Prototype {
            ident: "puts".to_string(),
            params: vec![Param {
                ident: "s".to_string(),
                ty: Type::String,
            }],
            ret: Type::Void,
        });
        assert_eq!(decl.to_string(), "extern void puts(string s);");
    }
}
