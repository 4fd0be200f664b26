//! Builder functions for IR construction
//!
//! One builder per node variant so rule modules can assemble original and
//! transformed trees without spelling out enum paths.

use super::{BinOp, Expr, Stmt, UnOp, Value};

// --- Expressions ---

/// Integer literal
pub fn int(n: i64) -> Expr {
    Expr::Literal(Value::Int(n))
}

/// Boolean literal
pub fn bool_(b: bool) -> Expr {
    Expr::Literal(Value::Bool(b))
}

/// String literal
pub fn str_(s: impl Into<String>) -> Expr {
    Expr::Literal(Value::Str(s.into()))
}

/// Nil literal
pub fn nil() -> Expr {
    Expr::Literal(Value::Nil)
}

/// Named symbolic literal
pub fn sym(name: impl Into<String>) -> Expr {
    Expr::Literal(Value::Symbolic(name.into()))
}

/// Variable reference
pub fn var(name: impl Into<String>) -> Expr {
    Expr::Var(name.into())
}

/// Binary operation
pub fn binary(op: BinOp, lhs: Expr, rhs: Expr) -> Expr {
    Expr::Binary {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    }
}

/// Unary operation
pub fn unary(op: UnOp, operand: Expr) -> Expr {
    Expr::Unary {
        op,
        operand: Box::new(operand),
    }
}

/// Logical negation
pub fn not(operand: Expr) -> Expr {
    unary(UnOp::Not, operand)
}

/// Equality comparison
pub fn eq(lhs: Expr, rhs: Expr) -> Expr {
    binary(BinOp::Eq, lhs, rhs)
}

/// Call expression
pub fn call(name: impl Into<String>, args: impl IntoIterator<Item = Expr>) -> Expr {
    Expr::Call {
        name: name.into(),
        args: args.into_iter().collect(),
    }
}

// --- Statements ---

/// Assignment: `x = e`
pub fn assign(name: impl Into<String>, value: Expr) -> Stmt {
    Stmt::Assign {
        name: name.into(),
        value,
    }
}

/// Single declaration with assignment: `x := e`
pub fn decl(name: impl Into<String>, value: Expr) -> Stmt {
    Stmt::DeclAssign {
        names: vec![name.into()],
        values: vec![value],
    }
}

/// Multi-variable declaration: `a, b := e1, e2`
pub fn decl_multi(
    names: impl IntoIterator<Item = impl Into<String>>,
    values: impl IntoIterator<Item = Expr>,
) -> Stmt {
    Stmt::DeclAssign {
        names: names.into_iter().map(Into::into).collect(),
        values: values.into_iter().collect(),
    }
}

/// Plain declaration: `var x` / `var x = e`
pub fn var_decl(name: impl Into<String>, init: Option<Expr>) -> Stmt {
    Stmt::VarDecl {
        name: name.into(),
        init,
    }
}

/// Two statements in order
pub fn seq(first: Stmt, second: Stmt) -> Stmt {
    Stmt::Seq(Box::new(first), Box::new(second))
}

/// Statement list
pub fn block(stmts: impl IntoIterator<Item = Stmt>) -> Stmt {
    Stmt::Block(stmts.into_iter().collect())
}

/// Conditional without initializer
pub fn if_stmt(cond: Expr, then_branch: Stmt, else_branch: Option<Stmt>) -> Stmt {
    Stmt::If {
        init: None,
        cond,
        then_branch: Box::new(then_branch),
        else_branch: else_branch.map(Box::new),
    }
}

/// Conditional with an initializer scoped to the statement
pub fn if_init(init: Stmt, cond: Expr, then_branch: Stmt, else_branch: Option<Stmt>) -> Stmt {
    Stmt::If {
        init: Some(Box::new(init)),
        cond,
        then_branch: Box::new(then_branch),
        else_branch: else_branch.map(Box::new),
    }
}

/// Bare return
pub fn ret() -> Stmt {
    Stmt::Return(None)
}

/// Return with value
pub fn ret_value(value: Expr) -> Stmt {
    Stmt::Return(Some(value))
}

/// Loop break
pub fn brk() -> Stmt {
    Stmt::Break
}

/// Loop continue
pub fn cont() -> Stmt {
    Stmt::Continue
}

/// Call in statement position
pub fn call_stmt(name: impl Into<String>, args: impl IntoIterator<Item = Expr>) -> Stmt {
    Stmt::Call {
        name: name.into(),
        args: args.into_iter().collect(),
    }
}

/// No-op
pub fn noop() -> Stmt {
    Stmt::Noop
}
