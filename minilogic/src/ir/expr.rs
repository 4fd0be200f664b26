//! Expression IR nodes

use super::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Expression
///
/// Expressions are pure: evaluating one never mutates the environment and
/// always terminates. Calls are the one exception to purity and are modeled
/// as opaque, order-tracked effects by the evaluator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// Literal value
    Literal(Value),
    /// Variable reference
    Var(String),
    /// Binary operation
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// Unary operation
    Unary { op: UnOp, operand: Box<Expr> },
    /// Function call
    Call { name: String, args: Vec<Expr> },
}

/// Binary operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,

    // Comparison
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,

    // Logical
    And,
    Or,
}

impl BinOp {
    /// Apply the operator to two concrete values.
    ///
    /// Returns `None` for symbolic or ill-typed operands and for division or
    /// remainder by zero; the caller decides how to represent the residual.
    pub fn apply(self, lhs: &Value, rhs: &Value) -> Option<Value> {
        use Value::*;
        match (self, lhs, rhs) {
            (BinOp::Add, Int(a), Int(b)) => Some(Int(a.wrapping_add(*b))),
            (BinOp::Add, Str(a), Str(b)) => Some(Str(format!("{a}{b}"))),
            (BinOp::Sub, Int(a), Int(b)) => Some(Int(a.wrapping_sub(*b))),
            (BinOp::Mul, Int(a), Int(b)) => Some(Int(a.wrapping_mul(*b))),
            (BinOp::Div, Int(_), Int(0)) => None,
            (BinOp::Div, Int(a), Int(b)) => Some(Int(a.wrapping_div(*b))),
            (BinOp::Mod, Int(_), Int(0)) => None,
            (BinOp::Mod, Int(a), Int(b)) => Some(Int(a.wrapping_rem(*b))),

            (BinOp::Eq, a, b) if a.is_concrete() && b.is_concrete() => Some(Bool(a == b)),
            (BinOp::Ne, a, b) if a.is_concrete() && b.is_concrete() => Some(Bool(a != b)),
            (BinOp::Lt, Int(a), Int(b)) => Some(Bool(a < b)),
            (BinOp::Le, Int(a), Int(b)) => Some(Bool(a <= b)),
            (BinOp::Gt, Int(a), Int(b)) => Some(Bool(a > b)),
            (BinOp::Ge, Int(a), Int(b)) => Some(Bool(a >= b)),
            (BinOp::Lt, Str(a), Str(b)) => Some(Bool(a < b)),
            (BinOp::Le, Str(a), Str(b)) => Some(Bool(a <= b)),
            (BinOp::Gt, Str(a), Str(b)) => Some(Bool(a > b)),
            (BinOp::Ge, Str(a), Str(b)) => Some(Bool(a >= b)),

            (BinOp::And, Bool(a), Bool(b)) => Some(Bool(*a && *b)),
            (BinOp::Or, Bool(a), Bool(b)) => Some(Bool(*a || *b)),

            _ => None,
        }
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
            BinOp::And => "&&",
            BinOp::Or => "||",
        };
        write!(f, "{s}")
    }
}

/// Unary operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnOp {
    /// Logical negation
    Not,
    /// Arithmetic negation
    Neg,
}

impl UnOp {
    /// Apply the operator to a concrete value, `None` when ill-typed.
    pub fn apply(self, operand: &Value) -> Option<Value> {
        match (self, operand) {
            (UnOp::Not, Value::Bool(b)) => Some(Value::Bool(!b)),
            (UnOp::Neg, Value::Int(n)) => Some(Value::Int(n.wrapping_neg())),
            _ => None,
        }
    }
}

impl fmt::Display for UnOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnOp::Not => write!(f, "!"),
            UnOp::Neg => write!(f, "-"),
        }
    }
}

// The rendered form doubles as the name of any symbolic value an expression
// produces, so it must stay deterministic: parenthesized binary operations,
// prefix unary operators, `name(arg, ...)` calls.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(v) => write!(f, "{v}"),
            Expr::Var(name) => write!(f, "{name}"),
            Expr::Binary { op, lhs, rhs } => write!(f, "({lhs} {op} {rhs})"),
            Expr::Unary { op, operand } => write!(f, "{op}{operand}"),
            Expr::Call { name, args } => {
                write!(f, "{name}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binop_apply_arithmetic() {
        assert_eq!(
            BinOp::Add.apply(&Value::Int(2), &Value::Int(3)),
            Some(Value::Int(5))
        );
        assert_eq!(
            BinOp::Mul.apply(&Value::Int(4), &Value::Int(5)),
            Some(Value::Int(20))
        );
        assert_eq!(BinOp::Div.apply(&Value::Int(1), &Value::Int(0)), None);
        assert_eq!(BinOp::Mod.apply(&Value::Int(1), &Value::Int(0)), None);
    }

    #[test]
    fn test_binop_apply_comparison() {
        assert_eq!(
            BinOp::Lt.apply(&Value::Int(1), &Value::Int(2)),
            Some(Value::Bool(true))
        );
        assert_eq!(
            BinOp::Eq.apply(&Value::Nil, &Value::Nil),
            Some(Value::Bool(true))
        );
        // Concrete values of different types compare unequal, not ill-typed
        assert_eq!(
            BinOp::Eq.apply(&Value::Int(0), &Value::Bool(false)),
            Some(Value::Bool(false))
        );
    }

    #[test]
    fn test_binop_apply_refuses_symbolic() {
        let x = Value::Symbolic("x".into());
        assert_eq!(BinOp::Add.apply(&x, &Value::Int(1)), None);
        assert_eq!(BinOp::Eq.apply(&x, &x), None);
    }

    #[test]
    fn test_unop_apply() {
        assert_eq!(
            UnOp::Not.apply(&Value::Bool(true)),
            Some(Value::Bool(false))
        );
        assert_eq!(UnOp::Neg.apply(&Value::Int(3)), Some(Value::Int(-3)));
        assert_eq!(UnOp::Not.apply(&Value::Int(3)), None);
    }

    #[test]
    fn test_string_concat() {
        assert_eq!(
            BinOp::Add.apply(&Value::Str("a".into()), &Value::Str("b".into())),
            Some(Value::Str("ab".into()))
        );
    }

    #[test]
    fn test_expr_display() {
        let e = Expr::Binary {
            op: BinOp::Add,
            lhs: Box::new(Expr::Var("x".into())),
            rhs: Box::new(Expr::Literal(Value::Int(1))),
        };
        assert_eq!(e.to_string(), "(x + 1)");

        let n = Expr::Unary {
            op: UnOp::Not,
            operand: Box::new(Expr::Var("ok".into())),
        };
        assert_eq!(n.to_string(), "!ok");

        let c = Expr::Call {
            name: "f".into(),
            args: vec![Expr::Var("a".into()), Expr::Literal(Value::Int(2))],
        };
        assert_eq!(c.to_string(), "f(a, 2)");
    }
}
