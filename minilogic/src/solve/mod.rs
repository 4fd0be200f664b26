//! Best-effort condition solving
//!
//! The solver deduces a boolean from a symbolic condition when it can and
//! says so when it cannot. `None` is an ordinary answer, not an error: it
//! tells the evaluator to fall back to evaluating both branches and merging.

use crate::eval::Env;
use crate::ir::visit::expr_contains_call;
use crate::ir::{BinOp, Expr, UnOp, Value};
use log::trace;

/// Deduce a boolean from a condition, or decline.
pub trait ConditionSolver: Send + Sync {
    fn solve(&self, cond: &Expr, env: &Env) -> Option<bool>;
}

/// The default solver: literal booleans, environment-bound booleans,
/// negation, and structural self-comparison. Declines anything containing a
/// call, whose result and side effects are unknowable here.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralSolver;

impl ConditionSolver for StructuralSolver {
    fn solve(&self, cond: &Expr, env: &Env) -> Option<bool> {
        if expr_contains_call(cond) {
            trace!("solver declines condition with call: {cond}");
            return None;
        }
        let answer = solve_call_free(cond, env);
        trace!("solver: {cond} -> {answer:?}");
        answer
    }
}

fn solve_call_free(cond: &Expr, env: &Env) -> Option<bool> {
    match cond {
        Expr::Literal(Value::Bool(b)) => Some(*b),
        Expr::Var(name) => env.get(name)?.as_bool(),
        Expr::Unary {
            op: UnOp::Not,
            operand,
        } => solve_call_free(operand, env).map(|b| !b),
        // A term always equals itself, whatever it evaluates to.
        Expr::Binary {
            op: BinOp::Eq,
            lhs,
            rhs,
        } if lhs == rhs => Some(true),
        Expr::Binary {
            op: BinOp::Ne,
            lhs,
            rhs,
        } if lhs == rhs => Some(false),
        _ => None,
    }
}
