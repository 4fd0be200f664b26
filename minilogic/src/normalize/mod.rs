//! Canonicalizing IR rewrites
//!
//! `normalize` is structure-preserving: it never changes what a statement
//! does, only how it is spelled. The chain conversions are shape rewrites
//! between nested and flattened if/else-if/else forms; both directions
//! insist that every non-final branch provably terminates, because that is
//! what makes the flat form equivalent to the nested one.

use crate::ir::{BinOp, Expr, IrResult, Stmt, UnOp, Unsupported, Value};

/// Stack growth parameters for deeply nested IR
const STACK_RED_ZONE: usize = 64 * 1024;
const STACK_GROW_SIZE: usize = 1024 * 1024;

/// Rewrite a statement into canonical form.
pub fn normalize(stmt: &Stmt) -> Stmt {
    stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || normalize_inner(stmt))
}

fn normalize_inner(stmt: &Stmt) -> Stmt {
    match stmt {
        Stmt::Assign { name, value } => Stmt::Assign {
            name: name.clone(),
            value: normalize_expr(value),
        },
        Stmt::DeclAssign { names, values } => Stmt::DeclAssign {
            names: names.clone(),
            values: values.iter().map(normalize_expr).collect(),
        },
        Stmt::VarDecl { name, init } => Stmt::VarDecl {
            name: name.clone(),
            init: init.as_ref().map(normalize_expr),
        },
        Stmt::Seq(first, second) => join(normalize(first), normalize(second)),
        Stmt::Block(stmts) => {
            let mut out: Vec<Stmt> = stmts
                .iter()
                .map(normalize)
                .filter(|s| *s != Stmt::Noop)
                .collect();
            match out.len() {
                0 => Stmt::Noop,
                1 => out.remove(0),
                _ => Stmt::Block(out),
            }
        }
        Stmt::If {
            init,
            cond,
            then_branch,
            else_branch,
        } => {
            let init = init
                .as_ref()
                .map(|s| normalize(s))
                .filter(|s| *s != Stmt::Noop);
            let cond = normalize_expr(cond);
            let then_branch = normalize(then_branch);
            let else_branch = else_branch
                .as_ref()
                .map(|s| normalize(s))
                .filter(|s| *s != Stmt::Noop);

            // A literal condition selects its branch at rewrite time. The
            // initializer's effects still happen first.
            match cond {
                Expr::Literal(Value::Bool(true)) => join_option(init, then_branch),
                Expr::Literal(Value::Bool(false)) => {
                    join_option(init, else_branch.unwrap_or(Stmt::Noop))
                }
                cond => Stmt::If {
                    init: init.map(Box::new),
                    cond,
                    then_branch: Box::new(then_branch),
                    else_branch: else_branch.map(Box::new),
                },
            }
        }
        Stmt::Return(value) => Stmt::Return(value.as_ref().map(normalize_expr)),
        Stmt::Call { name, args } => Stmt::Call {
            name: name.clone(),
            args: args.iter().map(normalize_expr).collect(),
        },
        Stmt::Break | Stmt::Continue | Stmt::Noop => stmt.clone(),
    }
}

/// Sequence two statements, dropping no-ops.
fn join(first: Stmt, second: Stmt) -> Stmt {
    match (first, second) {
        (Stmt::Noop, s) | (s, Stmt::Noop) => s,
        (a, b) => Stmt::Seq(Box::new(a), Box::new(b)),
    }
}

fn join_option(first: Option<Stmt>, second: Stmt) -> Stmt {
    match first {
        Some(f) => join(f, second),
        None => second,
    }
}

/// Rewrite an expression into canonical form.
pub fn normalize_expr(expr: &Expr) -> Expr {
    match expr {
        Expr::Literal(_) | Expr::Var(_) => expr.clone(),
        Expr::Unary { op, operand } => {
            let inner = normalize_expr(operand);
            if *op == UnOp::Not {
                if let Expr::Unary {
                    op: UnOp::Not,
                    operand: doubled,
                } = &inner
                {
                    return (**doubled).clone();
                }
            }
            if let Expr::Literal(v) = &inner {
                if let Some(folded) = op.apply(v) {
                    return Expr::Literal(folded);
                }
            }
            Expr::Unary {
                op: *op,
                operand: Box::new(inner),
            }
        }
        Expr::Binary { op, lhs, rhs } => {
            let l = normalize_expr(lhs);
            let r = normalize_expr(rhs);
            match (op, &l) {
                (BinOp::And, Expr::Literal(Value::Bool(true))) => return r,
                (BinOp::And, Expr::Literal(Value::Bool(false))) => {
                    return Expr::Literal(Value::Bool(false));
                }
                (BinOp::Or, Expr::Literal(Value::Bool(true))) => {
                    return Expr::Literal(Value::Bool(true));
                }
                (BinOp::Or, Expr::Literal(Value::Bool(false))) => return r,
                _ => {}
            }
            if let (Expr::Literal(a), Expr::Literal(b)) = (&l, &r) {
                if let Some(folded) = op.apply(a, b) {
                    return Expr::Literal(folded);
                }
            }
            Expr::Binary {
                op: *op,
                lhs: Box::new(l),
                rhs: Box::new(r),
            }
        }
        Expr::Call { name, args } => Expr::Call {
            name: name.clone(),
            args: args.iter().map(normalize_expr).collect(),
        },
    }
}

/// True when every path through the statement ends in return, break, or
/// continue.
pub fn always_terminates(stmt: &Stmt) -> bool {
    match stmt {
        Stmt::Return(_) | Stmt::Break | Stmt::Continue => true,
        Stmt::Seq(first, second) => always_terminates(first) || always_terminates(second),
        Stmt::Block(stmts) => stmts.iter().any(always_terminates),
        Stmt::If {
            then_branch,
            else_branch,
            ..
        } => {
            always_terminates(then_branch)
                && else_branch.as_ref().is_some_and(|e| always_terminates(e))
        }
        _ => false,
    }
}

/// Convert a right-nested if/else-if/else chain into a flat sequence of
/// single-armed `if`s followed by the final fallback statement.
///
/// Requires every non-final branch to provably terminate; otherwise the
/// flat form would fall through into the next arm.
pub fn flatten_if_chain(stmt: &Stmt) -> IrResult<Stmt> {
    let mut arms: Vec<(Expr, Stmt)> = Vec::new();
    let mut cur = stmt;
    loop {
        match cur {
            Stmt::If {
                init: None,
                cond,
                then_branch,
                else_branch: Some(els),
            } => {
                if !always_terminates(then_branch) {
                    return Err(Unsupported::non_terminating(format!("branch for {cond}")));
                }
                arms.push((cond.clone(), (**then_branch).clone()));
                cur = els.as_ref();
            }
            fallback => {
                if arms.is_empty() {
                    return Err(Unsupported::not_a_chain(
                        "expected an if with an else branch",
                    ));
                }
                let mut stmts: Vec<Stmt> = arms
                    .into_iter()
                    .map(|(cond, then_branch)| Stmt::If {
                        init: None,
                        cond,
                        then_branch: Box::new(then_branch),
                        else_branch: None,
                    })
                    .collect();
                stmts.push(fallback.clone());
                return Ok(Stmt::Block(stmts));
            }
        }
    }
}

/// Inverse of [`flatten_if_chain`]: rebuild the right-nested chain from a
/// flat block of single-armed terminating `if`s plus a fallback.
pub fn unflatten_if_chain(stmt: &Stmt) -> IrResult<Stmt> {
    let Stmt::Block(stmts) = stmt else {
        return Err(Unsupported::not_a_chain("expected a block"));
    };
    let (fallback, arms) = match stmts.split_last() {
        Some((fallback, arms)) if !arms.is_empty() => (fallback, arms),
        _ => {
            return Err(Unsupported::not_a_chain(
                "block needs at least one arm and a fallback",
            ));
        }
    };

    let mut nested = fallback.clone();
    for arm in arms.iter().rev() {
        match arm {
            Stmt::If {
                init: None,
                cond,
                then_branch,
                else_branch: None,
            } => {
                if !always_terminates(then_branch) {
                    return Err(Unsupported::non_terminating(format!("branch for {cond}")));
                }
                nested = Stmt::If {
                    init: None,
                    cond: cond.clone(),
                    then_branch: then_branch.clone(),
                    else_branch: Some(Box::new(nested)),
                };
            }
            _ => {
                return Err(Unsupported::not_a_chain(
                    "arm is not a single-armed if",
                ));
            }
        }
    }
    Ok(nested)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::build::*;

    #[test]
    fn test_constant_folding() {
        let e = binary(BinOp::Add, int(2), binary(BinOp::Mul, int(3), int(4)));
        assert_eq!(normalize_expr(&e), int(14));
    }

    #[test]
    fn test_boolean_identities() {
        assert_eq!(normalize_expr(&binary(BinOp::And, bool_(true), var("x"))), var("x"));
        assert_eq!(
            normalize_expr(&binary(BinOp::And, bool_(false), var("x"))),
            bool_(false)
        );
        assert_eq!(
            normalize_expr(&binary(BinOp::Or, bool_(true), var("x"))),
            bool_(true)
        );
        assert_eq!(normalize_expr(&binary(BinOp::Or, bool_(false), var("x"))), var("x"));
    }

    #[test]
    fn test_double_negation() {
        assert_eq!(normalize_expr(&not(not(var("x")))), var("x"));
        assert_eq!(normalize_expr(&not(not(not(var("x"))))), not(var("x")));
        assert_eq!(normalize_expr(&not(bool_(true))), bool_(false));
    }

    #[test]
    fn test_division_by_zero_is_not_folded() {
        let e = binary(BinOp::Div, int(1), int(0));
        assert_eq!(normalize_expr(&e), e);
    }

    #[test]
    fn test_noop_elimination() {
        assert_eq!(normalize(&seq(noop(), assign("x", int(1)))), assign("x", int(1)));
        assert_eq!(normalize(&seq(noop(), noop())), noop());
        assert_eq!(normalize(&block([noop(), noop()])), noop());
        assert_eq!(
            normalize(&block([noop(), ret(), noop()])),
            ret()
        );
    }

    #[test]
    fn test_literal_if_folds_to_taken_branch() {
        let s = if_stmt(bool_(true), assign("x", int(1)), Some(assign("x", int(2))));
        assert_eq!(normalize(&s), assign("x", int(1)));

        let s = if_stmt(bool_(false), assign("x", int(1)), Some(assign("x", int(2))));
        assert_eq!(normalize(&s), assign("x", int(2)));

        let s = if_stmt(bool_(false), assign("x", int(1)), None);
        assert_eq!(normalize(&s), noop());
    }

    #[test]
    fn test_literal_if_keeps_initializer_effects() {
        let s = if_init(decl("x", int(1)), bool_(false), ret(), Some(assign("y", var("x"))));
        assert_eq!(
            normalize(&s),
            seq(decl("x", int(1)), assign("y", var("x")))
        );
    }

    #[test]
    fn test_folded_condition_selects_branch() {
        // !(false) folds to true, then the if folds away
        let s = if_stmt(not(bool_(false)), ret_value(int(1)), Some(ret_value(int(2))));
        assert_eq!(normalize(&s), ret_value(int(1)));
    }

    #[test]
    fn test_empty_else_is_dropped() {
        let s = if_stmt(var("c"), ret(), Some(noop()));
        assert_eq!(normalize(&s), if_stmt(var("c"), ret(), None));
    }

    #[test]
    fn test_always_terminates() {
        assert!(always_terminates(&ret()));
        assert!(always_terminates(&brk()));
        assert!(always_terminates(&seq(noop(), ret())));
        assert!(always_terminates(&block([noop(), ret(), noop()])));
        assert!(always_terminates(&if_stmt(var("c"), ret(), Some(cont()))));
        assert!(!always_terminates(&if_stmt(var("c"), ret(), None)));
        assert!(!always_terminates(&assign("x", int(1))));
        assert!(!always_terminates(&noop()));
    }

    #[test]
    fn test_flatten_two_arm_chain() {
        let nested = if_stmt(
            var("a"),
            ret_value(int(1)),
            Some(if_stmt(var("b"), ret_value(int(2)), Some(ret_value(int(0))))),
        );
        let flat = flatten_if_chain(&nested).unwrap();
        assert_eq!(
            flat,
            block([
                if_stmt(var("a"), ret_value(int(1)), None),
                if_stmt(var("b"), ret_value(int(2)), None),
                ret_value(int(0)),
            ])
        );
    }

    #[test]
    fn test_unflatten_is_inverse() {
        let nested = if_stmt(
            var("a"),
            ret_value(int(1)),
            Some(if_stmt(var("b"), ret_value(int(2)), Some(ret_value(int(0))))),
        );
        let flat = flatten_if_chain(&nested).unwrap();
        assert_eq!(unflatten_if_chain(&flat).unwrap(), nested);
    }

    #[test]
    fn test_flatten_rejects_non_terminating_branch() {
        let nested = if_stmt(var("a"), assign("x", int(1)), Some(ret()));
        assert!(matches!(
            flatten_if_chain(&nested),
            Err(Unsupported::NonTerminatingBranch(_))
        ));
    }

    #[test]
    fn test_flatten_rejects_non_chain() {
        assert!(matches!(
            flatten_if_chain(&assign("x", int(1))),
            Err(Unsupported::NotAChain(_))
        ));
        // no else branch at the top: nothing to use as a fallback
        assert!(matches!(
            flatten_if_chain(&if_stmt(var("a"), ret(), None)),
            Err(Unsupported::NotAChain(_))
        ));
    }

    #[test]
    fn test_unflatten_rejects_bad_shapes() {
        assert!(unflatten_if_chain(&noop()).is_err());
        assert!(unflatten_if_chain(&block([ret()])).is_err());
        let with_else = block([if_stmt(var("a"), ret(), Some(noop())), ret()]);
        assert!(unflatten_if_chain(&with_else).is_err());
    }
}
