//! Generic pre-order IR traversal
//!
//! Every mechanical tree query in the crate goes through these two walkers,
//! so a new `Stmt` variant is wired up in exactly one place.

use super::{Expr, Stmt};

/// Visit `stmt` and every statement nested inside it, pre-order.
pub fn walk_stmts(stmt: &Stmt, f: &mut dyn FnMut(&Stmt)) {
    f(stmt);
    match stmt {
        Stmt::Seq(a, b) => {
            walk_stmts(a, f);
            walk_stmts(b, f);
        }
        Stmt::Block(stmts) => {
            for s in stmts {
                walk_stmts(s, f);
            }
        }
        Stmt::If {
            init,
            then_branch,
            else_branch,
            ..
        } => {
            if let Some(init) = init {
                walk_stmts(init, f);
            }
            walk_stmts(then_branch, f);
            if let Some(els) = else_branch {
                walk_stmts(els, f);
            }
        }
        Stmt::Assign { .. }
        | Stmt::DeclAssign { .. }
        | Stmt::VarDecl { .. }
        | Stmt::Return(_)
        | Stmt::Break
        | Stmt::Continue
        | Stmt::Call { .. }
        | Stmt::Noop => {}
    }
}

/// Visit every expression in the statement subtree, operands included.
pub fn walk_exprs(stmt: &Stmt, f: &mut dyn FnMut(&Expr)) {
    walk_stmts(stmt, &mut |s| {
        for e in stmt_exprs(s) {
            walk_expr(e, f);
        }
    });
}

/// Visit `expr` and every operand nested inside it, pre-order.
pub fn walk_expr(expr: &Expr, f: &mut dyn FnMut(&Expr)) {
    f(expr);
    match expr {
        Expr::Binary { lhs, rhs, .. } => {
            walk_expr(lhs, f);
            walk_expr(rhs, f);
        }
        Expr::Unary { operand, .. } => walk_expr(operand, f),
        Expr::Call { args, .. } => {
            for arg in args {
                walk_expr(arg, f);
            }
        }
        Expr::Literal(_) | Expr::Var(_) => {}
    }
}

/// The expressions held directly by one statement node (not recursive).
pub fn stmt_exprs(stmt: &Stmt) -> Vec<&Expr> {
    match stmt {
        Stmt::Assign { value, .. } => vec![value],
        Stmt::DeclAssign { values, .. } => values.iter().collect(),
        Stmt::VarDecl { init, .. } => init.iter().collect(),
        Stmt::If { cond, .. } => vec![cond],
        Stmt::Return(value) => value.iter().collect(),
        Stmt::Call { args, .. } => args.iter().collect(),
        Stmt::Seq(..) | Stmt::Block(_) | Stmt::Break | Stmt::Continue | Stmt::Noop => Vec::new(),
    }
}

/// True when any statement in the subtree satisfies the predicate.
pub fn any_stmt(stmt: &Stmt, pred: impl Fn(&Stmt) -> bool) -> bool {
    let mut found = false;
    walk_stmts(stmt, &mut |s| found = found || pred(s));
    found
}

/// True when the expression contains a call anywhere.
pub fn expr_contains_call(expr: &Expr) -> bool {
    let mut found = false;
    walk_expr(expr, &mut |e| {
        found = found || matches!(e, Expr::Call { .. })
    });
    found
}

/// True when the statement subtree contains a call, statement or expression.
pub fn contains_call(stmt: &Stmt) -> bool {
    let mut found = false;
    walk_stmts(stmt, &mut |s| {
        found = found || matches!(s, Stmt::Call { .. })
    });
    if !found {
        walk_exprs(stmt, &mut |e| {
            found = found || matches!(e, Expr::Call { .. })
        });
    }
    found
}

/// Collect every variable name read by the expression (call names excluded).
pub fn expr_var_refs(expr: &Expr, out: &mut Vec<String>) {
    walk_expr(expr, &mut |e| {
        if let Expr::Var(name) = e {
            out.push(name.clone());
        }
    });
}
