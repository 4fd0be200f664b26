//! Pre-evaluation scope checks
//!
//! Two gates run before anything is evaluated: a configuration gate that
//! rejects control flow and calls the active settings cannot model, and a
//! scope gate that rejects rewrites referencing an if-initializer's
//! variables outside the statement that scopes them.

use crate::eval::{CallPolicy, ControlFlowMode, EvalConfig};
use crate::ir::visit::{contains_call, expr_var_refs, stmt_exprs, walk_stmts};
use crate::ir::{Expr, Stmt};
use std::collections::{HashMap, HashSet};

/// First construct the evaluator cannot model under this configuration.
pub fn control_flow_violation(stmt: &Stmt, config: &EvalConfig) -> Option<String> {
    let mut found: Option<String> = None;
    walk_stmts(stmt, &mut |s| {
        if found.is_some() {
            return;
        }
        let word = match s {
            Stmt::Return(_) => "return",
            Stmt::Break => "break",
            Stmt::Continue => "continue",
            _ => return,
        };
        if config.control_flow == ControlFlowMode::NoTermination {
            found = Some(format!("{word} outside termination-aware mode"));
        } else if !config.in_loop && matches!(s, Stmt::Break | Stmt::Continue) {
            found = Some(format!("{word} outside loop context"));
        }
    });
    found
}

/// Calls present while the policy disallows them.
pub fn call_violation(stmt: &Stmt, config: &EvalConfig) -> Option<String> {
    if config.call_policy == CallPolicy::Disallow && contains_call(stmt) {
        Some("statement contains a call".into())
    } else {
        None
    }
}

/// Detect a reference to an if-initializer's variable outside the `if`
/// statement that scopes it.
///
/// The check is name-based: a reference anywhere outside the scoping
/// statement to *any* name some initializer introduces is flagged, even if
/// it actually resolves to an unrelated outer variable.
pub fn scope_violation(stmt: &Stmt) -> Option<String> {
    let mut scoped = HashSet::new();
    walk_stmts(stmt, &mut |s| {
        if let Stmt::If {
            init: Some(init), ..
        } = s
        {
            scoped.extend(init.declared_names());
        }
    });
    if scoped.is_empty() {
        return None;
    }
    // Counted rather than boolean: nested statements may scope the same name.
    let mut active: HashMap<String, usize> = HashMap::new();
    check_stmt(stmt, &scoped, &mut active)
}

fn check_stmt(
    stmt: &Stmt,
    scoped: &HashSet<String>,
    active: &mut HashMap<String, usize>,
) -> Option<String> {
    match stmt {
        Stmt::If {
            init,
            cond,
            then_branch,
            else_branch,
        } => {
            let introduced = match init {
                Some(init) => init.declared_names(),
                None => Vec::new(),
            };
            for name in &introduced {
                *active.entry(name.clone()).or_insert(0) += 1;
            }

            let mut found = None;
            if let Some(init) = init {
                found = check_stmt(init, scoped, active);
            }
            if found.is_none() {
                found = check_expr(cond, scoped, active);
            }
            if found.is_none() {
                found = check_stmt(then_branch, scoped, active);
            }
            if found.is_none() {
                if let Some(els) = else_branch {
                    found = check_stmt(els, scoped, active);
                }
            }

            for name in &introduced {
                if let Some(count) = active.get_mut(name) {
                    *count -= 1;
                    if *count == 0 {
                        active.remove(name);
                    }
                }
            }
            found
        }
        Stmt::Seq(first, second) => check_stmt(first, scoped, active)
            .or_else(|| check_stmt(second, scoped, active)),
        Stmt::Block(stmts) => {
            for s in stmts {
                if let Some(found) = check_stmt(s, scoped, active) {
                    return Some(found);
                }
            }
            None
        }
        leaf => {
            let targets: Vec<&String> = match leaf {
                Stmt::Assign { name, .. } => vec![name],
                Stmt::DeclAssign { names, .. } => names.iter().collect(),
                Stmt::VarDecl { name, .. } => vec![name],
                _ => Vec::new(),
            };
            for name in targets {
                if scoped.contains(name) && !active.contains_key(name) {
                    return Some(out_of_scope(name));
                }
            }
            for expr in stmt_exprs(leaf) {
                if let Some(found) = check_expr(expr, scoped, active) {
                    return Some(found);
                }
            }
            None
        }
    }
}

fn check_expr(
    expr: &Expr,
    scoped: &HashSet<String>,
    active: &HashMap<String, usize>,
) -> Option<String> {
    let mut refs = Vec::new();
    expr_var_refs(expr, &mut refs);
    refs.into_iter()
        .find(|name| scoped.contains(name) && !active.contains_key(name))
        .map(|name| out_of_scope(&name))
}

fn out_of_scope(name: &str) -> String {
    format!("`{name}` is referenced outside the if statement that scopes it")
}
