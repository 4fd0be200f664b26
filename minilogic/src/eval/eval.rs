//! Statement evaluator
//!
//! Executes IR against an environment, producing an [`Outcome`]. Conditions
//! that cannot be decided concretely or by the condition solver cause both
//! branches to be evaluated and symbolically merged.

use super::config::{CallPolicy, ControlFlowMode, EvalConfig};
use super::env::Env;
use super::outcome::{CallRecord, Flow, Outcome, return_values_equal};
use crate::ir::{BinOp, Expr, Stmt, Value};
use log::{debug, trace};
use std::collections::{BTreeSet, HashSet};

/// Stack growth parameters for deeply nested IR
const STACK_RED_ZONE: usize = 64 * 1024; // 64KB remaining triggers growth
const STACK_GROW_SIZE: usize = 1024 * 1024; // grow by 1MB each time

const DISALLOWED_CALL: &str = "call disallowed by policy";

/// The evaluator
pub struct Evaluator {
    config: EvalConfig,
}

impl Evaluator {
    pub fn new(config: EvalConfig) -> Self {
        Evaluator { config }
    }

    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    /// Execute a statement against an environment.
    ///
    /// Evaluating the same statement, environment, and configuration twice
    /// yields identical outcomes; nothing here draws on ambient state.
    pub fn eval_stmt(&self, stmt: &Stmt, env: Env) -> Outcome {
        let mut calls = Vec::new();
        let flow = self.exec(stmt, env, &mut calls, 0);
        Outcome::new(flow, calls)
    }

    fn exec(&self, stmt: &Stmt, env: Env, calls: &mut Vec<CallRecord>, depth: usize) -> Flow {
        if depth > self.config.max_depth {
            return Flow::Unknown("recursion depth limit exceeded".into());
        }
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || {
            self.exec_inner(stmt, env, calls, depth)
        })
    }

    fn exec_inner(&self, stmt: &Stmt, mut env: Env, calls: &mut Vec<CallRecord>, depth: usize) -> Flow {
        match stmt {
            Stmt::Noop => Flow::Continue(env),

            Stmt::Assign { name, value } => match self.eval_expr(value, &env, calls) {
                Some(v) => {
                    env.set(name.clone(), v);
                    Flow::Continue(env)
                }
                None => Flow::Unknown(DISALLOWED_CALL.into()),
            },

            Stmt::VarDecl { name, init } => {
                let v = match init {
                    Some(e) => match self.eval_expr(e, &env, calls) {
                        Some(v) => v,
                        None => return Flow::Unknown(DISALLOWED_CALL.into()),
                    },
                    None => Value::Nil,
                };
                env.set(name.clone(), v);
                Flow::Continue(env)
            }

            Stmt::DeclAssign { names, values } => {
                if names.len() != values.len() {
                    return Flow::Unknown("mismatched declaration arity".into());
                }
                // All right-hand sides evaluate before any name is bound.
                let mut vals = Vec::with_capacity(values.len());
                for value in values {
                    match self.eval_expr(value, &env, calls) {
                        Some(v) => vals.push(v),
                        None => return Flow::Unknown(DISALLOWED_CALL.into()),
                    }
                }
                for (name, v) in names.iter().zip(vals) {
                    env.set(name.clone(), v);
                }
                Flow::Continue(env)
            }

            Stmt::Seq(first, second) => match self.exec(first, env, calls, depth + 1) {
                Flow::Continue(env) => self.exec(second, env, calls, depth + 1),
                interrupted => interrupted,
            },

            Stmt::Block(stmts) => {
                for s in stmts {
                    match self.exec(s, env, calls, depth + 1) {
                        Flow::Continue(next) => env = next,
                        interrupted => return interrupted,
                    }
                }
                Flow::Continue(env)
            }

            Stmt::Return(value) => {
                if self.config.control_flow == ControlFlowMode::NoTermination {
                    return Flow::Unknown("return outside termination-aware mode".into());
                }
                match value {
                    None => Flow::Return(None),
                    Some(e) => match self.eval_expr(e, &env, calls) {
                        Some(v) => Flow::Return(Some(v)),
                        None => Flow::Unknown(DISALLOWED_CALL.into()),
                    },
                }
            }

            Stmt::Break => self.loop_exit(Flow::Break, "break"),
            Stmt::Continue => self.loop_exit(Flow::ContinueLoop, "continue"),

            Stmt::Call { name, args } => {
                if self.config.call_policy == CallPolicy::Disallow {
                    return Flow::Unknown(DISALLOWED_CALL.into());
                }
                match self.eval_args(args, &env, calls) {
                    Some(vals) => {
                        calls.push(CallRecord::new(name.clone(), vals));
                        Flow::Continue(env)
                    }
                    None => Flow::Unknown(DISALLOWED_CALL.into()),
                }
            }

            Stmt::If {
                init,
                cond,
                then_branch,
                else_branch,
            } => self.exec_if(
                init.as_deref(),
                cond,
                then_branch,
                else_branch.as_deref(),
                env,
                calls,
                depth,
            ),
        }
    }

    fn loop_exit(&self, flow: Flow, what: &str) -> Flow {
        if self.config.control_flow == ControlFlowMode::NoTermination {
            Flow::Unknown(format!("{what} outside termination-aware mode"))
        } else if !self.config.in_loop {
            Flow::Unknown(format!("{what} outside loop context"))
        } else {
            flow
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn exec_if(
        &self,
        init: Option<&Stmt>,
        cond: &Expr,
        then_branch: &Stmt,
        else_branch: Option<&Stmt>,
        env: Env,
        calls: &mut Vec<CallRecord>,
        depth: usize,
    ) -> Flow {
        // The initializer runs in a child frame so its declarations stay
        // scoped to this statement.
        let (scope, init_names) = match init {
            Some(init_stmt) => {
                let names: HashSet<String> = init_stmt.declared_names().into_iter().collect();
                match self.exec(init_stmt, env.child(), calls, depth + 1) {
                    Flow::Continue(e) => (e, Some(names)),
                    interrupted => return interrupted,
                }
            }
            None => (env, None),
        };

        let cond_val = match self.eval_expr(cond, &scope, calls) {
            Some(v) => v,
            None => return Flow::Unknown(DISALLOWED_CALL.into()),
        };

        let taken = match cond_val.as_bool() {
            Some(b) => Some(b),
            None => self.config.solver.solve(cond, &scope),
        };

        let flow = match taken {
            Some(true) => self.exec(then_branch, scope, calls, depth + 1),
            Some(false) => match else_branch {
                Some(els) => self.exec(els, scope, calls, depth + 1),
                None => Flow::Continue(scope),
            },
            None => self.merge_branches(&cond_val, then_branch, else_branch, scope, calls, depth),
        };

        match (flow, init_names) {
            (Flow::Continue(e), Some(names)) => Flow::Continue(e.collapse(&names)),
            (flow, _) => flow,
        }
    }

    /// Evaluate both branches of an undecided condition and merge.
    fn merge_branches(
        &self,
        cond_val: &Value,
        then_branch: &Stmt,
        else_branch: Option<&Stmt>,
        scope: Env,
        calls: &mut Vec<CallRecord>,
        depth: usize,
    ) -> Flow {
        debug!("condition undecided, evaluating both branches: {cond_val}");

        let mut then_calls = calls.clone();
        let then_flow = self.exec(then_branch, scope.clone(), &mut then_calls, depth + 1);
        let mut else_calls = calls.clone();
        let else_flow = match else_branch {
            Some(els) => self.exec(els, scope.clone(), &mut else_calls, depth + 1),
            None => Flow::Continue(scope.clone()),
        };

        if let Flow::Unknown(reason) = &then_flow {
            return Flow::Unknown(reason.clone());
        }
        if let Flow::Unknown(reason) = &else_flow {
            return Flow::Unknown(reason.clone());
        }
        if then_calls != else_calls {
            return Flow::Unknown("branches disagree on call sequence".into());
        }
        *calls = then_calls;

        match (then_flow, else_flow) {
            (Flow::Continue(a), Flow::Continue(b)) => {
                Flow::Continue(merge_envs(&scope, cond_val, &a, &b))
            }
            (Flow::Return(a), Flow::Return(b)) => {
                if return_values_equal(&a, &b) {
                    Flow::Return(a)
                } else {
                    Flow::Unknown("branches return different values".into())
                }
            }
            (Flow::Break, Flow::Break) => Flow::Break,
            (Flow::ContinueLoop, Flow::ContinueLoop) => Flow::ContinueLoop,
            (a, b) => Flow::Unknown(format!(
                "branches diverge in control flow: {} vs {}",
                a.kind(),
                b.kind()
            )),
        }
    }

    fn eval_expr(&self, expr: &Expr, env: &Env, calls: &mut Vec<CallRecord>) -> Option<Value> {
        match expr {
            Expr::Literal(v) => Some(v.clone()),
            // An unbound variable is exactly what symbolic execution is for.
            Expr::Var(name) => {
                Some(env.get(name).unwrap_or_else(|| Value::Symbolic(name.clone())))
            }
            Expr::Unary { op, operand } => {
                let v = self.eval_expr(operand, env, calls)?;
                Some(
                    op.apply(&v)
                        .unwrap_or_else(|| Value::Symbolic(format!("{op}{v}"))),
                )
            }
            Expr::Binary { op, lhs, rhs } => self.eval_binary(*op, lhs, rhs, env, calls),
            Expr::Call { name, args } => {
                if self.config.call_policy == CallPolicy::Disallow {
                    return None;
                }
                let vals = self.eval_args(args, env, calls)?;
                let rendered = render_call(name, &vals);
                calls.push(CallRecord::new(name.clone(), vals));
                Some(Value::Symbolic(rendered))
            }
        }
    }

    fn eval_binary(
        &self,
        op: BinOp,
        lhs: &Expr,
        rhs: &Expr,
        env: &Env,
        calls: &mut Vec<CallRecord>,
    ) -> Option<Value> {
        let l = self.eval_expr(lhs, env, calls)?;
        match op {
            // Short-circuit only on a concrete left side; a concrete right
            // side still decides the result because expressions without
            // calls are pure.
            BinOp::And => {
                if l == Value::Bool(false) {
                    return Some(Value::Bool(false));
                }
                let r = self.eval_expr(rhs, env, calls)?;
                Some(combine_and(l, r))
            }
            BinOp::Or => {
                if l == Value::Bool(true) {
                    return Some(Value::Bool(true));
                }
                let r = self.eval_expr(rhs, env, calls)?;
                Some(combine_or(l, r))
            }
            // Symbolic operands stay symbolic, even `x == x`: deciding
            // structural self-equality is the condition solver's job, which
            // knows to refuse call-bearing terms.
            _ => {
                let r = self.eval_expr(rhs, env, calls)?;
                Some(
                    op.apply(&l, &r)
                        .unwrap_or_else(|| Value::Symbolic(format!("({l} {op} {r})"))),
                )
            }
        }
    }

    /// Left-to-right argument evaluation; the order is observable through
    /// the call log and must not change.
    fn eval_args(&self, args: &[Expr], env: &Env, calls: &mut Vec<CallRecord>) -> Option<Vec<Value>> {
        let mut vals = Vec::with_capacity(args.len());
        for arg in args {
            vals.push(self.eval_expr(arg, env, calls)?);
        }
        Some(vals)
    }
}

fn combine_and(l: Value, r: Value) -> Value {
    match (&l, &r) {
        (Value::Bool(true), _) => r,
        (_, Value::Bool(false)) => Value::Bool(false),
        (_, Value::Bool(true)) => l,
        _ => Value::Symbolic(format!("({l} && {r})")),
    }
}

fn combine_or(l: Value, r: Value) -> Value {
    match (&l, &r) {
        (Value::Bool(false), _) => r,
        (_, Value::Bool(true)) => Value::Bool(true),
        (_, Value::Bool(false)) => l,
        _ => Value::Symbolic(format!("({l} || {r})")),
    }
}

fn render_call(name: &str, args: &[Value]) -> String {
    let rendered: Vec<String> = args.iter().map(ToString::to_string).collect();
    format!("{}({})", name, rendered.join(", "))
}

/// Merge the environments of two undecided branches. Variables that agree
/// keep their value; variables that differ become an `ite` placeholder.
fn merge_envs(scope: &Env, cond_val: &Value, then_env: &Env, else_env: &Env) -> Env {
    let mut merged = scope.clone();
    let mut keys: BTreeSet<&String> = then_env.local().keys().collect();
    keys.extend(else_env.local().keys());
    for key in keys {
        let a = then_env.get(key).unwrap_or(Value::Nil);
        let b = else_env.get(key).unwrap_or(Value::Nil);
        let value = if a == b {
            a
        } else {
            let placeholder = format!("ite({cond_val}, {a}, {b})");
            trace!("merging {key}: {placeholder}");
            Value::Symbolic(placeholder)
        };
        merged.set(key.clone(), value);
    }
    merged
}
