//! Equivalence verification
//!
//! Decides whether two statement trees behave identically from the same
//! starting environment. The decision pipeline short-circuits at the first
//! failed gate: configuration scope, initializer scope, evaluation, flow
//! kind, per-kind payload, call sequence.

mod policy;
mod report;
mod scope;

pub use policy::{FixAction, verify_early_return_rewrite, verify_if_else_chain_flattening};
pub use report::{Reason, Verdict, VerificationReport};

use crate::eval::{CallPolicy, Env, EvalConfig, Evaluator, Flow, Outcome, return_values_equal};
use crate::ir::{Stmt, Value};
use log::debug;
use std::collections::BTreeSet;

/// The equivalence checker
#[derive(Debug, Clone, Default)]
pub struct Verifier {
    config: EvalConfig,
    env: Env,
}

impl Verifier {
    /// Verifier with the default (most conservative) configuration
    pub fn new() -> Self {
        Verifier::default()
    }

    pub fn with_config(config: EvalConfig) -> Self {
        Verifier {
            config,
            env: Env::new(),
        }
    }

    /// Seed the starting environment shared by both trees
    pub fn with_env(mut self, env: Env) -> Self {
        self.env = env;
        self
    }

    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    /// Decide whether `transformed` behaves identically to `original`.
    pub fn check_equivalence(&self, original: &Stmt, transformed: &Stmt) -> VerificationReport {
        for (label, tree) in [("original", original), ("transformed", transformed)] {
            if let Some(why) = scope::control_flow_violation(tree, &self.config) {
                debug!("scope check rejected {label}: {why}");
                return VerificationReport::unknown(Reason::OutOfScope, format!("{label}: {why}"));
            }
            if let Some(why) = scope::call_violation(tree, &self.config) {
                debug!("call policy rejected {label}: {why}");
                return VerificationReport::unknown(
                    Reason::CallsDisallowed,
                    format!("{label}: {why}"),
                );
            }
        }
        for (label, tree) in [("original", original), ("transformed", transformed)] {
            if let Some(why) = scope::scope_violation(tree) {
                debug!("scope-violation check rejected {label}: {why}");
                return VerificationReport::unknown(
                    Reason::ScopeViolation,
                    format!("{label}: {why}"),
                );
            }
        }

        let evaluator = Evaluator::new(self.config.clone());
        let a = evaluator.eval_stmt(original, self.env.clone());
        let b = evaluator.eval_stmt(transformed, self.env.clone());
        debug!("original: {a}");
        debug!("transformed: {b}");

        let report = self.compare(&a, &b);
        if self.config.debug_ir {
            report.with_ir(render_debug(original, transformed, &a, &b))
        } else {
            report
        }
    }

    /// Verify a batch of (original, transformed) pairs.
    pub fn check_all<'a>(
        &self,
        pairs: impl IntoIterator<Item = (&'a Stmt, &'a Stmt)>,
    ) -> Vec<VerificationReport> {
        pairs
            .into_iter()
            .map(|(original, transformed)| self.check_equivalence(original, transformed))
            .collect()
    }

    fn compare(&self, a: &Outcome, b: &Outcome) -> VerificationReport {
        if let Flow::Unknown(why) = &a.flow {
            return VerificationReport::unknown(
                Reason::SymbolicCondition,
                format!("original: {why}"),
            );
        }
        if let Flow::Unknown(why) = &b.flow {
            return VerificationReport::unknown(
                Reason::SymbolicCondition,
                format!("transformed: {why}"),
            );
        }

        if a.kind() != b.kind() {
            return VerificationReport::not_equivalent(
                Reason::DifferentKind,
                format!(
                    "original ends with {}, transformed ends with {}",
                    a.kind(),
                    b.kind()
                ),
            );
        }

        match (&a.flow, &b.flow) {
            (Flow::Continue(e1), Flow::Continue(e2)) => {
                if e1 != e2 {
                    return VerificationReport::not_equivalent(
                        Reason::DifferentEnv,
                        env_diff_detail(e1, e2),
                    );
                }
            }
            (Flow::Return(v1), Flow::Return(v2)) => {
                if !return_values_equal(v1, v2) {
                    return VerificationReport::not_equivalent(
                        Reason::DifferentValue,
                        format!(
                            "original returns {}, transformed returns {}",
                            render_return(v1),
                            render_return(v2)
                        ),
                    );
                }
            }
            // Break and continue-loop carry nothing beyond their kind.
            _ => {}
        }

        if self.config.call_policy == CallPolicy::Opaque && a.calls != b.calls {
            return VerificationReport::not_equivalent(
                Reason::DifferentCalls,
                call_diff_detail(&a.calls, &b.calls),
            );
        }

        VerificationReport::equivalent()
    }
}

fn render_return(value: &Option<Value>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "nil".into(),
    }
}

fn env_diff_detail(e1: &Env, e2: &Env) -> String {
    let a = e1.flatten();
    let b = e2.flatten();
    let mut keys: BTreeSet<&String> = a.keys().collect();
    keys.extend(b.keys());
    for key in keys {
        let (x, y) = (a.get(key), b.get(key));
        if x != y {
            let render =
                |v: Option<&Value>| v.map(ToString::to_string).unwrap_or_else(|| "<unset>".into());
            return format!("variable `{key}`: {} vs {}", render(x), render(y));
        }
    }
    "environments differ".into()
}

fn call_diff_detail(a: &[crate::eval::CallRecord], b: &[crate::eval::CallRecord]) -> String {
    if a.len() != b.len() {
        return format!(
            "original makes {} call(s), transformed makes {}",
            a.len(),
            b.len()
        );
    }
    for (i, (x, y)) in a.iter().zip(b).enumerate() {
        if x != y {
            return format!("call #{}: {x} vs {y}", i + 1);
        }
    }
    "call sequences differ".into()
}

fn render_debug(original: &Stmt, transformed: &Stmt, a: &Outcome, b: &Outcome) -> String {
    format!(
        "--- original ---\n{}\n--- transformed ---\n{}\n--- original outcome ---\n{a}\n--- transformed outcome ---\n{b}\n",
        to_json(original),
        to_json(transformed),
    )
}

fn to_json(stmt: &Stmt) -> String {
    serde_json::to_string_pretty(stmt).unwrap_or_else(|e| format!("<unprintable: {e}>"))
}
