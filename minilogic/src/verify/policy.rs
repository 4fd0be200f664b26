//! Auto-fix gating and canned rewrite checks
//!
//! The consumer side of a report is a one-way mapping: proven equivalence
//! may be applied automatically, an unknown requires a human, a proven
//! difference rejects the rewrite and flags the rule that proposed it.

use super::report::{Reason, VerificationReport, Verdict};
use super::Verifier;
use crate::eval::{ControlFlowMode, EvalConfig};
use crate::ir::build::{if_stmt, ret_value, seq};
use crate::ir::{Expr, Stmt};
use crate::normalize::flatten_if_chain;

/// What the auto-fix subsystem may do with a verified rewrite
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixAction {
    /// Safe to apply automatically
    Apply,
    /// Warn and require manual confirmation
    Confirm,
    /// Reject the rewrite and flag the originating rule
    Reject,
}

impl FixAction {
    pub fn for_report(report: &VerificationReport) -> FixAction {
        match report.verdict {
            Verdict::Equivalent => FixAction::Apply,
            Verdict::Unknown => FixAction::Confirm,
            Verdict::NotEquivalent => FixAction::Reject,
        }
    }
}

impl From<&VerificationReport> for FixAction {
    fn from(report: &VerificationReport) -> Self {
        FixAction::for_report(report)
    }
}

// Rewrite recipes model early returns by construction.
fn rewrite_verifier() -> Verifier {
    Verifier::with_config(EvalConfig::new().with_control_flow(ControlFlowMode::EarlyReturnAware))
}

/// Check `if cond { return v } else { S }` against `if cond { return v }; S`.
///
/// Works for any condition; an unresolvable one reports `Unknown` rather
/// than guessing.
pub fn verify_early_return_rewrite(
    cond: Expr,
    return_val: Expr,
    else_stmt: Stmt,
) -> VerificationReport {
    let original = if_stmt(
        cond.clone(),
        ret_value(return_val.clone()),
        Some(else_stmt.clone()),
    );
    let transformed = seq(if_stmt(cond, ret_value(return_val), None), else_stmt);
    rewrite_verifier().check_equivalence(&original, &transformed)
}

/// Check a nested if/else-if/else chain of returns against its flattened
/// sequence form, for arbitrary condition lists.
pub fn verify_if_else_chain_flattening(
    conds: &[Expr],
    returns: &[Expr],
    fallback: Stmt,
) -> VerificationReport {
    if conds.is_empty() || conds.len() != returns.len() {
        return VerificationReport::unknown(
            Reason::OutOfScope,
            "condition and return lists must be non-empty and of equal length",
        );
    }

    let mut nested = fallback;
    for (cond, val) in conds.iter().zip(returns).rev() {
        nested = if_stmt(cond.clone(), ret_value(val.clone()), Some(nested));
    }
    let flattened = match flatten_if_chain(&nested) {
        Ok(s) => s,
        Err(e) => return VerificationReport::unknown(Reason::OutOfScope, e.to_string()),
    };
    rewrite_verifier().check_equivalence(&nested, &flattened)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::build::*;

    #[test]
    fn test_fix_action_mapping() {
        assert_eq!(
            FixAction::for_report(&VerificationReport::equivalent()),
            FixAction::Apply
        );
        assert_eq!(
            FixAction::for_report(&VerificationReport::unknown(
                Reason::SymbolicCondition,
                "cond"
            )),
            FixAction::Confirm
        );
        assert_eq!(
            FixAction::for_report(&VerificationReport::not_equivalent(
                Reason::DifferentEnv,
                "x"
            )),
            FixAction::Reject
        );
    }

    #[test]
    fn test_early_return_law_for_literals() {
        for cond in [bool_(true), bool_(false)] {
            let report =
                verify_early_return_rewrite(cond, int(1), assign("x", int(2)));
            assert!(report.is_equivalent(), "{report}");
        }
    }

    #[test]
    fn test_early_return_symbolic_condition_is_unknown() {
        // the transformed form's single-armed if cannot merge a returning
        // branch with a fall-through one, so nothing is guessed
        let report = verify_early_return_rewrite(var("c"), int(1), assign("x", int(2)));
        assert_eq!(report.verdict, Verdict::Unknown);
        assert_eq!(report.reason, Reason::SymbolicCondition);
        assert_eq!(FixAction::for_report(&report), FixAction::Confirm);
    }

    #[test]
    fn test_chain_flattening_two_conditions_all_truth_values() {
        for a in [false, true] {
            for b in [false, true] {
                let report = verify_if_else_chain_flattening(
                    &[bool_(a), bool_(b)],
                    &[int(1), int(2)],
                    ret_value(int(0)),
                );
                assert!(report.is_equivalent(), "a={a} b={b}: {report}");
            }
        }
    }

    #[test]
    fn test_chain_flattening_three_conditions_all_truth_values() {
        for bits in 0..8u8 {
            let conds: Vec<_> = (0..3).map(|i| bool_(bits & (1 << i) != 0)).collect();
            let report = verify_if_else_chain_flattening(
                &conds,
                &[int(1), int(2), int(3)],
                ret_value(int(0)),
            );
            assert!(report.is_equivalent(), "bits={bits}: {report}");
        }
    }

    #[test]
    fn test_chain_flattening_rejects_mismatched_lists() {
        let report = verify_if_else_chain_flattening(&[bool_(true)], &[], ret());
        assert_eq!(report.verdict, Verdict::Unknown);
        assert_eq!(report.reason, Reason::OutOfScope);
    }
}
