//! Integration tests for the equivalence verifier
//!
//! Exercises the public API end to end:
//! - evaluation semantics (scoping, short-circuiting, call tracking)
//! - the verification pipeline and its reason codes
//! - the canned rewrite recipes used by auto-fix rules
//! - the normalizer's canonical forms and chain conversions

use minilogic::build::*;
use minilogic::{
    BinOp, CallPolicy, ControlFlowMode, Env, EvalConfig, Evaluator, FixAction, Flow, Reason,
    Value, Verdict, Verifier, flatten_if_chain, normalize, unflatten_if_chain,
    verify_early_return_rewrite, verify_if_else_chain_flattening,
};

/// Verifier that models early returns, the configuration rewrite rules use
fn verifier() -> Verifier {
    Verifier::with_config(EvalConfig::new().with_control_flow(ControlFlowMode::EarlyReturnAware))
}

fn assert_equivalent(original: &minilogic::Stmt, transformed: &minilogic::Stmt) {
    let report = verifier().check_equivalence(original, transformed);
    assert!(report.is_equivalent(), "{report}");
}

// ============================================
// Reflexivity and determinism
// ============================================

#[test]
fn test_reflexivity_over_representative_statements() {
    let cases = [
        noop(),
        assign("x", int(1)),
        seq(decl("x", int(1)), assign("y", var("x"))),
        block([var_decl("a", None), call_stmt("f", [var("a")])]),
        if_stmt(var("c"), assign("x", int(1)), Some(assign("x", int(2)))),
        if_init(decl("n", int(3)), binary(BinOp::Gt, var("n"), int(0)), ret_value(var("n")), Some(ret())),
        ret_value(binary(BinOp::Mul, var("k"), int(2))),
    ];
    for s in &cases {
        let report = verifier().check_equivalence(s, s);
        assert!(report.is_equivalent(), "not reflexive: {report}");
    }
}

#[test_log::test]
fn test_evaluation_is_deterministic() {
    let s = block([
        decl("x", var("n")),
        if_stmt(var("c"), assign("x", int(1)), None),
        call_stmt("f", [var("x")]),
        ret_value(var("x")),
    ]);
    let config = EvalConfig::new().with_control_flow(ControlFlowMode::EarlyReturnAware);
    let evaluator = Evaluator::new(config);
    let env = Env::from([("n", Value::Int(5))]);
    let first = evaluator.eval_stmt(&s, env.clone());
    let second = evaluator.eval_stmt(&s, env);
    assert_eq!(first, second);
}

// ============================================
// Early-return rewrites
// ============================================

#[test]
fn test_early_return_law() {
    for cond in [bool_(true), bool_(false)] {
        for else_stmt in [assign("x", int(2)), ret_value(int(9)), noop()] {
            let report = verify_early_return_rewrite(cond.clone(), int(1), else_stmt);
            assert!(report.is_equivalent(), "cond={cond}: {report}");
        }
    }
}

#[test]
fn test_unsafe_rewrite_is_detected() {
    // if true { x = 1 } else { return 2 }   keeps running after x = 1;
    // if true { x = 1 }; return 2           always returns 2
    let original = if_stmt(bool_(true), assign("x", int(1)), Some(ret_value(int(2))));
    let transformed = seq(
        if_stmt(bool_(true), assign("x", int(1)), None),
        ret_value(int(2)),
    );
    let report = verifier().check_equivalence(&original, &transformed);
    assert_eq!(report.verdict, Verdict::NotEquivalent);
    assert_eq!(report.reason, Reason::DifferentKind);
    assert_eq!(FixAction::for_report(&report), FixAction::Reject);
}

#[test]
fn test_early_return_recipe_never_guesses() {
    let report = verify_early_return_rewrite(var("cond"), int(1), assign("x", int(2)));
    assert_eq!(report.verdict, Verdict::Unknown);
    assert_eq!(FixAction::for_report(&report), FixAction::Confirm);
}

// ============================================
// Init-scoped variables
// ============================================

#[test]
fn test_scope_leakage_dead_branch() {
    // if x := 1; false { y = 2 }: x never escapes, y never assigned
    let s = if_init(decl("x", int(1)), bool_(false), assign("y", int(2)), None);
    assert_equivalent(&s, &noop());
}

#[test]
fn test_init_var_shadowing() {
    let config = EvalConfig::new().with_control_flow(ControlFlowMode::EarlyReturnAware);
    let evaluator = Evaluator::new(config);
    let env = Env::from([("x", Value::Int(100))]);

    let returning = if_init(
        decl("x", int(1)),
        binary(BinOp::Gt, var("x"), int(0)),
        ret_value(var("x")),
        Some(ret_value(int(0))),
    );
    let outcome = evaluator.eval_stmt(&returning, env.clone());
    assert_eq!(outcome.flow, Flow::Return(Some(Value::Int(1))));

    let falling_through = if_init(
        decl("x", int(1)),
        binary(BinOp::Gt, var("x"), int(0)),
        assign("y", var("x")),
        None,
    );
    let outcome = evaluator.eval_stmt(&falling_through, env);
    match outcome.flow {
        Flow::Continue(env) => {
            assert_eq!(env.get("x"), Some(Value::Int(100)));
            assert_eq!(env.get("y"), Some(Value::Int(1)));
        }
        other => panic!("expected continue, got {other:?}"),
    }
}

#[test]
fn test_hoisting_an_init_var_is_a_scope_violation() {
    let original = if_init(decl("v", call("f", [])), eq(var("v"), nil()), ret(), None);
    // a broken rewrite that moves the declaration's use past the if
    let transformed = seq(
        if_init(decl("v", call("f", [])), eq(var("v"), nil()), ret(), None),
        assign("w", var("v")),
    );
    let report = verifier().check_equivalence(&original, &transformed);
    assert_eq!(report.verdict, Verdict::Unknown);
    assert_eq!(report.reason, Reason::ScopeViolation);
}

// ============================================
// Opaque calls
// ============================================

#[test]
fn test_call_order_is_preserved_and_compared() {
    let fg = seq(call_stmt("f", []), call_stmt("g", []));
    let gf = seq(call_stmt("g", []), call_stmt("f", []));

    assert_equivalent(&fg, &fg.clone());

    let report = verifier().check_equivalence(&fg, &gf);
    assert_eq!(report.verdict, Verdict::NotEquivalent);
    assert_eq!(report.reason, Reason::DifferentCalls);
}

#[test]
fn test_argument_evaluation_order_is_observable() {
    // g runs while computing f's argument, so g is observed first
    let nested = call_stmt("f", [call("g", [int(1)])]);
    let sequential = seq(call_stmt("g", [int(1)]), call_stmt("f", [sym("g(1)")]));
    assert_equivalent(&nested, &sequential);
}

#[test]
fn test_calls_behind_a_skipped_branch_do_not_count() {
    let s = if_stmt(bool_(false), call_stmt("f", []), None);
    assert_equivalent(&s, &noop());
}

#[test]
fn test_disallow_policy_rejects_any_call() {
    let config = EvalConfig::new()
        .with_control_flow(ControlFlowMode::EarlyReturnAware)
        .with_call_policy(CallPolicy::Disallow);
    let strict = Verifier::with_config(config);

    // a semantically perfect rewrite still cannot be proven under Disallow
    let s = seq(call_stmt("f", []), assign("x", int(1)));
    let report = strict.check_equivalence(&s, &s);
    assert_eq!(report.verdict, Verdict::Unknown);
    assert_eq!(report.reason, Reason::CallsDisallowed);

    let in_expr = assign("x", call("f", []));
    let report = strict.check_equivalence(&in_expr, &in_expr);
    assert_eq!(report.verdict, Verdict::Unknown);
}

// ============================================
// Symbolic conditions and merging
// ============================================

#[test]
fn test_branch_insensitive_statements_merge() {
    let same_return = if_stmt(var("c"), ret_value(int(1)), Some(ret_value(int(1))));
    assert_equivalent(&same_return, &ret_value(int(1)));

    let same_assign = if_stmt(var("c"), assign("x", int(1)), Some(assign("x", int(1))));
    assert_equivalent(&same_assign, &assign("x", int(1)));
}

#[test]
fn test_diverging_branches_are_unknown() {
    let s = if_stmt(var("c"), ret_value(int(1)), Some(assign("x", int(2))));
    let report = verifier().check_equivalence(&s, &s);
    assert_eq!(report.verdict, Verdict::Unknown);
    assert_eq!(report.reason, Reason::SymbolicCondition);
}

#[test]
fn test_ite_merge_compares_by_name() {
    // both trees synthesize ite(c, 1, 2) for x, so they agree
    let a = if_stmt(var("c"), assign("x", int(1)), Some(assign("x", int(2))));
    assert_equivalent(&a, &a.clone());

    // swapping the branch payloads changes the placeholder name
    let b = if_stmt(var("c"), assign("x", int(2)), Some(assign("x", int(1))));
    let report = verifier().check_equivalence(&a, &b);
    assert_eq!(report.verdict, Verdict::NotEquivalent);
    assert_eq!(report.reason, Reason::DifferentEnv);
}

#[test]
fn test_solver_enables_concrete_branching() {
    let v = verifier().with_env(Env::from([("enabled", Value::Bool(false))]));
    let s = if_stmt(var("enabled"), ret_value(int(1)), Some(ret_value(int(2))));
    let report = v.check_equivalence(&s, &ret_value(int(2)));
    assert!(report.is_equivalent(), "{report}");
}

// ============================================
// Chain flattening
// ============================================

#[test]
fn test_chain_flattening_truth_table() {
    for bits in 0..4u8 {
        let conds = vec![bool_(bits & 1 != 0), bool_(bits & 2 != 0)];
        let report =
            verify_if_else_chain_flattening(&conds, &[int(10), int(20)], ret_value(int(0)));
        assert!(report.is_equivalent(), "bits={bits}: {report}");
    }
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
fn test_flatten_unflatten_round_trip() {
    let nested = if_stmt(
        var("a"),
        ret_value(int(1)),
        Some(if_stmt(
            var("b"),
            block([call_stmt("log", [str_("b")]), ret_value(int(2))]),
            Some(assign("x", int(0))),
        )),
    );
    let flat = flatten_if_chain(&nested).expect("chain should flatten");
    assert_eq!(unflatten_if_chain(&flat).expect("flat chain"), nested);
}

#[test]
fn test_flattened_and_nested_forms_verify_directly() {
    let nested = if_stmt(
        bool_(true),
        ret_value(int(1)),
        Some(if_stmt(bool_(false), ret_value(int(2)), Some(ret_value(int(0))))),
    );
    let flat = flatten_if_chain(&nested).expect("chain should flatten");
    assert_equivalent(&nested, &flat);
}

// ============================================
// Normalization
// ============================================

#[test]
fn test_normalize_preserves_behavior() {
    let messy = block([
        noop(),
        assign("x", binary(BinOp::Add, int(1), int(2))),
        if_stmt(
            binary(BinOp::And, bool_(true), var("c")),
            assign("y", var("x")),
            Some(noop()),
        ),
        noop(),
    ]);
    let normalized = normalize(&messy);
    assert_equivalent(&messy, &normalized);
}

#[test]
fn test_normalize_folds_literal_conditionals() {
    let s = if_stmt(
        not(bool_(false)),
        assign("x", int(1)),
        Some(assign("x", int(2))),
    );
    assert_eq!(normalize(&s), assign("x", int(1)));
}

// ============================================
// Configuration gates
// ============================================

#[test]
fn test_no_termination_mode_rejects_returns() {
    let report = Verifier::new().check_equivalence(&ret_value(int(1)), &ret_value(int(1)));
    assert_eq!(report.verdict, Verdict::Unknown);
    assert_eq!(report.reason, Reason::OutOfScope);
}

#[test]
fn test_break_requires_loop_context() {
    let aware = EvalConfig::new().with_control_flow(ControlFlowMode::EarlyReturnAware);

    let report = Verifier::with_config(aware.clone()).check_equivalence(&brk(), &brk());
    assert_eq!(report.verdict, Verdict::Unknown);
    assert_eq!(report.reason, Reason::OutOfScope);

    let report = Verifier::with_config(aware.with_in_loop(true)).check_equivalence(&brk(), &brk());
    assert!(report.is_equivalent(), "{report}");
}

#[test]
fn test_break_and_continue_are_distinct() {
    let config = EvalConfig::new()
        .with_control_flow(ControlFlowMode::EarlyReturnAware)
        .with_in_loop(true);
    let report = Verifier::with_config(config).check_equivalence(&brk(), &cont());
    assert_eq!(report.verdict, Verdict::NotEquivalent);
    assert_eq!(report.reason, Reason::DifferentKind);
}

#[test]
fn test_debug_ir_attaches_dump() {
    let config = EvalConfig::new()
        .with_control_flow(ControlFlowMode::EarlyReturnAware)
        .with_debug_ir(true);
    let s = seq(assign("x", int(1)), ret_value(var("x")));
    let report = Verifier::with_config(config).check_equivalence(&s, &s);
    let ir = report.ir.expect("dump requested");
    assert!(ir.contains("--- original ---"));
    assert!(ir.contains("--- transformed outcome ---"));
    assert!(ir.contains("return 1"));
}

// ============================================
// Batch verification
// ============================================

#[test]
fn test_check_all_reports_in_order() {
    let good_a = assign("x", int(1));
    let good_b = seq(noop(), assign("x", int(1)));
    let bad = assign("x", int(2));

    let reports = verifier().check_all([(&good_a, &good_b), (&good_a, &bad)]);
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].verdict, Verdict::Equivalent);
    assert_eq!(reports[1].verdict, Verdict::NotEquivalent);
    assert_eq!(
        FixAction::for_report(&reports[0]),
        FixAction::Apply
    );
}
