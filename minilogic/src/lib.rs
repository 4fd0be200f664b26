//! MiniLogic
//!
//! A symbolic equivalence verifier for automated code rewrites over a
//! restricted, loop-free statement language. Rule modules build an original
//! and a transformed IR tree, ask the [`Verifier`] whether they behave
//! identically, and gate the auto-fix on the answer: proven equivalence is
//! applied automatically, an unknown asks a human, a proven difference
//! rejects the rewrite.
//!
//! Everything here is a pure function of its inputs. Environments are
//! values, parents are shared read-only, and every undecidable situation is
//! an explicit `Unknown` outcome instead of an error or a guess.

pub mod eval;
pub mod ir;
pub mod normalize;
pub mod solve;
pub mod verify;

pub use eval::{
    CallPolicy, CallRecord, ControlFlowMode, Env, EvalConfig, Evaluator, Flow, FlowKind, Outcome,
};
pub use ir::{BinOp, Expr, Stmt, UnOp, Unsupported, Value, build};
pub use normalize::{always_terminates, flatten_if_chain, normalize, unflatten_if_chain};
pub use solve::{ConditionSolver, StructuralSolver};
pub use verify::{
    FixAction, Reason, Verdict, VerificationReport, Verifier, verify_early_return_rewrite,
    verify_if_else_chain_flattening,
};
