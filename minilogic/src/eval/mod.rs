//! Evaluation: environments, outcomes, configuration, and the evaluator

mod config;
mod env;
#[allow(clippy::module_inception)]
mod eval;
mod outcome;

pub use config::{CallPolicy, ControlFlowMode, DEFAULT_MAX_DEPTH, EvalConfig};
pub use env::Env;
pub use eval::Evaluator;
pub use outcome::{CallRecord, Flow, FlowKind, Outcome, return_values_equal};
