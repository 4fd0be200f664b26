//! Evaluation configuration

use crate::solve::{ConditionSolver, StructuralSolver};
use std::fmt;
use std::sync::Arc;

/// How opaque calls are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CallPolicy {
    /// Calls are tracked as ordered, argument-evaluated side effects that
    /// never change control flow.
    #[default]
    Opaque,
    /// Any statement or expression containing a call is undecidable.
    Disallow,
}

/// How early termination is modeled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControlFlowMode {
    /// Return/break/continue are undecidable. The conservative default.
    #[default]
    NoTermination,
    /// Return/break/continue are modeled faithfully.
    EarlyReturnAware,
}

/// Maximum structural recursion depth before evaluation degrades to an
/// unknown outcome.
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Configuration for the evaluator and verifier
#[derive(Clone)]
pub struct EvalConfig {
    pub call_policy: CallPolicy,
    pub control_flow: ControlFlowMode,
    /// Break/continue are undecidable unless the verified fragment sits
    /// inside a loop body.
    pub in_loop: bool,
    pub solver: Arc<dyn ConditionSolver>,
    /// Attach a pretty-printed dump of both trees and outcomes to reports.
    pub debug_ir: bool,
    pub max_depth: usize,
}

impl Default for EvalConfig {
    fn default() -> Self {
        EvalConfig {
            call_policy: CallPolicy::default(),
            control_flow: ControlFlowMode::default(),
            in_loop: false,
            solver: Arc::new(StructuralSolver),
            debug_ir: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl EvalConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_call_policy(mut self, policy: CallPolicy) -> Self {
        self.call_policy = policy;
        self
    }

    pub fn with_control_flow(mut self, mode: ControlFlowMode) -> Self {
        self.control_flow = mode;
        self
    }

    pub fn with_in_loop(mut self, in_loop: bool) -> Self {
        self.in_loop = in_loop;
        self
    }

    pub fn with_solver(mut self, solver: Arc<dyn ConditionSolver>) -> Self {
        self.solver = solver;
        self
    }

    pub fn with_debug_ir(mut self, debug_ir: bool) -> Self {
        self.debug_ir = debug_ir;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

impl fmt::Debug for EvalConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvalConfig")
            .field("call_policy", &self.call_policy)
            .field("control_flow", &self.control_flow)
            .field("in_loop", &self.in_loop)
            .field("debug_ir", &self.debug_ir)
            .field("max_depth", &self.max_depth)
            .finish_non_exhaustive()
    }
}
