//! Execution outcomes
//!
//! Control flow is reified as a value: the verifier compares what two
//! statement trees *did*, including the exact sequence of opaque calls
//! observed along the way.

use super::Env;
use crate::ir::Value;
use std::fmt;

/// One observed opaque call: name plus fully evaluated arguments, in the
/// order the call happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRecord {
    pub name: String,
    pub args: Vec<Value>,
}

impl CallRecord {
    pub fn new(name: impl Into<String>, args: Vec<Value>) -> Self {
        CallRecord {
            name: name.into(),
            args,
        }
    }
}

impl fmt::Display for CallRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{arg}")?;
        }
        write!(f, ")")
    }
}

/// How a statement finished
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    /// Fell through; carries the resulting environment
    Continue(Env),
    /// Early return with optional value
    Return(Option<Value>),
    /// Broke out of the enclosing loop
    Break,
    /// Continued the enclosing loop
    ContinueLoop,
    /// Could not be determined; carries the reason
    Unknown(String),
}

impl Flow {
    pub fn kind(&self) -> FlowKind {
        match self {
            Flow::Continue(_) => FlowKind::Continue,
            Flow::Return(_) => FlowKind::Return,
            Flow::Break => FlowKind::Break,
            Flow::ContinueLoop => FlowKind::ContinueLoop,
            Flow::Unknown(_) => FlowKind::Unknown,
        }
    }

    /// True for anything that stops execution of the remaining statements.
    pub fn interrupts(&self) -> bool {
        !matches!(self, Flow::Continue(_))
    }
}

/// Tag-only projection of [`Flow`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowKind {
    Continue,
    Return,
    Break,
    ContinueLoop,
    Unknown,
}

impl fmt::Display for FlowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FlowKind::Continue => "continue",
            FlowKind::Return => "return",
            FlowKind::Break => "break",
            FlowKind::ContinueLoop => "continue-loop",
            FlowKind::Unknown => "unknown",
        };
        write!(f, "{s}")
    }
}

/// Full result of executing a statement: the flow plus the ordered log of
/// opaque calls observed on the path taken.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub flow: Flow,
    pub calls: Vec<CallRecord>,
}

impl Outcome {
    pub fn new(flow: Flow, calls: Vec<CallRecord>) -> Self {
        Outcome { flow, calls }
    }

    pub fn kind(&self) -> FlowKind {
        self.flow.kind()
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self.flow, Flow::Unknown(_))
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.flow {
            Flow::Continue(env) => {
                write!(f, "continue {{")?;
                for (i, (name, value)) in env.flatten().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{name}={value}")?;
                }
                write!(f, "}}")?;
            }
            Flow::Return(None) => write!(f, "return")?,
            Flow::Return(Some(v)) => write!(f, "return {v}")?,
            Flow::Break => write!(f, "break")?,
            Flow::ContinueLoop => write!(f, "continue-loop")?,
            Flow::Unknown(reason) => write!(f, "unknown ({reason})")?,
        }
        if !self.calls.is_empty() {
            write!(f, " calls=[")?;
            for (i, call) in self.calls.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{call}")?;
            }
            write!(f, "]")?;
        }
        Ok(())
    }
}

/// Return values compare with absent and `nil` unified: `return` and
/// `return nil` are the same observable behavior.
pub fn return_values_equal(a: &Option<Value>, b: &Option<Value>) -> bool {
    let a = a.as_ref().unwrap_or(&Value::Nil);
    let b = b.as_ref().unwrap_or(&Value::Nil);
    a == b
}
