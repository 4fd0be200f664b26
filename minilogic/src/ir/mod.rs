//! Statement and expression IR for the equivalence checker
//!
//! The node set is deliberately closed: assignment, scoped conditional,
//! sequencing, block, return, break, continue, opaque call, no-op. Anything
//! a source-language translator cannot express in these nodes must be
//! rejected with [`Unsupported`] so the rewrite is treated as unverifiable
//! instead of silently approved.

pub mod build;
mod expr;
mod value;
pub mod visit;

pub use expr::{BinOp, Expr, UnOp};
pub use value::Value;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for fallible IR construction
pub type IrResult<T> = std::result::Result<T, Unsupported>;

/// Failure to express something in the supported node set.
///
/// Translators lowering source fragments into this IR must return this
/// (never panic) for loops, switches, gotos, closures, channels, composite
/// literals, or any other construct outside the modeled forms.
#[derive(Debug, Clone, Error)]
pub enum Unsupported {
    #[error("unsupported construct: {0}")]
    Construct(String),

    #[error("not an if/else chain: {0}")]
    NotAChain(String),

    #[error("if/else chain branch does not terminate: {0}")]
    NonTerminatingBranch(String),
}

impl Unsupported {
    pub fn construct(what: impl Into<String>) -> Self {
        Self::Construct(what.into())
    }

    pub fn not_a_chain(why: impl Into<String>) -> Self {
        Self::NotAChain(why.into())
    }

    pub fn non_terminating(why: impl Into<String>) -> Self {
        Self::NonTerminatingBranch(why.into())
    }
}

/// Statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stmt {
    /// Assignment to an existing or new variable: `x = e`
    Assign { name: String, value: Expr },
    /// Declaration with assignment: `x := e` or `x, y := e1, e2`
    DeclAssign { names: Vec<String>, values: Vec<Expr> },
    /// Plain declaration: `var x` or `var x = e`
    VarDecl { name: String, init: Option<Expr> },
    /// Two statements in order
    Seq(Box<Stmt>, Box<Stmt>),
    /// Statement list
    Block(Vec<Stmt>),
    /// Conditional with optional initializer scoped to the statement
    If {
        init: Option<Box<Stmt>>,
        cond: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },
    /// Early return with optional value
    Return(Option<Expr>),
    /// Loop break
    Break,
    /// Loop continue
    Continue,
    /// Call in statement position
    Call { name: String, args: Vec<Expr> },
    /// No-op
    Noop,
}

impl Stmt {
    /// Names this statement introduces into its scope.
    ///
    /// Used to identify the variables an `if` initializer scopes to the
    /// statement's subtree. Plain assignment introduces nothing.
    pub fn declared_names(&self) -> Vec<String> {
        match self {
            Stmt::DeclAssign { names, .. } => names.clone(),
            Stmt::VarDecl { name, .. } => vec![name.clone()],
            Stmt::Seq(a, b) => {
                let mut out = a.declared_names();
                out.extend(b.declared_names());
                out
            }
            Stmt::Block(stmts) => stmts.iter().flat_map(Stmt::declared_names).collect(),
            _ => Vec::new(),
        }
    }
}
