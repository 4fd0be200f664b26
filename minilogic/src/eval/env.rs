//! Environment for variable bindings
//!
//! A frame of local bindings plus an optional parent link. The parent link
//! exists for exactly one purpose: scoping the variables an `if` initializer
//! declares to that statement's subtree. Parents are shared through `Arc`
//! and never written through, so environments are plain values that can be
//! cloned and compared freely, including across threads.

use crate::ir::Value;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

/// Environment holding variable bindings
#[derive(Debug, Clone, Default)]
pub struct Env {
    /// Bindings in this frame
    bindings: HashMap<String, Value>,
    /// Enclosing scope, read-only
    parent: Option<Arc<Env>>,
}

impl Env {
    /// Create a new empty environment
    pub fn new() -> Self {
        Env::default()
    }

    /// Look up a variable through the parent chain
    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.bindings.get(name) {
            Some(value.clone())
        } else if let Some(parent) = &self.parent {
            parent.get(name)
        } else {
            None
        }
    }

    /// Bind a variable in this frame. Writes never touch a parent; a child
    /// frame's updates are carried outward by [`Env::collapse`] instead.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.bindings.insert(name.into(), value);
    }

    /// Check if a variable is visible through the chain
    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
            || self.parent.as_ref().is_some_and(|p| p.contains(name))
    }

    /// Bindings of this frame only
    pub fn local(&self) -> &HashMap<String, Value> {
        &self.bindings
    }

    /// Open a child frame that scopes new declarations to a subtree
    pub fn child(&self) -> Env {
        Env {
            bindings: HashMap::new(),
            parent: Some(Arc::new(self.clone())),
        }
    }

    /// Close a child frame: drop the `exclude`d names (the initializer's
    /// declarations) and fold the remaining local writes into the parent.
    pub fn collapse(mut self, exclude: &HashSet<String>) -> Env {
        let parent = self.parent.take();
        let mut base = match parent {
            Some(p) => (*p).clone(),
            None => Env::new(),
        };
        for (name, value) in self.bindings {
            if !exclude.contains(&name) {
                base.bindings.insert(name, value);
            }
        }
        base
    }

    /// Every binding visible through the chain, innermost frame winning.
    pub fn flatten(&self) -> BTreeMap<String, Value> {
        let mut out = match &self.parent {
            Some(parent) => parent.flatten(),
            None => BTreeMap::new(),
        };
        for (name, value) in &self.bindings {
            out.insert(name.clone(), value.clone());
        }
        out
    }
}

// Environments compare by what is visible, not by frame structure: the same
// bindings reached through different chains are the same environment.
impl PartialEq for Env {
    fn eq(&self, other: &Self) -> bool {
        self.flatten() == other.flatten()
    }
}

impl Eq for Env {}

impl<const N: usize> From<[(&str, Value); N]> for Env {
    fn from(bindings: [(&str, Value); N]) -> Self {
        let mut env = Env::new();
        for (name, value) in bindings {
            env.set(name, value);
        }
        env
    }
}
