// langur-core - Environment for lexical scoping
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Environment for variable bindings with lexical scoping.
//!
//! Used by the tree-walking evaluator only; the bytecode backend resolves
//! names at compile time through its symbol table instead.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::object::Object;

/// A lexical environment for variable bindings.
///
/// Environments form a chain through parent references. Each environment
/// has its own bindings map and optionally a parent for outer-scope
/// lookup. Cloning an `Env` is cheap and shares the underlying bindings.
#[derive(Debug, Clone)]
pub struct Env {
    inner: Rc<RefCell<EnvInner>>,
}

#[derive(Debug)]
struct EnvInner {
    bindings: HashMap<String, Object>,
    parent: Option<Env>,
}

impl Env {
    /// Create a new root environment with no parent.
    pub fn new() -> Self {
        Env {
            inner: Rc::new(RefCell::new(EnvInner {
                bindings: HashMap::new(),
                parent: None,
            })),
        }
    }

    /// Create a child environment with this environment as parent.
    #[must_use]
    pub fn child(&self) -> Self {
        Env {
            inner: Rc::new(RefCell::new(EnvInner {
                bindings: HashMap::new(),
                parent: Some(self.clone()),
            })),
        }
    }

    /// Define a binding in this environment, shadowing any outer binding
    /// of the same name.
    pub fn define(&self, name: impl Into<String>, value: Object) {
        self.inner.borrow_mut().bindings.insert(name.into(), value);
    }

    /// Look up a binding, walking outward through parents.
    /// Iterative to stay safe on deep environment chains.
    pub fn lookup(&self, name: &str) -> Option<Object> {
        let mut env = self.clone();
        loop {
            if let Some(value) = env.inner.borrow().bindings.get(name) {
                return Some(value.clone());
            }
            let parent = env.inner.borrow().parent.clone();
            match parent {
                Some(parent) => env = parent,
                None => return None,
            }
        }
    }
}

impl Default for Env {
    fn default() -> Self {
        Self::new()
    }
}
