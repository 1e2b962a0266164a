//! Lexically scoped environments.

use crate::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// An environment shared by every scope and function value that holds it.
pub type SharedEnv = Rc<RefCell<Environment>>;

/// A mutable mapping from names to values, chained to an enclosing scope.
///
/// Environments form a singly-linked chain rooted at the global scope.
/// A function's environment at the point of definition is captured as its
/// closure and outlives the call that created it for as long as any
/// function value retains it.
pub struct Environment {
    values: HashMap<String, Value>,
    enclosing: Option<SharedEnv>,
}

impl Environment {
    /// Create the chain root.
    pub fn global() -> SharedEnv {
        Rc::new(RefCell::new(Environment {
            values: HashMap::new(),
            enclosing: None,
        }))
    }

    /// Create a scope nested inside `enclosing`.
    pub fn with_enclosing(enclosing: SharedEnv) -> SharedEnv {
        Rc::new(RefCell::new(Environment {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        }))
    }

    /// Binds `name` in this scope, shadowing any existing binding here.
    /// Used by `var` declarations and parameter binding; always succeeds.
    pub fn define(&mut self, name: impl ToString, value: Value) {
        self.values.insert(name.to_string(), value);
    }

    /// Returns the nearest enclosing binding of `name`, walking outward
    /// from this scope to the root, or `None` if no scope binds it.
    pub fn get(&self, name: &str) -> Option<Value> {
        match self.values.get(name) {
            Some(value) => Some(value.clone()),
            None => self
                .enclosing
                .as_ref()
                .and_then(|enclosing| enclosing.borrow().get(name)),
        }
    }

    /// Mutates the nearest enclosing binding of `name`, walking outward
    /// the same way as [`Self::get`]. Returns `false` when no scope binds
    /// the name; `assign` never creates a binding.
    pub fn assign(&mut self, name: &str, value: Value) -> bool {
        if let Some(slot) = self.values.get_mut(name) {
            *slot = value;
            true
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow_mut().assign(name, value)
        } else {
            false
        }
    }
}
