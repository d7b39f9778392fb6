//! Variable environment
//!
//! A stack of scopes. Lookups walk from the innermost scope outwards;
//! definitions always land in the innermost one, shadowing outer bindings.

use indexmap::IndexMap;

use crate::runtime::value::Value;

/// Scope chain mapping names to values
#[derive(Debug, Clone, PartialEq)]
pub struct Environment {
    scopes: Vec<IndexMap<String, Value>>,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment {
    /// A single empty scope
    pub fn new() -> Self {
        Self {
            scopes: vec![IndexMap::new()],
        }
    }

    /// Bind `name` in the innermost scope, replacing any earlier binding there
    pub fn define(
        &mut self,
        name: impl Into<String>,
        value: Value,
    ) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.into(), value);
        }
    }

    pub fn get(
        &self,
        name: &str,
    ) -> Option<&Value> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    pub fn contains(
        &self,
        name: &str,
    ) -> bool {
        self.get(name).is_some()
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(IndexMap::new());
    }

    /// Drop the innermost scope. The outermost scope is never removed.
    pub fn pop_scope(&mut self) -> Option<IndexMap<String, Value>> {
        if self.scopes.len() > 1 {
            self.scopes.pop()
        } else {
            None
        }
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Every visible binding, innermost definitions winning
    pub fn bindings(&self) -> IndexMap<&str, &Value> {
        let mut visible = IndexMap::new();
        for scope in &self.scopes {
            for (name, value) in scope {
                visible.insert(name.as_str(), value);
            }
        }
        visible
    }
}
