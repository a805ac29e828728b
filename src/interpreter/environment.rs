use indexmap::IndexMap;

use super::error::RuntimeError;
use crate::token::Token;
use crate::value::Value;

/// A single scope level: names in definition order.
type Scope = IndexMap<String, Value>;

/// The chain of lexical scopes, kept as a stack.
///
/// Index 0 is the global scope and each later entry is enclosed by the one below it.
#[derive(Debug, Clone)]
pub struct Environment {
    scopes: Vec<Scope>,
}

impl Environment {
    pub fn new() -> Self {
        let mut scopes = Vec::with_capacity(8);
        scopes.push(Scope::new());
        Self { scopes }
    }

    /// Enter a new innermost scope chained to the current one.
    pub fn push_scope(&mut self) {
        self.scopes.push(Scope::new());
    }

    /// Leave the innermost scope. The global scope is never popped.
    pub fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Bind `name` in the current scope only. A name may shadow an outer binding but may not be
    /// bound twice in the same scope.
    pub fn define(&mut self, name: &Token, value: Value) -> Result<(), RuntimeError> {
        let current = self.current_mut();
        if current.contains_key(&*name.lexeme) {
            return Err(RuntimeError::already_defined(&*name.lexeme, name.line));
        }
        current.insert(name.lexeme.to_string(), value);
        Ok(())
    }

    /// Read the nearest binding of `name`, searching from the innermost scope outward.
    pub fn get(&self, name: &Token) -> Result<Value, RuntimeError> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(&*name.lexeme))
            .cloned()
            .ok_or_else(|| RuntimeError::undefined_variable(&*name.lexeme, name.line))
    }

    /// Overwrite the nearest existing binding of `name`. Never creates a binding.
    pub fn assign(&mut self, name: &Token, value: Value) -> Result<(), RuntimeError> {
        match self
            .scopes
            .iter_mut()
            .rev()
            .find_map(|scope| scope.get_mut(&*name.lexeme))
        {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(RuntimeError::undefined_variable(&*name.lexeme, name.line)),
        }
    }

    /// Number of scopes in the chain, globals included.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Discard every scope above the global one.
    pub fn reset_to_globals(&mut self) {
        self.scopes.truncate(1);
    }

    /// Global bindings in the order they were defined.
    pub fn bindings(&self) -> Vec<(String, Value)> {
        self.scopes[0]
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }

    fn current_mut(&mut self) -> &mut Scope {
        let last = self.scopes.len() - 1;
        &mut self.scopes[last]
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
