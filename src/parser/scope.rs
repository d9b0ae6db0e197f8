//! Lexical scopes for name resolution
//!
//! The bottom scope is file scope and holds functions and globals; every block,
//! function body and `for` initializer pushes a nested scope.

use crate::parser::ast::{DeclId, Type};
use rustc_hash::FxHashMap;

/// What a name resolves to
#[derive(Debug, Clone)]
pub enum Symbol {
    Variable {
        id: DeclId,
        var_type: Type,
    },
    Function {
        id: DeclId,
        return_type: Type,
        /// `None` for prototypes written with an empty parameter list
        param_count: Option<usize>,
        defined: bool,
    },
}

#[derive(Debug)]
pub struct Scopes {
    stack: Vec<FxHashMap<String, Symbol>>,
}

impl Scopes {
    pub fn new() -> Self {
        Scopes {
            stack: vec![FxHashMap::default()],
        }
    }

    pub fn push(&mut self) {
        self.stack.push(FxHashMap::default());
    }

    pub fn pop(&mut self) {
        if self.stack.len() > 1 {
            self.stack.pop();
        }
    }

    pub fn is_file_scope(&self) -> bool {
        self.stack.len() == 1
    }

    /// Innermost binding for `name`
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.stack.iter().rev().find_map(|scope| scope.get(name))
    }

    /// Binding for `name` in the innermost scope only
    pub fn lookup_local(&self, name: &str) -> Option<&Symbol> {
        self.stack.last().and_then(|scope| scope.get(name))
    }

    pub fn lookup_file(&self, name: &str) -> Option<&Symbol> {
        self.stack.first().and_then(|scope| scope.get(name))
    }

    /// Bind in the innermost scope, replacing any previous binding there
    pub fn declare(&mut self, name: String, symbol: Symbol) {
        if let Some(scope) = self.stack.last_mut() {
            scope.insert(name, symbol);
        }
    }

    pub fn declare_file(&mut self, name: String, symbol: Symbol) {
        self.stack[0].insert(name, symbol);
    }
}

impl Default for Scopes {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inner_scope_shadows_and_pops() {
        let mut scopes = Scopes::new();
        scopes.declare(
            "x".to_string(),
            Symbol::Variable {
                id: 0,
                var_type: Type::int(),
            },
        );
        scopes.push();
        scopes.declare(
            "x".to_string(),
            Symbol::Variable {
                id: 1,
                var_type: Type::char(),
            },
        );
        assert!(matches!(scopes.lookup("x"), Some(Symbol::Variable { id: 1, .. })));
        assert!(matches!(scopes.lookup_file("x"), Some(Symbol::Variable { id: 0, .. })));
        scopes.pop();
        assert!(matches!(scopes.lookup("x"), Some(Symbol::Variable { id: 0, .. })));
        assert!(scopes.is_file_scope());
        scopes.pop();
        assert!(scopes.lookup("x").is_some());
    }
}
