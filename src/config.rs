//! Interpreter configuration

use crate::interpreter::constants::{DEFAULT_HEAP_LIMIT, DEFAULT_MAX_CALL_DEPTH, READ_PROMPT};

/// Limits and console behavior for one interpreter run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterpreterConfig {
    /// Maximum bytes held by live heap blocks
    pub heap_limit: usize,
    /// Maximum number of nested calls above the global frame
    pub max_call_depth: usize,
    /// Line written before each read; `None` disables it
    pub read_prompt: Option<String>,
}

impl InterpreterConfig {
    pub fn with_heap_limit(mut self, heap_limit: usize) -> Self {
        self.heap_limit = heap_limit;
        self
    }

    pub fn with_max_call_depth(mut self, max_call_depth: usize) -> Self {
        self.max_call_depth = max_call_depth;
        self
    }

    pub fn without_prompt(mut self) -> Self {
        self.read_prompt = None;
        self
    }
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        InterpreterConfig {
            heap_limit: DEFAULT_HEAP_LIMIT,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            read_prompt: Some(READ_PROMPT.to_string()),
        }
    }
}
