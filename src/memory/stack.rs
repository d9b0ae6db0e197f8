//! Call stack implementation
//!
//! This module provides the call stack for function execution:
//! - [`Stack`]: The call stack; its bottom frame holds the globals
//! - [`StackFrame`]: A single function's activation record
//!
//! # Activation Records
//!
//! A frame owns the bindings of the variables declared during its call, keyed
//! by declaration, plus a memo table recording the last value each expression
//! node produced in this activation. Once a `return` executes, the frame
//! carries the pending return value until it is popped.

use super::value::Value;
use crate::parser::ast::{DeclId, NodeId, SourceLocation};
use rustc_hash::FxHashMap;

/// Name of the bottom frame
pub const GLOBAL_FRAME_NAME: &str = "<global>";

/// Stack frame for a function call
#[derive(Debug, Clone)]
pub struct StackFrame {
    pub function_name: String,
    bindings: FxHashMap<DeclId, Value>,
    memo: FxHashMap<NodeId, Value>,
    pending_return: Option<Value>,
    /// Most recently visited statement, for backtraces
    pub current_location: Option<SourceLocation>,
}

impl StackFrame {
    pub fn new(function_name: String) -> Self {
        StackFrame {
            function_name,
            bindings: FxHashMap::default(),
            memo: FxHashMap::default(),
            pending_return: None,
            current_location: None,
        }
    }

    /// Create or overwrite a binding in this frame
    pub fn bind(&mut self, decl: DeclId, value: Value) {
        self.bindings.insert(decl, value);
    }

    pub fn binding(&self, decl: DeclId) -> Option<Value> {
        self.bindings.get(&decl).copied()
    }

    /// Overwrite an existing binding; returns false if there is none
    pub fn rebind(&mut self, decl: DeclId, value: Value) -> bool {
        match self.bindings.get_mut(&decl) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    pub fn memoize(&mut self, node: NodeId, value: Value) {
        self.memo.insert(node, value);
    }

    /// Last value produced by an expression node in this activation
    pub fn memo(&self, node: NodeId) -> Option<Value> {
        self.memo.get(&node).copied()
    }

    pub fn set_return(&mut self, value: Value) {
        self.pending_return = Some(value);
    }

    pub fn has_returned(&self) -> bool {
        self.pending_return.is_some()
    }

    pub fn return_value(&self) -> Option<Value> {
        self.pending_return
    }
}

/// The call stack
#[derive(Debug, Clone)]
pub struct Stack {
    frames: Vec<StackFrame>,
}

impl Stack {
    /// Create a stack holding only the global frame
    pub fn new() -> Self {
        Stack {
            frames: vec![StackFrame::new(GLOBAL_FRAME_NAME.to_string())],
        }
    }

    /// Push a new stack frame
    pub fn push_frame(&mut self, function_name: String) {
        self.frames.push(StackFrame::new(function_name));
    }

    /// Pop the top stack frame; the global frame is never popped
    pub fn pop_frame(&mut self) -> Option<StackFrame> {
        if self.frames.len() > 1 {
            self.frames.pop()
        } else {
            None
        }
    }

    /// Get the current (top) frame
    pub fn current_frame(&self) -> &StackFrame {
        &self.frames[self.frames.len() - 1]
    }

    /// Get a mutable reference to the current frame
    pub fn current_frame_mut(&mut self) -> &mut StackFrame {
        let top = self.frames.len() - 1;
        &mut self.frames[top]
    }

    pub fn global_frame(&self) -> &StackFrame {
        &self.frames[0]
    }

    pub fn global_frame_mut(&mut self) -> &mut StackFrame {
        &mut self.frames[0]
    }

    /// Get all frames, bottom first
    pub fn frames(&self) -> &[StackFrame] {
        &self.frames
    }

    /// Number of call frames above the global frame
    pub fn depth(&self) -> usize {
        self.frames.len() - 1
    }

    /// Resolve a variable: current frame first, then globals
    pub fn lookup(&self, decl: DeclId) -> Option<Value> {
        self.current_frame()
            .binding(decl)
            .or_else(|| self.global_frame().binding(decl))
    }

    /// Assign to a variable: current frame, then globals; an unbound
    /// variable is bound in the current frame
    pub fn assign(&mut self, decl: DeclId, value: Value) {
        if self.current_frame_mut().rebind(decl, value) {
            return;
        }
        if self.global_frame_mut().rebind(decl, value) {
            return;
        }
        self.current_frame_mut().bind(decl, value);
    }
}

impl Default for Stack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_frame_is_never_popped() {
        let mut stack = Stack::new();
        assert_eq!(stack.depth(), 0);
        assert!(stack.pop_frame().is_none());
        stack.push_frame("main".to_string());
        assert_eq!(stack.depth(), 1);
        assert_eq!(stack.pop_frame().map(|f| f.function_name), Some("main".to_string()));
        assert_eq!(stack.current_frame().function_name, GLOBAL_FRAME_NAME);
    }

    #[test]
    fn test_lookup_falls_back_to_globals() {
        let mut stack = Stack::new();
        stack.global_frame_mut().bind(0, 10);
        stack.push_frame("f".to_string());
        stack.current_frame_mut().bind(1, 20);

        assert_eq!(stack.lookup(0), Some(10));
        assert_eq!(stack.lookup(1), Some(20));
        assert_eq!(stack.lookup(2), None);

        stack.assign(0, 11);
        stack.assign(1, 21);
        stack.pop_frame();
        assert_eq!(stack.lookup(0), Some(11));
        assert_eq!(stack.lookup(1), None);
    }

    #[test]
    fn test_pending_return_and_memo() {
        let mut frame = StackFrame::new("f".to_string());
        assert!(!frame.has_returned());
        frame.memoize(7, 42);
        frame.set_return(3);
        assert!(frame.has_returned());
        assert_eq!(frame.return_value(), Some(3));
        assert_eq!(frame.memo(7), Some(42));
        assert_eq!(frame.memo(8), None);
    }
}
