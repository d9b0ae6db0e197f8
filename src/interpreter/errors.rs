//! Runtime error types for the C interpreter
//!
//! This module defines [`RuntimeError`], which represents all errors that can occur
//! during program execution (as opposed to parse errors or host I/O errors).
//!
//! All runtime errors are fatal: they unwind to the caller of
//! [`Interpreter::run`](crate::interpreter::engine::Interpreter::run), which
//! decides how to report them.

use crate::memory::heap::HeapError;
use crate::parser::ast::SourceLocation;
use thiserror::Error;

/// Runtime errors that can occur during execution
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// Division by zero or modulo by zero
    #[error("Runtime error at line {}, column {}: {operation} by zero", .location.line, .location.column)]
    DivisionError {
        operation: String,
        location: SourceLocation,
    },

    /// Unsupported operator or feature
    #[error("Runtime error at line {}, column {}: {message}", .location.line, .location.column)]
    UnsupportedOperation {
        message: String,
        location: SourceLocation,
    },

    /// Null pointer dereference
    #[error("Runtime error at line {}, column {}: Null pointer dereference", .location.line, .location.column)]
    NullDereference { location: SourceLocation },

    /// Access outside any live heap block
    #[error(
        "Runtime error at line {}, column {}: Buffer overrun: {size} byte(s) at address 0x{address:x}",
        .location.line, .location.column
    )]
    BufferOverrun {
        address: u64,
        size: usize,
        location: SourceLocation,
    },

    /// Use-after-free (accessing freed memory)
    #[error("Runtime error at line {}, column {}: Use after free at address 0x{address:x}", .location.line, .location.column)]
    UseAfterFree {
        address: u64,
        location: SourceLocation,
    },

    /// Double free
    #[error("Runtime error at line {}, column {}: Double free at address 0x{address:x}", .location.line, .location.column)]
    DoubleFree {
        address: u64,
        location: SourceLocation,
    },

    /// Invalid free (freeing non-allocated memory)
    #[error(
        "Runtime error at line {}, column {}: Invalid free of address 0x{address:x}",
        .location.line, .location.column
    )]
    InvalidFree {
        address: u64,
        location: SourceLocation,
    },

    /// Out of heap memory
    #[error(
        "Runtime error at line {}, column {}: Out of memory: requested {requested} bytes, limit is {limit}",
        .location.line, .location.column
    )]
    OutOfMemory {
        requested: usize,
        limit: usize,
        location: SourceLocation,
    },

    /// Negative allocation size
    #[error("Runtime error at line {}, column {}: Invalid MALLOC size {size}", .location.line, .location.column)]
    InvalidMallocSize { size: i64, location: SourceLocation },

    /// Missing or malformed input for the read built-in
    #[error("Runtime error at line {}, column {}: {message}", .location.line, .location.column)]
    InvalidInput {
        message: String,
        location: SourceLocation,
    },

    /// Console write failure
    #[error("Runtime error at line {}, column {}: I/O error: {message}", .location.line, .location.column)]
    Io {
        message: String,
        location: SourceLocation,
    },

    /// Call depth exceeded the configured bound
    #[error(
        "Runtime error at line {}, column {}: Stack overflow: call depth exceeded {limit}",
        .location.line, .location.column
    )]
    StackOverflow {
        limit: usize,
        location: SourceLocation,
    },

    /// Call to a function that is declared but never defined
    #[error(
        "Runtime error at line {}, column {}: Function '{name}' is declared but not defined",
        .location.line, .location.column
    )]
    UndefinedFunction {
        name: String,
        location: SourceLocation,
    },

    /// Main function not found
    #[error("Runtime error: No main function found")]
    NoMainFunction,
}

impl RuntimeError {
    /// Get the source location where this error occurred, if available
    pub fn location(&self) -> Option<&SourceLocation> {
        match self {
            RuntimeError::DivisionError { location, .. } => Some(location),
            RuntimeError::UnsupportedOperation { location, .. } => Some(location),
            RuntimeError::NullDereference { location } => Some(location),
            RuntimeError::BufferOverrun { location, .. } => Some(location),
            RuntimeError::UseAfterFree { location, .. } => Some(location),
            RuntimeError::DoubleFree { location, .. } => Some(location),
            RuntimeError::InvalidFree { location, .. } => Some(location),
            RuntimeError::OutOfMemory { location, .. } => Some(location),
            RuntimeError::InvalidMallocSize { location, .. } => Some(location),
            RuntimeError::InvalidInput { location, .. } => Some(location),
            RuntimeError::Io { location, .. } => Some(location),
            RuntimeError::StackOverflow { location, .. } => Some(location),
            RuntimeError::UndefinedFunction { location, .. } => Some(location),
            RuntimeError::NoMainFunction => None,
        }
    }

    /// Attach a location to a heap failure
    pub fn from_heap(err: HeapError, location: SourceLocation) -> Self {
        match err {
            HeapError::OutOfMemory {
                requested, limit, ..
            } => RuntimeError::OutOfMemory {
                requested,
                limit,
                location,
            },
            HeapError::DoubleFree(address) => RuntimeError::DoubleFree { address, location },
            HeapError::InvalidFree(address) => RuntimeError::InvalidFree { address, location },
            HeapError::UseAfterFree(address) => RuntimeError::UseAfterFree { address, location },
            HeapError::OutOfBounds { address, size } => RuntimeError::BufferOverrun {
                address,
                size,
                location,
            },
            HeapError::NullPointer => RuntimeError::NullDereference { location },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heap_errors_keep_their_kind() {
        let loc = SourceLocation::new(3, 7);
        assert_eq!(
            RuntimeError::from_heap(HeapError::DoubleFree(0x10), loc),
            RuntimeError::DoubleFree {
                address: 0x10,
                location: loc
            }
        );
        assert!(matches!(
            RuntimeError::from_heap(HeapError::NullPointer, loc),
            RuntimeError::NullDereference { .. }
        ));
    }

    #[test]
    fn test_display_includes_location() {
        let err = RuntimeError::DivisionError {
            operation: "Division".to_string(),
            location: SourceLocation::new(4, 12),
        };
        assert_eq!(
            err.to_string(),
            "Runtime error at line 4, column 12: Division by zero"
        );
        assert_eq!(err.location(), Some(&SourceLocation::new(4, 12)));
        assert_eq!(RuntimeError::NoMainFunction.location(), None);
    }
}
