//! C interpreter execution engine
//!
//! This module provides the core execution logic:
//! - [`engine`]: Interpreter state, program loading, dispatch and the call protocol
//! - [`statements`] and [`loops`]: Statement execution
//! - [`expressions`] and [`ops`]: Expression evaluation
//! - [`builtins`]: `GET`, `PRINT`, `MALLOC` and `FREE`
//! - [`errors`]: Runtime error types
//!
//! # Execution Model
//!
//! The interpreter walks the typed AST directly. Each call pushes an
//! activation record holding the callee's variable bindings; globals live in
//! the bottom frame, which outlives every call. Expressions are evaluated in a
//! single recursive pass, left to right, with calls executed in place.

pub mod builtins;
pub mod constants;
pub mod engine;
pub mod errors;
pub mod expressions;
pub mod loops;
pub mod ops;
pub mod statements;

pub use engine::{Builtin, Interpreter};
pub use errors::RuntimeError;
