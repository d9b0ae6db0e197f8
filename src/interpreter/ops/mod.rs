pub mod access;
pub mod assign;
pub mod binary;
pub mod unary;

// Operator semantics are `impl Interpreter` blocks
