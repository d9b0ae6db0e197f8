//! C source code parser
//!
//! This module transforms C source text into a resolved, typed AST:
//! - [`lexer`]: Tokenization (source text → tokens)
//! - [`parse`]: Parser struct, token helpers and the program entry point
//! - [`ast`]: AST node definitions
//! - [`scope`]: Lexical scopes used for name resolution
//!
//! # Supported C Subset
//!
//! - Types: `int`, `char`, `void`, pointers, one-dimensional arrays
//! - Statements: declarations, expressions, `if`/`else`, `while`, `for`,
//!   `return`, blocks
//! - Expressions: arithmetic, comparison, logical, bitwise, assignment,
//!   casts, `sizeof`, function calls
//! - Preprocessor lines are skipped
//!
//! Calls to `GET`, `PRINT`, `MALLOC` and `FREE` need no prototype; they are
//! declared implicitly on first use.

pub mod ast;
mod declarations;
mod expressions;
pub mod lexer;
pub mod parse;
pub mod scope;
mod statements;

pub use parse::{ParseError, Parser};

/// Tokenize and parse a whole translation unit
pub fn parse_source(source: &str) -> Result<ast::Program, ParseError> {
    Parser::new(source)?.parse_program()
}
