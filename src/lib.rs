//! # Introduction
//!
//! cwalk parses and executes a small, statically-typed subset of C by walking
//! its typed syntax tree directly. Every value is a 64-bit cell; pointers are
//! addresses into a bounded, simulated heap.
//!
//! ## Execution pipeline
//!
//! ```text
//! Source → Lexer → Parser (resolve + type) → AST → Interpreter → Console
//! ```
//!
//! 1. [`parser`] tokenises the source and builds a resolved, typed AST.
//! 2. [`interpreter`] walks the AST: activation records on a call stack,
//!    a single left-to-right evaluation pass, and the built-in table.
//! 3. [`memory`] is the in-process memory model: [`memory::value::Value`]
//!    cells in [`memory::stack::Stack`] frames and a checked
//!    [`memory::heap::Heap`].
//! 4. [`console`] carries the `GET`/`PRINT` I/O, either on the process
//!    streams or scripted for tests.
//!
//! ## Supported C subset
//!
//! Types: `int`, `char`, `void`, pointers, one-dimensional arrays.
//! Control flow: `if/else`, `while`, `for`, `return`.
//! Built-ins: `GET`, `PRINT`, `MALLOC`, `FREE`, plus the `sizeof` operator.
//!
//! ```no_run
//! use cwalk::{interpret, console::Console, config::InterpreterConfig};
//!
//! let source = "int main() { PRINT(6 * 7); return 0; }";
//! interpret(source, InterpreterConfig::default(), Console::stdio()).unwrap();
//! ```

pub mod config;
pub mod console;
pub mod error;
pub mod interpreter;
pub mod memory;
pub mod parser;

pub use error::Error;

use config::InterpreterConfig;
use console::Console;
use interpreter::Interpreter;
use memory::value::Value;

/// Parse and run a whole program, returning `main`'s value
pub fn interpret(
    source: &str,
    config: InterpreterConfig,
    console: Console,
) -> Result<Value, Error> {
    let program = parser::parse_source(source)?;
    let mut interpreter = Interpreter::new(program, config, console);
    interpreter.run().map_err(|source| Error::Runtime {
        source,
        backtrace: interpreter.backtrace(),
    })
}
