//! Built-in function implementations
//!
//! This module provides the implementation of the four intrinsics that are
//! directly handled by the interpreter rather than being defined in user code.
//!
//! # Supported Built-ins
//!
//! - `GET()`: Prompt, then read one whitespace-delimited integer
//! - `PRINT(value)`: Write the integer followed by a newline
//! - `MALLOC(size)`: Allocate a zero-filled heap block
//! - `FREE(ptr)`: Free a heap block (`FREE(0)` does nothing)
//!
//! # Implementation Notes
//!
//! - Built-ins are resolved by declaration when the interpreter is created,
//!   see [`Builtin`]
//! - `MALLOC` returns simulated addresses starting at `0x1000_0000`
//! - All built-ins are implemented as methods on the [`Interpreter`] struct

use crate::interpreter::engine::{Builtin, Interpreter};
use crate::interpreter::errors::RuntimeError;
use crate::memory::value::{from_address, to_address, Value};
use crate::parser::ast::{Expr, SourceLocation};
use tracing::debug;

impl Interpreter {
    pub(crate) fn call_builtin(
        &mut self,
        builtin: Builtin,
        args: &[Expr],
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        match builtin {
            Builtin::Read => self.builtin_read(location),
            Builtin::Print => {
                let value = self.single_argument(builtin, args, location)?;
                self.builtin_print(value, location)
            }
            Builtin::Allocate => {
                let size = self.single_argument(builtin, args, location)?;
                self.builtin_malloc(size, location)
            }
            Builtin::Deallocate => {
                let ptr = self.single_argument(builtin, args, location)?;
                self.builtin_free(ptr, location)
            }
        }
    }

    fn single_argument(
        &mut self,
        builtin: Builtin,
        args: &[Expr],
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        match args {
            [arg] => self.evaluate_expr(arg),
            _ => Err(RuntimeError::UnsupportedOperation {
                message: format!(
                    "{} expects 1 argument, got {}",
                    builtin.name(),
                    args.len()
                ),
                location,
            }),
        }
    }

    fn builtin_read(&mut self, location: SourceLocation) -> Result<Value, RuntimeError> {
        let io_error = |e: std::io::Error| RuntimeError::Io {
            message: e.to_string(),
            location,
        };

        if let Some(prompt) = &self.read_prompt {
            self.console.write_line(prompt).map_err(io_error)?;
        }

        let token = self
            .console
            .read_token()
            .map_err(io_error)?
            .ok_or_else(|| RuntimeError::InvalidInput {
                message: "Unexpected end of input while reading an integer".to_string(),
                location,
            })?;

        token
            .parse::<Value>()
            .map_err(|_| RuntimeError::InvalidInput {
                message: format!("Expected an integer, found '{}'", token),
                location,
            })
    }

    fn builtin_print(&mut self, value: Value, location: SourceLocation) -> Result<Value, RuntimeError> {
        self.console
            .write_line(&value.to_string())
            .map_err(|e| RuntimeError::Io {
                message: e.to_string(),
                location,
            })?;
        Ok(0)
    }

    fn builtin_malloc(&mut self, size: Value, location: SourceLocation) -> Result<Value, RuntimeError> {
        if size < 0 {
            return Err(RuntimeError::InvalidMallocSize { size, location });
        }

        let addr = self
            .heap
            .allocate(size as usize)
            .map_err(|e| RuntimeError::from_heap(e, location))?;
        debug!(size, address = addr, "malloc");

        Ok(from_address(addr))
    }

    fn builtin_free(&mut self, ptr: Value, location: SourceLocation) -> Result<Value, RuntimeError> {
        let addr = to_address(ptr);
        self.heap
            .free(addr)
            .map_err(|e| RuntimeError::from_heap(e, location))?;
        debug!(address = addr, "free");

        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use crate::config::InterpreterConfig;
    use crate::console::Console;
    use crate::interpreter::engine::Interpreter;
    use crate::interpreter::errors::RuntimeError;
    use crate::parser::parse_source;

    fn run_with(source: &str, config: InterpreterConfig, input: &str) -> (Result<i64, RuntimeError>, Vec<String>) {
        let program = parse_source(source).unwrap();
        let mut interp = Interpreter::new(program, config, Console::scripted(input));
        let result = interp.run();
        (result, interp.into_console().output())
    }

    fn run(source: &str, input: &str) -> (Result<i64, RuntimeError>, Vec<String>) {
        run_with(source, InterpreterConfig::default().without_prompt(), input)
    }

    #[test]
    fn test_print_writes_lines() {
        let (result, output) = run("int main() { PRINT(1); PRINT(-20); PRINT('A'); return 0; }", "");
        assert_eq!(result, Ok(0));
        assert_eq!(output, vec!["1", "-20", "65"]);
    }

    #[test]
    fn test_read_prompts_by_default() {
        let (result, output) = run_with(
            "int main() { return GET(); }",
            InterpreterConfig::default(),
            "12\n",
        );
        assert_eq!(result, Ok(12));
        assert_eq!(output, vec!["Please Input an Integer Value: "]);
    }

    #[test]
    fn test_read_errors() {
        let (result, _) = run("int main() { return GET(); }", "");
        assert!(matches!(result, Err(RuntimeError::InvalidInput { .. })));
        let (result, _) = run("int main() { return GET(); }", "abc");
        assert!(matches!(result, Err(RuntimeError::InvalidInput { .. })));
    }

    #[test]
    fn test_malloc_and_free() {
        let (result, output) = run(
            "int main() { int *p = MALLOC(16); p[1] = 4; PRINT(p[0] + p[1]); FREE(p); FREE(0); return 0; }",
            "",
        );
        assert_eq!(result, Ok(0));
        assert_eq!(output, vec!["4"]);
    }

    #[test]
    fn test_malloc_errors() {
        let (result, _) = run("int main() { MALLOC(-1); return 0; }", "");
        assert!(matches!(
            result,
            Err(RuntimeError::InvalidMallocSize { size: -1, .. })
        ));

        let (result, _) = run_with(
            "int main() { MALLOC(64); return 0; }",
            InterpreterConfig::default().with_heap_limit(32),
            "",
        );
        assert!(matches!(result, Err(RuntimeError::OutOfMemory { .. })));
    }

    #[test]
    fn test_free_errors() {
        let (result, _) = run("int main() { int *p = MALLOC(8); FREE(p); FREE(p); return 0; }", "");
        assert!(matches!(result, Err(RuntimeError::DoubleFree { .. })));

        let (result, _) = run("int main() { int *p = MALLOC(16); FREE(p + 1); return 0; }", "");
        assert!(matches!(result, Err(RuntimeError::InvalidFree { .. })));
    }
}
