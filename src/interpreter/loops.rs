//! Loop statement execution (`while`, `for`).
//!
//! Adds `impl Interpreter` methods for the two loop forms supported by the
//! C subset. The pending return of the current frame is checked after every
//! body and every increment, so a `return` inside a loop leaves it at once.

use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::memory::value::is_truthy;
use crate::parser::ast::{Expr, Stmt};

impl Interpreter {
    /// Executes a `while (condition) { body }` loop.
    pub(crate) fn execute_while(
        &mut self,
        condition: &Expr,
        body: &[Stmt],
    ) -> Result<(), RuntimeError> {
        while is_truthy(self.evaluate_expr(condition)?) {
            self.execute_block(body)?;
            if self.has_returned() {
                break;
            }
        }
        Ok(())
    }

    /// Executes a `for (init; condition; increment) { body }` loop.
    ///
    /// A missing condition loops until the body returns.
    pub(crate) fn execute_for(
        &mut self,
        init: Option<&Stmt>,
        condition: Option<&Expr>,
        increment: Option<&Expr>,
        body: &[Stmt],
    ) -> Result<(), RuntimeError> {
        if let Some(init) = init {
            self.execute_statement(init)?;
        }

        loop {
            if let Some(condition) = condition {
                if !is_truthy(self.evaluate_expr(condition)?) {
                    break;
                }
            }

            self.execute_block(body)?;
            if self.has_returned() {
                break;
            }

            if let Some(increment) = increment {
                self.evaluate_expr(increment)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::config::InterpreterConfig;
    use crate::console::Console;
    use crate::interpreter::engine::Interpreter;
    use crate::parser::parse_source;

    fn run(source: &str) -> i64 {
        let program = parse_source(source).unwrap();
        let mut interp = Interpreter::new(program, InterpreterConfig::default(), Console::scripted(""));
        interp.run().unwrap()
    }

    #[test]
    fn test_while_sums() {
        assert_eq!(run("int main() { int i = 0; int s = 0; while (i < 5) { s += i; i++; } return s; }"), 10);
    }

    #[test]
    fn test_for_with_declaration() {
        assert_eq!(run("int main() { int s = 1; for (int i = 0; i < 4; i = i + 1) s = s * 2; return s; }"), 16);
    }

    #[test]
    fn test_return_interrupts_loops() {
        assert_eq!(run("int main() { int i = 0; while (1) { i++; if (i == 3) return i; } return -1; }"), 3);
        assert_eq!(run("int main() { for (;;) { return 9; } return -1; }"), 9);
    }

    #[test]
    fn test_zero_iterations() {
        assert_eq!(run("int main() { int n = 0; for (int i = 0; i < 0; i++) n++; while (0) n++; return n; }"), 0);
    }
}
