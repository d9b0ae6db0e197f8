//! Statement execution implementation
//!
//! This module handles the execution of the non-loop statement types:
//!
//! - Variable declarations and initializations
//! - `if`/`else`
//! - `return`
//!
//! # Declarations
//!
//! Scalars (`int`, `char`, pointers) are bound to their initializer's value,
//! or 0 without one. Arrays get a fresh zero-filled heap block sized
//! `len * sizeof(element)`, and the variable is bound to its base address.
//!
//! # Return
//!
//! A `return` records the value in the current frame. Every statement checks
//! that record before running, so nothing else executes in the activation
//! until its frame is popped.

use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::memory::{
    sizeof_type,
    value::{from_address, is_truthy},
};
use crate::parser::ast::*;
use tracing::debug;

impl Interpreter {
    pub(crate) fn execute_var_decl(&mut self, decl: &VarDecl) -> Result<(), RuntimeError> {
        let location = decl.location;

        let value = if decl.var_type.is_array() {
            let size = sizeof_type(&decl.var_type).ok_or_else(|| {
                RuntimeError::UnsupportedOperation {
                    message: format!("Array '{}' is too large to allocate", decl.name),
                    location,
                }
            })?;
            let addr = self
                .heap
                .allocate(size)
                .map_err(|e| RuntimeError::from_heap(e, location))?;
            debug!(name = %decl.name, size, address = addr, "array allocated");
            from_address(addr)
        } else {
            match &decl.init {
                Some(init) => {
                    let value = self.evaluate_expr(init)?;
                    Self::coerce_value_to_type(value, &decl.var_type)
                }
                None => 0,
            }
        };

        self.stack.current_frame_mut().bind(decl.id, value);
        Ok(())
    }

    pub(crate) fn execute_if(
        &mut self,
        condition: &Expr,
        then_branch: &[Stmt],
        else_branch: Option<&[Stmt]>,
    ) -> Result<(), RuntimeError> {
        if is_truthy(self.evaluate_expr(condition)?) {
            self.execute_block(then_branch)
        } else if let Some(else_branch) = else_branch {
            self.execute_block(else_branch)
        } else {
            Ok(())
        }
    }

    pub(crate) fn execute_return(&mut self, expr: Option<&Expr>) -> Result<(), RuntimeError> {
        let value = match expr {
            Some(expr) => self.evaluate_expr(expr)?,
            None => 0,
        };
        self.stack.current_frame_mut().set_return(value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::config::InterpreterConfig;
    use crate::console::Console;
    use crate::interpreter::engine::Interpreter;
    use crate::interpreter::errors::RuntimeError;
    use crate::parser::parse_source;

    fn run(source: &str) -> (Interpreter, i64) {
        let program = parse_source(source).unwrap();
        let mut interp = Interpreter::new(
            program,
            InterpreterConfig::default().without_prompt(),
            Console::scripted(""),
        );
        let value = interp.run().unwrap();
        (interp, value)
    }

    #[test]
    fn test_uninitialized_scalars_are_zero() {
        let (_, value) = run("int main() { int x; char c; int *p; return x + c + (p == 0); }");
        assert_eq!(value, 1);
    }

    #[test]
    fn test_arrays_live_on_the_heap() {
        let (interp, value) = run("int g[4]; int main() { char s[3]; return s[2] + g[3]; }");
        assert_eq!(value, 0);
        assert_eq!(interp.heap().live_blocks(), 2);
        assert_eq!(interp.heap().in_use(), 4 * 8 + 3);
    }

    #[test]
    fn test_char_initializer_is_truncated() {
        let (interp, _) = run("char c = 321; int main() { return 0; }");
        assert_eq!(interp.global_value("c"), Some(65));
    }

    #[test]
    fn test_if_else() {
        let (_, value) = run("int main() { int r; if (0) r = 1; else if (2) r = 2; else r = 3; return r; }");
        assert_eq!(value, 2);
    }

    #[test]
    fn test_statements_after_return_are_skipped() {
        let (interp, value) =
            run("int x; int main() { { x = 1; return 5; } x = 2; return 6; }");
        assert_eq!(value, 5);
        assert_eq!(interp.global_value("x"), Some(1));
    }

    #[test]
    fn test_unaddressable_array_is_an_error() {
        let program =
            parse_source("int main() { int a[2305843009213693952]; return 0; }").unwrap();
        let mut interp = Interpreter::new(program, InterpreterConfig::default(), Console::scripted(""));
        assert!(matches!(
            interp.run(),
            Err(RuntimeError::UnsupportedOperation { ref message, .. }) if message.contains("too large")
        ));
        assert_eq!(interp.heap().live_blocks(), 0);
    }
}
