//! Expression evaluation implementation
//!
//! This module handles evaluation of all C expression types, including:
//!
//! - Literals (integers, characters)
//! - Variables
//! - Binary and unary operators (see [`ops`](crate::interpreter::ops))
//! - Assignment and compound assignment
//! - Array subscripting
//! - Function calls (including built-ins)
//! - Type casts and the `sizeof` operator
//!
//! # Evaluation Order
//!
//! Evaluation is a single recursive pass: operands are evaluated left to
//! right and every side effect (calls, allocation, I/O) happens at the point
//! its value is needed. Calls run in place and their result is used directly.
//!
//! The current frame's memo table records the value last produced by variable
//! reads, assignment targets and calls.

use crate::interpreter::constants::{STACK_GROW_SIZE, STACK_RED_ZONE};
use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::memory::{sizeof_type, value::Value, width_of};
use crate::parser::ast::*;

impl Interpreter {
    /// Evaluate an expression and return its value
    ///
    /// Calls recurse through here, so deep interpreted recursion grows the
    /// native stack on demand instead of overflowing it.
    pub(crate) fn evaluate_expr(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || self.evaluate_expr_inner(expr))
    }

    fn evaluate_expr_inner(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        let location = expr.location;

        match &expr.kind {
            ExprKind::IntLiteral(n) => Ok(*n),

            // Sign-extended to the cell width
            ExprKind::CharLiteral(c) => Ok(Value::from(*c)),

            ExprKind::Variable { decl, name } => {
                let value = self.read_variable(*decl, name);
                self.stack.current_frame_mut().memoize(expr.id, value);
                Ok(value)
            }

            ExprKind::Paren(inner) => self.evaluate_expr(inner),

            ExprKind::Cast(inner) => {
                let value = self.evaluate_expr(inner)?;
                Ok(Self::coerce_value_to_type(value, &expr.ty))
            }

            ExprKind::Unary { op, operand } => self.evaluate_unary_op(*op, operand, location),

            ExprKind::Binary { op, left, right } => {
                self.evaluate_binary_op(*op, left, right, location)
            }

            ExprKind::Assign { op, lhs, rhs } => self.execute_assignment(*op, lhs, rhs, location),

            ExprKind::Index { array, index } => {
                let addr = self.element_address(array, index)?;
                self.load(addr, width_of(&expr.ty), location)
            }

            ExprKind::Sizeof(ty) => sizeof_type(ty)
                .and_then(|size| Value::try_from(size).ok())
                .ok_or_else(|| RuntimeError::UnsupportedOperation {
                    message: format!("sizeof applied to {}", ty),
                    location,
                }),

            ExprKind::Call { callee, name, args } => {
                let value = self.execute_function_call(*callee, name, args, location)?;
                self.stack.current_frame_mut().memoize(expr.id, value);
                Ok(value)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::InterpreterConfig;
    use crate::console::Console;
    use crate::interpreter::engine::Interpreter;
    use crate::interpreter::errors::RuntimeError;
    use crate::parser::ast::*;
    use crate::parser::parse_source;

    fn run(source: &str) -> Result<i64, RuntimeError> {
        let program = parse_source(source).unwrap();
        let mut interp = Interpreter::new(program, InterpreterConfig::default(), Console::scripted(""));
        interp.run()
    }

    #[test]
    fn test_literals_and_casts() {
        assert_eq!(run("int main() { return '\\xff'; }"), Ok(-1));
        assert_eq!(run("int main() { return (char)200; }"), Ok(-56));
        assert_eq!(run("int main() { return (int)'A'; }"), Ok(65));
    }

    #[test]
    fn test_sizeof() {
        assert_eq!(run("int main() { return sizeof(int); }"), Ok(8));
        assert_eq!(run("int main() { return sizeof(char*); }"), Ok(8));
        assert_eq!(run("int main() { char s[5]; return sizeof s; }"), Ok(5));
        assert_eq!(run("int main() { int a[3]; return sizeof(a); }"), Ok(24));
        assert!(matches!(
            run("int main() { return sizeof(void); }"),
            Err(RuntimeError::UnsupportedOperation { .. })
        ));
    }

    #[test]
    fn test_calls_inside_expressions() {
        assert_eq!(
            run("int f() { return 42; } int main() { int x; x = f() + 1; return x; }"),
            Ok(43)
        );
        assert_eq!(
            run("int sq(int n) { return n * n; } int main() { return sq(sq(2)) - sq(3); }"),
            Ok(7)
        );
    }

    #[test]
    fn test_recursion() {
        assert_eq!(
            run("int fib(int n) { if (n < 2) return n; return fib(n - 1) + fib(n - 2); } int main() { return fib(15); }"),
            Ok(610)
        );
    }

    #[test]
    fn test_memo_records_last_values() {
        let source = "int x = 4; int y = x + 1; int main() { return 0; }";
        let program = parse_source(source).unwrap();
        let read_of_x = program
            .globals()
            .find(|g| g.name == "y")
            .and_then(|g| g.init.as_ref())
            .map(|init| match &init.kind {
                ExprKind::Binary { left, .. } => left.id,
                _ => panic!("Expected binary initializer"),
            })
            .unwrap();

        let mut interp = Interpreter::new(program, InterpreterConfig::default(), Console::scripted(""));
        interp.run().unwrap();
        assert_eq!(interp.stack().global_frame().memo(read_of_x), Some(4));
        assert_eq!(interp.global_value("y"), Some(5));
    }
}
