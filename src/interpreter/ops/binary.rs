use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::memory::{
    pointer_add, pointer_diff, pointer_sub,
    value::{from_address, from_bool, is_truthy, to_address, Value},
};
use crate::parser::ast::{BinOp, Expr, SourceLocation, Type};

impl Interpreter {
    /// Evaluate a binary operation; `&&` and `||` short-circuit
    pub(crate) fn evaluate_binary_op(
        &mut self,
        op: BinOp,
        left: &Expr,
        right: &Expr,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        match op {
            BinOp::And => {
                if !is_truthy(self.evaluate_expr(left)?) {
                    return Ok(0);
                }
                let right_val = self.evaluate_expr(right)?;
                Ok(from_bool(is_truthy(right_val)))
            }
            BinOp::Or => {
                if is_truthy(self.evaluate_expr(left)?) {
                    return Ok(1);
                }
                let right_val = self.evaluate_expr(right)?;
                Ok(from_bool(is_truthy(right_val)))
            }
            _ => {
                let left_val = self.evaluate_expr(left)?;
                let right_val = self.evaluate_expr(right)?;
                Self::apply_binary_op(op, left_val, &left.ty, right_val, &right.ty, location)
            }
        }
    }

    /// Combine two evaluated operands; shared with compound assignment
    pub(crate) fn apply_binary_op(
        op: BinOp,
        left: Value,
        left_ty: &Type,
        right: Value,
        right_ty: &Type,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        let value = match op {
            BinOp::Add => match (left_ty.is_address(), right_ty.is_address()) {
                (true, false) => from_address(pointer_add(to_address(left), right)),
                (false, true) => from_address(pointer_add(to_address(right), left)),
                _ => left.wrapping_add(right),
            },
            BinOp::Sub => match (left_ty.is_address(), right_ty.is_address()) {
                (true, false) => from_address(pointer_sub(to_address(left), right)),
                (true, true) => pointer_diff(to_address(left), to_address(right)),
                _ => left.wrapping_sub(right),
            },
            BinOp::Mul => left.wrapping_mul(right),
            BinOp::Div => {
                if right == 0 {
                    return Err(RuntimeError::DivisionError {
                        operation: "Division".to_string(),
                        location,
                    });
                }
                left.wrapping_div(right)
            }
            BinOp::Mod => {
                if right == 0 {
                    return Err(RuntimeError::DivisionError {
                        operation: "Modulo".to_string(),
                        location,
                    });
                }
                left.wrapping_rem(right)
            }
            BinOp::Eq => from_bool(left == right),
            BinOp::Ne => from_bool(left != right),
            BinOp::Lt => from_bool(left < right),
            BinOp::Le => from_bool(left <= right),
            BinOp::Gt => from_bool(left > right),
            BinOp::Ge => from_bool(left >= right),
            BinOp::And => from_bool(is_truthy(left) && is_truthy(right)),
            BinOp::Or => from_bool(is_truthy(left) || is_truthy(right)),
            BinOp::BitAnd => left & right,
            BinOp::BitOr => left | right,
            BinOp::BitXor => left ^ right,
            BinOp::BitShl => left.wrapping_shl(right as u32),
            BinOp::BitShr => left.wrapping_shr(right as u32),
        };
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(op: BinOp, a: Value, b: Value) -> Result<Value, RuntimeError> {
        Interpreter::apply_binary_op(op, a, &Type::int(), b, &Type::int(), SourceLocation::default())
    }

    #[test]
    fn test_integer_arithmetic() {
        assert_eq!(int(BinOp::Add, 2, 3), Ok(5));
        assert_eq!(int(BinOp::Sub, 2, 3), Ok(-1));
        assert_eq!(int(BinOp::Mul, -4, 3), Ok(-12));
        assert_eq!(int(BinOp::Div, -7, 2), Ok(-3));
        assert_eq!(int(BinOp::Mod, -7, 2), Ok(-1));
        assert_eq!(int(BinOp::Add, i64::MAX, 1), Ok(i64::MIN));
        assert_eq!(int(BinOp::Div, i64::MIN, -1), Ok(i64::MIN));
    }

    #[test]
    fn test_division_by_zero() {
        assert!(matches!(
            int(BinOp::Div, 1, 0),
            Err(RuntimeError::DivisionError { .. })
        ));
        assert!(matches!(
            int(BinOp::Mod, 1, 0),
            Err(RuntimeError::DivisionError { .. })
        ));
    }

    #[test]
    fn test_comparisons_and_bits() {
        assert_eq!(int(BinOp::Lt, 1, 2), Ok(1));
        assert_eq!(int(BinOp::Ge, 1, 2), Ok(0));
        assert_eq!(int(BinOp::BitXor, 0b1100, 0b1010), Ok(0b0110));
        assert_eq!(int(BinOp::BitShl, 1, 4), Ok(16));
        assert_eq!(int(BinOp::BitShr, -16, 2), Ok(-4));
    }

    #[test]
    fn test_pointer_arithmetic() {
        let ptr = Type::int().with_pointer();
        let loc = SourceLocation::default();
        let base = 0x1000_0000;
        assert_eq!(
            Interpreter::apply_binary_op(BinOp::Add, base, &ptr, 3, &Type::int(), loc),
            Ok(base + 24)
        );
        assert_eq!(
            Interpreter::apply_binary_op(BinOp::Add, 2, &Type::int(), base, &ptr, loc),
            Ok(base + 16)
        );
        assert_eq!(
            Interpreter::apply_binary_op(BinOp::Sub, base + 24, &ptr, base, &ptr, loc),
            Ok(3)
        );
    }
}
