use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::memory::{
    heap::Width,
    pointer_add,
    value::{from_address, from_bool, to_address, Value},
};
use crate::parser::ast::{Expr, SourceLocation, UnOp};

impl Interpreter {
    pub(crate) fn evaluate_unary_op(
        &mut self,
        op: UnOp,
        operand: &Expr,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        match op {
            UnOp::Neg => Ok(self.evaluate_expr(operand)?.wrapping_neg()),
            UnOp::Plus => self.evaluate_expr(operand),
            UnOp::Not => Ok(from_bool(self.evaluate_expr(operand)? == 0)),
            UnOp::BitNot => Ok(!self.evaluate_expr(operand)?),

            // One cell, whatever the pointee type
            UnOp::Deref => {
                let addr = to_address(self.evaluate_expr(operand)?);
                self.load(addr, Width::Cell, location)
            }

            UnOp::AddrOf => Err(RuntimeError::UnsupportedOperation {
                message: "Address-of operator is not supported".to_string(),
                location,
            }),

            UnOp::PreInc => self.step_lvalue(operand, 1, true, location),
            UnOp::PreDec => self.step_lvalue(operand, -1, true, location),
            UnOp::PostInc => self.step_lvalue(operand, 1, false, location),
            UnOp::PostDec => self.step_lvalue(operand, -1, false, location),
        }
    }

    /// `++`/`--`: pointers move by one element, everything else by one
    fn step_lvalue(
        &mut self,
        operand: &Expr,
        delta: Value,
        prefix: bool,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        let place = self.resolve_place(operand)?;
        let old = self.load_place(place, location)?;

        let new = if operand.ty.is_pointer() {
            from_address(pointer_add(to_address(old), delta))
        } else {
            old.wrapping_add(delta)
        };
        let new = Self::coerce_value_to_type(new, &operand.ty);

        self.store_place(place, new, location)?;
        self.stack.current_frame_mut().memoize(operand.id, new);

        Ok(if prefix { new } else { old })
    }
}
