//! Assignment and lvalue resolution
//!
//! An assignment target resolves to a [`Place`]: either a variable binding in
//! the current or global frame, or a heap location with an access width.
//!
//! - Variable: rebinds the variable
//! - `a[i]`: stores one element of the element type
//! - `*p`: stores one 8-byte cell
//!
//! The right-hand side is evaluated before the target's address.

use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::memory::{
    heap::Width,
    value::{to_address, Address, Value},
    width_of,
};
use crate::parser::ast::*;

/// A resolved assignment target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Place {
    Variable { decl: DeclId },
    Memory { address: Address, width: Width },
}

impl Interpreter {
    /// Execute `lhs = rhs` or `lhs op= rhs`, returning the stored value
    pub(crate) fn execute_assignment(
        &mut self,
        op: Option<BinOp>,
        lhs: &Expr,
        rhs: &Expr,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        let value = self.evaluate_expr(rhs)?;
        let place = self.resolve_place(lhs)?;

        let value = match op {
            None => value,
            Some(op) => {
                let current = self.load_place(place, location)?;
                Self::apply_binary_op(op, current, &lhs.ty, value, &rhs.ty, location)?
            }
        };

        let stored = Self::coerce_value_to_type(value, &lhs.ty);
        self.store_place(place, stored, location)?;
        self.stack.current_frame_mut().memoize(lhs.id, stored);

        Ok(stored)
    }

    /// Resolve an lvalue expression to the location it designates
    pub(crate) fn resolve_place(&mut self, target: &Expr) -> Result<Place, RuntimeError> {
        match &target.kind {
            ExprKind::Variable { decl, .. } => Ok(Place::Variable { decl: *decl }),

            ExprKind::Paren(inner) => self.resolve_place(inner),

            ExprKind::Unary {
                op: UnOp::Deref,
                operand,
            } => {
                let address = to_address(self.evaluate_expr(operand)?);
                Ok(Place::Memory {
                    address,
                    width: Width::Cell,
                })
            }

            ExprKind::Index { array, index } => {
                let address = self.element_address(array, index)?;
                Ok(Place::Memory {
                    address,
                    width: width_of(&target.ty),
                })
            }

            _ => Err(RuntimeError::UnsupportedOperation {
                message: "Expression is not assignable".to_string(),
                location: target.location,
            }),
        }
    }

    pub(crate) fn load_place(
        &mut self,
        place: Place,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        match place {
            Place::Variable { decl } => Ok(self.stack.lookup(decl).unwrap_or(0)),
            Place::Memory { address, width } => self.load(address, width, location),
        }
    }

    pub(crate) fn store_place(
        &mut self,
        place: Place,
        value: Value,
        location: SourceLocation,
    ) -> Result<(), RuntimeError> {
        match place {
            Place::Variable { decl } => {
                self.stack.assign(decl, value);
                Ok(())
            }
            Place::Memory { address, width } => self.store(address, width, value, location),
        }
    }
}
