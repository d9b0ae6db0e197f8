//! Memory model for the C interpreter
//!
//! This module provides the core memory abstractions:
//! - [`value`]: Runtime value representation (one 64-bit cell)
//! - [`stack`]: Call stack with activation records
//! - [`heap`]: Bounded simulated heap with tombstone tracking
//!
//! # Type Sizes
//!
//! Unlike real C, this interpreter uses fixed, platform-independent sizes:
//! - `int`: 8 bytes
//! - `char`: 1 byte
//! - `pointer`: 8 bytes (regardless of pointee type)
//! - `T[N]`: `N * sizeof(T)`
//!
//! # Pointer Arithmetic
//!
//! Pointer arithmetic uses a fixed 8-byte stride, whatever the pointee:
//! ```text
//! ptr + n  →  ptr + (n * 8)
//! ```
//!
//! Helper functions [`pointer_add`], [`pointer_sub`], and [`pointer_diff`] handle
//! this scaling.

pub mod heap;
pub mod stack;
pub mod value;

use crate::interpreter::constants::{CELL_SIZE, POINTER_STRIDE};
use crate::parser::ast::{Type, TypeClass};
use heap::Width;
use value::{Address, Value};

/// Calculate the size of a type in bytes; `None` for `void` or an array too
/// large to address
pub fn sizeof_type(t: &Type) -> Option<usize> {
    match t.class() {
        TypeClass::Integer | TypeClass::Pointer => Some(CELL_SIZE),
        TypeClass::Character => Some(1),
        TypeClass::Array { len } => {
            let element = t.element_type()?;
            sizeof_type(&element)?.checked_mul(len)
        }
        TypeClass::Void => None,
    }
}

/// Width of one stored element of type `t`
pub fn width_of(t: &Type) -> Width {
    match t.class() {
        TypeClass::Character => Width::Byte,
        _ => Width::Cell,
    }
}

/// Perform pointer arithmetic: addr + offset (scaled by the stride)
pub fn pointer_add(addr: Address, offset: Value) -> Address {
    addr.wrapping_add_signed(offset.wrapping_mul(POINTER_STRIDE))
}

/// Perform pointer subtraction: addr - offset (scaled by the stride)
pub fn pointer_sub(addr: Address, offset: Value) -> Address {
    pointer_add(addr, offset.wrapping_neg())
}

/// Calculate the difference between two pointers (in elements, not bytes)
pub fn pointer_diff(addr1: Address, addr2: Address) -> Value {
    (addr1.wrapping_sub(addr2) as Value) / POINTER_STRIDE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sizeof() {
        assert_eq!(sizeof_type(&Type::int()), Some(8));
        assert_eq!(sizeof_type(&Type::char()), Some(1));
        assert_eq!(sizeof_type(&Type::char().with_pointer()), Some(8));
        assert_eq!(sizeof_type(&Type::char().with_array(5)), Some(5));
        assert_eq!(sizeof_type(&Type::int().with_array(3)), Some(24));
        assert_eq!(sizeof_type(&Type::void()), None);
        assert_eq!(sizeof_type(&Type::int().with_array(usize::MAX / 4)), None);
    }

    #[test]
    fn test_pointer_arithmetic_uses_fixed_stride() {
        let base: Address = 0x1000_0000;
        assert_eq!(pointer_add(base, 3), base + 24);
        assert_eq!(pointer_sub(base + 24, 1), base + 16);
        assert_eq!(pointer_diff(base + 24, base), 3);
        assert_eq!(pointer_diff(base, base + 16), -2);
    }
}
