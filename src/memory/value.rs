//! Runtime value representation
//!
//! Every runtime value is a single 64-bit signed cell. Integers, characters
//! (sign-extended), comparison results (0/1) and simulated addresses all share
//! this representation; how a value is interpreted is decided by the static
//! type of the expression that produced it, never by a runtime tag.

/// A runtime value
pub type Value = i64;

/// Simulated memory address (64-bit); 0 is the null address
pub type Address = u64;

/// C truthiness: any nonzero value is true
pub fn is_truthy(value: Value) -> bool {
    value != 0
}

/// Comparison and logical results
pub fn from_bool(b: bool) -> Value {
    Value::from(b)
}

/// Truncate to 8 bits and sign-extend back to a full cell
pub fn to_char(value: Value) -> Value {
    value as i8 as Value
}

pub fn to_address(value: Value) -> Address {
    value as Address
}

pub fn from_address(address: Address) -> Value {
    address as Value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_truncation_sign_extends() {
        assert_eq!(to_char(65), 65);
        assert_eq!(to_char(255), -1);
        assert_eq!(to_char(300), 44);
        assert_eq!(to_char(-129), 127);
    }

    #[test]
    fn test_truthiness() {
        assert!(is_truthy(-3));
        assert!(!is_truthy(0));
        assert_eq!(from_bool(true), 1);
        assert_eq!(from_bool(false), 0);
    }
}
