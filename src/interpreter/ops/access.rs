use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::memory::{
    heap::Width,
    sizeof_type,
    value::{to_address, Address, Value},
};
use crate::parser::ast::{DeclId, Expr, SourceLocation};
use tracing::debug;

impl Interpreter {
    /// Current binding of a variable; unbound variables read as 0
    pub(crate) fn read_variable(&self, decl: DeclId, name: &str) -> Value {
        self.stack.lookup(decl).unwrap_or_else(|| {
            debug!(name, decl, "read of unbound variable");
            0
        })
    }

    /// Address of `array[index]`: base + index * element size
    ///
    /// Arrays evaluate to their base address, so arrays and pointers are
    /// handled alike.
    pub(crate) fn element_address(
        &mut self,
        array: &Expr,
        index: &Expr,
    ) -> Result<Address, RuntimeError> {
        let base = to_address(self.evaluate_expr(array)?);
        let index_val = self.evaluate_expr(index)?;

        let element_size = array
            .ty
            .decayed()
            .element_type()
            .and_then(|element| sizeof_type(&element))
            .ok_or_else(|| RuntimeError::UnsupportedOperation {
                message: format!("Cannot index a value of type {}", array.ty),
                location: array.location,
            })?;

        Ok(base.wrapping_add_signed(index_val.wrapping_mul(element_size as Value)))
    }

    pub(crate) fn load(
        &self,
        addr: Address,
        width: Width,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        self.heap
            .load(addr, width)
            .map_err(|e| RuntimeError::from_heap(e, location))
    }

    pub(crate) fn store(
        &mut self,
        addr: Address,
        width: Width,
        value: Value,
        location: SourceLocation,
    ) -> Result<(), RuntimeError> {
        self.heap
            .store(addr, width, value)
            .map_err(|e| RuntimeError::from_heap(e, location))
    }
}

#[cfg(test)]
mod tests {
    use crate::config::InterpreterConfig;
    use crate::console::Console;
    use crate::interpreter::engine::Interpreter;
    use crate::interpreter::errors::RuntimeError;
    use crate::parser::parse_source;

    fn run(source: &str) -> Result<i64, RuntimeError> {
        let program = parse_source(source).unwrap();
        let mut interp = Interpreter::new(program, InterpreterConfig::default(), Console::scripted(""));
        interp.run()
    }

    #[test]
    fn test_element_strides() {
        assert_eq!(run("int main() { int a[3]; return (a + 1) - a; }"), Ok(1));
        assert_eq!(
            run("int main() { char s[4]; char *p = s; s[3] = 7; return p[3]; }"),
            Ok(7)
        );
    }

    #[test]
    fn test_out_of_bounds_is_reported() {
        assert!(matches!(
            run("int main() { int a[2]; return a[2]; }"),
            Err(RuntimeError::BufferOverrun { .. })
        ));
        assert!(matches!(
            run("int main() { int a[2]; a[-1] = 1; return 0; }"),
            Err(RuntimeError::BufferOverrun { .. })
        ));
    }

    #[test]
    fn test_null_dereference() {
        assert!(matches!(
            run("int main() { int *p; return *p; }"),
            Err(RuntimeError::NullDereference { .. })
        ));
    }

    #[test]
    fn test_use_after_free() {
        assert!(matches!(
            run("int main() { int *p = MALLOC(8); FREE(p); return *p; }"),
            Err(RuntimeError::UseAfterFree { .. })
        ));
    }
}
