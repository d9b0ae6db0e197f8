// Execution engine for the C interpreter

use crate::config::InterpreterConfig;
use crate::console::Console;
use crate::interpreter::constants::{
    ALLOCATE_BUILTIN, DEALLOCATE_BUILTIN, ENTRY_FUNCTION, PRINT_BUILTIN, READ_BUILTIN,
    STACK_GROW_SIZE, STACK_RED_ZONE,
};
use crate::interpreter::errors::RuntimeError;
use crate::memory::{
    heap::Heap,
    stack::Stack,
    value::{to_char, Value},
};
use crate::parser::ast::*;
use rustc_hash::FxHashMap;
use std::rc::Rc;
use tracing::{debug, trace};

/// The four intrinsic operations, resolved once per program
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Read,
    Print,
    Allocate,
    Deallocate,
}

impl Builtin {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            READ_BUILTIN => Some(Builtin::Read),
            PRINT_BUILTIN => Some(Builtin::Print),
            ALLOCATE_BUILTIN => Some(Builtin::Allocate),
            DEALLOCATE_BUILTIN => Some(Builtin::Deallocate),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Builtin::Read => READ_BUILTIN,
            Builtin::Print => PRINT_BUILTIN,
            Builtin::Allocate => ALLOCATE_BUILTIN,
            Builtin::Deallocate => DEALLOCATE_BUILTIN,
        }
    }
}

/// The main interpreter that executes a C program
///
/// All execution state lives here: the call stack (whose bottom frame holds
/// the globals), the heap, the console, and the function and built-in tables
/// built from the program's top-level declarations.
pub struct Interpreter {
    /// Call stack
    pub(crate) stack: Stack,

    /// Heap memory
    pub(crate) heap: Heap,

    /// Console used by the read and print built-ins
    pub(crate) console: Console,

    /// Function definitions by declaration
    functions: FxHashMap<DeclId, Rc<FunctionDecl>>,

    /// Built-ins by declaration
    pub(crate) builtins: FxHashMap<DeclId, Builtin>,

    /// The `main` definition, if any
    entry: Option<DeclId>,

    /// Globals in declaration order, bound when the program starts
    globals: Vec<VarDecl>,

    /// Global names, for inspection after a run
    global_names: FxHashMap<String, DeclId>,

    max_call_depth: usize,

    pub(crate) read_prompt: Option<String>,
}

impl Interpreter {
    /// Create a new interpreter with the parsed program
    pub fn new(program: Program, config: InterpreterConfig, console: Console) -> Self {
        let mut functions = FxHashMap::default();
        let mut builtins = FxHashMap::default();
        let mut entry = None;
        let mut globals = Vec::new();
        let mut global_names = FxHashMap::default();

        // Functions first, then globals in order
        for item in program.items {
            match item {
                TopLevel::Function(function) => {
                    if let Some(builtin) = Builtin::from_name(&function.name) {
                        if function.body.is_some() {
                            debug!(name = %function.name, "definition shadowed by built-in");
                        }
                        builtins.insert(function.id, builtin);
                        continue;
                    }
                    if function.body.is_none() {
                        continue;
                    }
                    if function.name == ENTRY_FUNCTION {
                        entry = Some(function.id);
                    }
                    functions.insert(function.id, Rc::new(function));
                }
                TopLevel::Global(decl) => {
                    global_names.insert(decl.name.clone(), decl.id);
                    globals.push(decl);
                }
            }
        }

        debug!(
            functions = functions.len(),
            builtins = builtins.len(),
            globals = globals.len(),
            "program loaded"
        );

        Interpreter {
            stack: Stack::new(),
            heap: Heap::new(config.heap_limit),
            console,
            functions,
            builtins,
            entry,
            globals,
            global_names,
            max_call_depth: config.max_call_depth,
            read_prompt: config.read_prompt,
        }
    }

    /// Run the program: bind the globals, then call `main` with no arguments
    ///
    /// Returns `main`'s return value. After a failure the call stack is left
    /// as it was at the point of failure, so [`Interpreter::backtrace`] can
    /// describe it.
    pub fn run(&mut self) -> Result<Value, RuntimeError> {
        for decl in std::mem::take(&mut self.globals) {
            self.execute_var_decl(&decl)?;
        }

        let entry = self.entry.ok_or(RuntimeError::NoMainFunction)?;
        let location = self
            .functions
            .get(&entry)
            .map(|f| f.location)
            .unwrap_or_default();

        let value = self.call_function(entry, ENTRY_FUNCTION, Vec::new(), location)?;
        debug!(value, "program finished");
        Ok(value)
    }

    /// Execute a single statement, growing the native stack if it runs low
    pub(crate) fn execute_statement(&mut self, stmt: &Stmt) -> Result<(), RuntimeError> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || {
            self.execute_statement_inner(stmt)
        })
    }

    fn execute_statement_inner(&mut self, stmt: &Stmt) -> Result<(), RuntimeError> {
        if self.has_returned() {
            return Ok(());
        }

        self.stack.current_frame_mut().current_location = Some(stmt.location);
        trace!(line = stmt.location.line, column = stmt.location.column, "statement");

        match &stmt.kind {
            StmtKind::Decl(decls) => {
                for decl in decls {
                    self.execute_var_decl(decl)?;
                }
                Ok(())
            }
            StmtKind::Expr(expr) => self.evaluate_expr(expr).map(|_| ()),
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => self.execute_if(condition, then_branch, else_branch.as_deref()),
            StmtKind::While { condition, body } => self.execute_while(condition, body),
            StmtKind::For {
                init,
                condition,
                increment,
                body,
            } => self.execute_for(init.as_deref(), condition.as_ref(), increment.as_ref(), body),
            StmtKind::Return(expr) => self.execute_return(expr.as_ref()),
            StmtKind::Block(stmts) => self.execute_block(stmts),
            StmtKind::Empty => Ok(()),
        }
    }

    /// Execute statements in order until one of them returns
    pub(crate) fn execute_block(&mut self, stmts: &[Stmt]) -> Result<(), RuntimeError> {
        for stmt in stmts {
            self.execute_statement(stmt)?;
            if self.has_returned() {
                break;
            }
        }
        Ok(())
    }

    /// Whether the current activation has executed a `return`
    pub(crate) fn has_returned(&self) -> bool {
        self.stack.current_frame().has_returned()
    }

    /// Dispatch a call to a built-in or a user-defined function
    pub(crate) fn execute_function_call(
        &mut self,
        callee: DeclId,
        name: &str,
        args: &[Expr],
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        if let Some(&builtin) = self.builtins.get(&callee) {
            return self.call_builtin(builtin, args, location);
        }

        // Arguments are evaluated left to right in the caller's frame
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.evaluate_expr(arg)?);
        }

        self.call_function(callee, name, values, location)
    }

    /// Push a frame, bind parameters positionally, run the body, pop the frame
    pub(crate) fn call_function(
        &mut self,
        callee: DeclId,
        name: &str,
        args: Vec<Value>,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        let function = self
            .functions
            .get(&callee)
            .cloned()
            .ok_or_else(|| RuntimeError::UndefinedFunction {
                name: name.to_string(),
                location,
            })?;

        if self.stack.depth() >= self.max_call_depth {
            return Err(RuntimeError::StackOverflow {
                limit: self.max_call_depth,
                location,
            });
        }

        debug!(function = %function.name, depth = self.stack.depth() + 1, "call");
        self.stack.push_frame(function.name.clone());

        // Missing arguments (unprototyped calls) read as 0
        for (i, param) in function.params.iter().enumerate() {
            let value = args.get(i).copied().unwrap_or(0);
            let value = Self::coerce_value_to_type(value, &param.param_type);
            self.stack.current_frame_mut().bind(param.id, value);
        }

        if let Some(body) = &function.body {
            self.execute_block(body)?;
        }

        let value = self.stack.current_frame().return_value().unwrap_or(0);
        let value = Self::coerce_value_to_type(value, &function.return_type);
        self.stack.pop_frame();

        debug!(function = %function.name, value, "return");
        Ok(value)
    }

    /// Narrow a value to what a variable of type `ty` can hold
    pub(crate) fn coerce_value_to_type(value: Value, ty: &Type) -> Value {
        match ty.class() {
            TypeClass::Character => to_char(value),
            _ => value,
        }
    }

    /// Active calls, innermost first, as `function (line:column)`
    pub fn backtrace(&self) -> Vec<String> {
        self.stack
            .frames()
            .iter()
            .skip(1)
            .rev()
            .map(|frame| match frame.current_location {
                Some(loc) => format!("{} ({})", frame.function_name, loc),
                None => frame.function_name.clone(),
            })
            .collect()
    }

    /// Current value of a global variable
    pub fn global_value(&self, name: &str) -> Option<Value> {
        let decl = self.global_names.get(name)?;
        self.stack.global_frame().binding(*decl)
    }

    /// Get the call stack
    pub fn stack(&self) -> &Stack {
        &self.stack
    }

    /// Get the heap
    pub fn heap(&self) -> &Heap {
        &self.heap
    }

    /// Get the console
    pub fn console(&self) -> &Console {
        &self.console
    }

    /// Give back the console, e.g. to collect captured output
    pub fn into_console(self) -> Console {
        self.console
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_source;

    fn interpreter(source: &str) -> Interpreter {
        let program = parse_source(source).unwrap();
        Interpreter::new(
            program,
            InterpreterConfig::default().without_prompt(),
            Console::scripted(""),
        )
    }

    #[test]
    fn test_builtin_table_is_keyed_by_declaration() {
        let interp = interpreter("int main() { PRINT(1); FREE(MALLOC(8)); return 0; }");
        let mut names: Vec<&str> = interp.builtins.values().map(|b| b.name()).collect();
        names.sort_unstable();
        assert_eq!(names, vec!["FREE", "MALLOC", "PRINT"]);
        assert!(interp.entry.is_some());
    }

    #[test]
    fn test_run_returns_main_value() {
        let mut interp = interpreter("int main() { return 6 * 7; }");
        assert_eq!(interp.run(), Ok(42));
        assert_eq!(interp.stack().depth(), 0);
    }

    #[test]
    fn test_missing_main() {
        let mut interp = interpreter("int f() { return 1; }");
        assert_eq!(interp.run(), Err(RuntimeError::NoMainFunction));
    }

    #[test]
    fn test_prototype_without_definition() {
        let mut interp = interpreter("int g(int); int main() { return g(1); }");
        assert!(matches!(
            interp.run(),
            Err(RuntimeError::UndefinedFunction { ref name, .. }) if name == "g"
        ));
    }

    #[test]
    fn test_backtrace_after_failure() {
        let mut interp = interpreter(
            "int f(int d) {\n  return 10 / d;\n}\nint main() {\n  return f(0);\n}",
        );
        assert!(matches!(
            interp.run(),
            Err(RuntimeError::DivisionError { .. })
        ));
        assert_eq!(interp.backtrace(), vec!["f (2:3)", "main (5:3)"]);
    }

    #[test]
    fn test_char_return_is_narrowed() {
        let mut interp = interpreter("char f() { return 300; } int main() { return f(); }");
        assert_eq!(interp.run(), Ok(44));
    }
}
