// Typed AST definitions for the C subset

use std::fmt;

/// Unique identifier for statement and expression nodes, used as the key of a
/// frame's expression memo table
pub type NodeId = usize;

/// Unique identifier for a declaration (function, parameter, or variable)
pub type DeclId = usize;

/// Source location information for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Base types supported by the interpreter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseType {
    Int,
    Char,
    Void,
}

/// Type representation: a base type, a pointer depth and an optional single
/// fixed array dimension
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Type {
    pub base: BaseType,
    pub pointer_depth: usize, // 0 = not pointer, 1 = *, 2 = **, etc.
    pub array_len: Option<usize>,
}

/// Classification the evaluator dispatches on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeClass {
    Integer,
    Character,
    Pointer,
    Array { len: usize },
    Void,
}

impl Type {
    pub fn new(base: BaseType) -> Self {
        Type {
            base,
            pointer_depth: 0,
            array_len: None,
        }
    }

    pub fn int() -> Self {
        Type::new(BaseType::Int)
    }

    pub fn char() -> Self {
        Type::new(BaseType::Char)
    }

    pub fn void() -> Self {
        Type::new(BaseType::Void)
    }

    pub fn with_pointer(mut self) -> Self {
        self.pointer_depth += 1;
        self
    }

    pub fn with_array(mut self, len: usize) -> Self {
        self.array_len = Some(len);
        self
    }

    pub fn class(&self) -> TypeClass {
        if let Some(len) = self.array_len {
            return TypeClass::Array { len };
        }
        if self.pointer_depth > 0 {
            return TypeClass::Pointer;
        }
        match self.base {
            BaseType::Int => TypeClass::Integer,
            BaseType::Char => TypeClass::Character,
            BaseType::Void => TypeClass::Void,
        }
    }

    pub fn is_array(&self) -> bool {
        self.array_len.is_some()
    }

    pub fn is_pointer(&self) -> bool {
        self.array_len.is_none() && self.pointer_depth > 0
    }

    /// Pointers and arrays both designate an address
    pub fn is_address(&self) -> bool {
        self.is_array() || self.is_pointer()
    }

    pub fn is_scalar(&self) -> bool {
        matches!(
            self.class(),
            TypeClass::Integer | TypeClass::Character | TypeClass::Pointer
        )
    }

    /// Element type of an array, or pointee type of a pointer
    pub fn element_type(&self) -> Option<Type> {
        if self.array_len.is_some() {
            return Some(Type {
                base: self.base,
                pointer_depth: self.pointer_depth,
                array_len: None,
            });
        }
        if self.pointer_depth > 0 {
            return Some(Type {
                base: self.base,
                pointer_depth: self.pointer_depth - 1,
                array_len: None,
            });
        }
        None
    }

    /// Array-to-pointer decay; other types are returned unchanged
    pub fn decayed(&self) -> Type {
        if self.array_len.is_some() {
            Type {
                base: self.base,
                pointer_depth: self.pointer_depth + 1,
                array_len: None,
            }
        } else {
            self.clone()
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let base = match self.base {
            BaseType::Int => "int",
            BaseType::Char => "char",
            BaseType::Void => "void",
        };
        write!(f, "{}", base)?;
        for _ in 0..self.pointer_depth {
            write!(f, "*")?;
        }
        if let Some(len) = self.array_len {
            write!(f, "[{}]", len)?;
        }
        Ok(())
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    // Comparison
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    // Logical
    And,
    Or,
    // Bitwise
    BitAnd,
    BitOr,
    BitXor,
    BitShl,
    BitShr,
}

impl BinOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
            BinOp::And => "&&",
            BinOp::Or => "||",
            BinOp::BitAnd => "&",
            BinOp::BitOr => "|",
            BinOp::BitXor => "^",
            BinOp::BitShl => "<<",
            BinOp::BitShr => ">>",
        }
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Neg,     // -x
    Plus,    // +x
    Not,     // !x
    BitNot,  // ~x
    PreInc,  // ++x
    PreDec,  // --x
    PostInc, // x++
    PostDec, // x--
    Deref,   // *x
    AddrOf,  // &x
}

impl UnOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            UnOp::Neg => "-",
            UnOp::Plus => "+",
            UnOp::Not => "!",
            UnOp::BitNot => "~",
            UnOp::PreInc | UnOp::PostInc => "++",
            UnOp::PreDec | UnOp::PostDec => "--",
            UnOp::Deref => "*",
            UnOp::AddrOf => "&",
        }
    }
}

/// A variable declaration (global, local, or `for` initializer)
#[derive(Debug, Clone)]
pub struct VarDecl {
    pub id: DeclId,
    pub name: String,
    pub var_type: Type,
    pub init: Option<Expr>,
    pub location: SourceLocation,
}

/// Function parameter
#[derive(Debug, Clone)]
pub struct Param {
    pub id: DeclId,
    pub name: String,
    pub param_type: Type,
}

/// A function declaration; `body` is `None` for prototypes
#[derive(Debug, Clone)]
pub struct FunctionDecl {
    pub id: DeclId,
    pub name: String,
    pub params: Vec<Param>,
    pub return_type: Type,
    pub body: Option<Vec<Stmt>>,
    pub location: SourceLocation,
}

/// Top-level declarations
#[derive(Debug, Clone)]
pub enum TopLevel {
    Function(FunctionDecl),
    Global(VarDecl),
}

/// Statement node
#[derive(Debug, Clone)]
pub struct Stmt {
    pub id: NodeId,
    pub kind: StmtKind,
    pub location: SourceLocation,
}

#[derive(Debug, Clone)]
pub enum StmtKind {
    Decl(Vec<VarDecl>),
    Expr(Expr),
    If {
        condition: Expr,
        then_branch: Vec<Stmt>,
        else_branch: Option<Vec<Stmt>>,
    },
    While {
        condition: Expr,
        body: Vec<Stmt>,
    },
    For {
        init: Option<Box<Stmt>>,
        condition: Option<Expr>,
        increment: Option<Expr>,
        body: Vec<Stmt>,
    },
    Return(Option<Expr>),
    Block(Vec<Stmt>),
    Empty,
}

/// Expression node carrying its static type
#[derive(Debug, Clone)]
pub struct Expr {
    pub id: NodeId,
    pub kind: ExprKind,
    pub ty: Type,
    pub location: SourceLocation,
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    IntLiteral(i64),
    CharLiteral(i8),
    Variable {
        decl: DeclId,
        name: String,
    },
    Paren(Box<Expr>),
    Cast(Box<Expr>),
    Unary {
        op: UnOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Plain assignment when `op` is `None`, compound assignment otherwise
    Assign {
        op: Option<BinOp>,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Index {
        array: Box<Expr>,
        index: Box<Expr>,
    },
    Sizeof(Type),
    Call {
        callee: DeclId,
        name: String,
        args: Vec<Expr>,
    },
}

impl Expr {
    /// Strips parentheses and casts, which never change a value
    pub fn ignore_parens(&self) -> &Expr {
        match &self.kind {
            ExprKind::Paren(inner) | ExprKind::Cast(inner) => inner.ignore_parens(),
            _ => self,
        }
    }
}

/// Top-level program structure
#[derive(Debug, Clone, Default)]
pub struct Program {
    pub items: Vec<TopLevel>, // In source order
}

impl Program {
    pub fn new() -> Self {
        Program::default()
    }

    pub fn functions(&self) -> impl Iterator<Item = &FunctionDecl> {
        self.items.iter().filter_map(|item| match item {
            TopLevel::Function(f) => Some(f),
            TopLevel::Global(_) => None,
        })
    }

    pub fn globals(&self) -> impl Iterator<Item = &VarDecl> {
        self.items.iter().filter_map(|item| match item {
            TopLevel::Global(v) => Some(v),
            TopLevel::Function(_) => None,
        })
    }
}
