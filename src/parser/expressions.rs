//! Expression parsing implementation
//!
//! This module handles parsing of C expressions with one recursive descent
//! method per precedence level. Every expression is resolved and typed as it
//! is built.
//!
//! # Supported Expressions
//!
//! - Literals: integers, characters
//! - Identifiers (resolved to their declaration) and calls
//! - Binary operators: arithmetic, comparison, logical, bitwise, shifts
//! - Unary operators: `-`, `+`, `!`, `~`, `*`, `&`, `++`, `--`
//! - Postfix: `[]`, `++`, `--`
//! - Assignment and compound assignment (`+=`, `-=`, `*=`, `/=`, `%=`)
//! - Type casts: `(type)expr`
//! - `sizeof(type)` and `sizeof expr`
//!
//! # Typing
//!
//! Pointer arithmetic follows C: `p + i`, `i + p` and `p - i` keep the
//! pointer type, `p - q` is an integer. Arrays decay to pointers wherever an
//! address is expected. Comparisons, logical operators and arithmetic on
//! integers and characters yield `int`.

use crate::parser::ast::*;
use crate::parser::lexer::TokenKind;
use crate::parser::parse::{ParseError, Parser};
use crate::parser::scope::Symbol;

/// Whether an expression designates a storage location that can be assigned
fn is_lvalue(expr: &Expr) -> bool {
    match &expr.kind {
        ExprKind::Variable { .. } => !expr.ty.is_array(),
        ExprKind::Unary {
            op: UnOp::Deref, ..
        } => true,
        ExprKind::Index { .. } => true,
        ExprKind::Paren(inner) => is_lvalue(inner),
        _ => false,
    }
}

impl Parser {
    /// Parse expression (top-level entry point)
    pub(crate) fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        self.parse_assignment()
    }

    /// Reject operands of type `void`
    fn require_value(&self, expr: &Expr) -> Result<(), ParseError> {
        if expr.ty.class() == TypeClass::Void {
            return Err(ParseError::new(
                "Void value used in expression",
                expr.location,
            ));
        }
        Ok(())
    }

    /// Parse assignment (right-associative)
    fn parse_assignment(&mut self) -> Result<Expr, ParseError> {
        let lhs = self.parse_logical_or()?;

        let op = match self.peek().kind {
            TokenKind::Eq => None,
            TokenKind::PlusEq => Some(BinOp::Add),
            TokenKind::MinusEq => Some(BinOp::Sub),
            TokenKind::StarEq => Some(BinOp::Mul),
            TokenKind::SlashEq => Some(BinOp::Div),
            TokenKind::PercentEq => Some(BinOp::Mod),
            _ => return Ok(lhs),
        };
        let loc = self.current_location();
        self.advance();

        if !is_lvalue(&lhs) {
            let message = if lhs.ty.is_array() {
                "Array is not assignable".to_string()
            } else {
                "Left side of assignment is not assignable".to_string()
            };
            return Err(ParseError::new(message, lhs.location));
        }

        let rhs = self.parse_assignment()?;
        self.require_value(&rhs)?;

        if let Some(op) = op {
            if lhs.ty.is_pointer() && !matches!(op, BinOp::Add | BinOp::Sub) {
                return Err(ParseError::new(
                    format!("Invalid operator '{}=' on pointer", op.symbol()),
                    loc,
                ));
            }
        }

        let ty = lhs.ty.clone();
        Ok(self.make_expr(
            ExprKind::Assign {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
            ty,
            loc,
        ))
    }

    /// Parse logical OR (||)
    fn parse_logical_or(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_logical_and()?;

        while self.match_token(&TokenKind::OrOr) {
            let loc = self.previous_location();
            let right = self.parse_logical_and()?;
            left = self.build_binary(BinOp::Or, left, right, loc)?;
        }

        Ok(left)
    }

    /// Parse logical AND (&&)
    fn parse_logical_and(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_bitwise_or()?;

        while self.match_token(&TokenKind::AndAnd) {
            let loc = self.previous_location();
            let right = self.parse_bitwise_or()?;
            left = self.build_binary(BinOp::And, left, right, loc)?;
        }

        Ok(left)
    }

    fn parse_bitwise_or(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_bitwise_xor()?;

        while self.match_token(&TokenKind::Pipe) {
            let loc = self.previous_location();
            let right = self.parse_bitwise_xor()?;
            left = self.build_binary(BinOp::BitOr, left, right, loc)?;
        }

        Ok(left)
    }

    fn parse_bitwise_xor(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_bitwise_and()?;

        while self.match_token(&TokenKind::Caret) {
            let loc = self.previous_location();
            let right = self.parse_bitwise_and()?;
            left = self.build_binary(BinOp::BitXor, left, right, loc)?;
        }

        Ok(left)
    }

    fn parse_bitwise_and(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_equality()?;

        while self.match_token(&TokenKind::Amp) {
            let loc = self.previous_location();
            let right = self.parse_equality()?;
            left = self.build_binary(BinOp::BitAnd, left, right, loc)?;
        }

        Ok(left)
    }

    /// Parse equality (==, !=)
    fn parse_equality(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_relational()?;

        loop {
            let op = match self.peek().kind {
                TokenKind::EqEq => BinOp::Eq,
                TokenKind::NotEq => BinOp::Ne,
                _ => break,
            };
            let loc = self.current_location();
            self.advance();
            let right = self.parse_relational()?;
            left = self.build_binary(op, left, right, loc)?;
        }

        Ok(left)
    }

    /// Parse relational (<, <=, >, >=)
    fn parse_relational(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_shift()?;

        loop {
            let op = match self.peek().kind {
                TokenKind::Lt => BinOp::Lt,
                TokenKind::Le => BinOp::Le,
                TokenKind::Gt => BinOp::Gt,
                TokenKind::Ge => BinOp::Ge,
                _ => break,
            };
            let loc = self.current_location();
            self.advance();
            let right = self.parse_shift()?;
            left = self.build_binary(op, left, right, loc)?;
        }

        Ok(left)
    }

    fn parse_shift(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_additive()?;

        loop {
            let op = match self.peek().kind {
                TokenKind::LtLt => BinOp::BitShl,
                TokenKind::GtGt => BinOp::BitShr,
                _ => break,
            };
            let loc = self.current_location();
            self.advance();
            let right = self.parse_additive()?;
            left = self.build_binary(op, left, right, loc)?;
        }

        Ok(left)
    }

    /// Parse additive (+, -)
    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let op = match self.peek().kind {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => break,
            };
            let loc = self.current_location();
            self.advance();
            let right = self.parse_multiplicative()?;
            left = self.build_binary(op, left, right, loc)?;
        }

        Ok(left)
    }

    /// Parse multiplicative (*, /, %)
    fn parse_multiplicative(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_cast()?;

        loop {
            let op = match self.peek().kind {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                TokenKind::Percent => BinOp::Mod,
                _ => break,
            };
            let loc = self.current_location();
            self.advance();
            let right = self.parse_cast()?;
            left = self.build_binary(op, left, right, loc)?;
        }

        Ok(left)
    }

    /// Type a binary operation and build its node
    fn build_binary(
        &mut self,
        op: BinOp,
        left: Expr,
        right: Expr,
        loc: SourceLocation,
    ) -> Result<Expr, ParseError> {
        self.require_value(&left)?;
        self.require_value(&right)?;

        let left_addr = left.ty.is_address();
        let right_addr = right.ty.is_address();

        let ty = match op {
            BinOp::Add => match (left_addr, right_addr) {
                (true, false) => left.ty.decayed(),
                (false, true) => right.ty.decayed(),
                (false, false) => Type::int(),
                (true, true) => {
                    return Err(ParseError::new("Cannot add two pointers", loc));
                }
            },
            BinOp::Sub => match (left_addr, right_addr) {
                (true, false) => left.ty.decayed(),
                (false, false) | (true, true) => Type::int(),
                (false, true) => {
                    return Err(ParseError::new(
                        "Cannot subtract a pointer from an integer",
                        loc,
                    ));
                }
            },
            BinOp::Mul
            | BinOp::Div
            | BinOp::Mod
            | BinOp::BitAnd
            | BinOp::BitOr
            | BinOp::BitXor
            | BinOp::BitShl
            | BinOp::BitShr => {
                if left_addr || right_addr {
                    return Err(ParseError::new(
                        format!("Invalid operands to '{}'", op.symbol()),
                        loc,
                    ));
                }
                Type::int()
            }
            BinOp::Eq
            | BinOp::Ne
            | BinOp::Lt
            | BinOp::Le
            | BinOp::Gt
            | BinOp::Ge
            | BinOp::And
            | BinOp::Or => Type::int(),
        };

        Ok(self.make_expr(
            ExprKind::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
            ty,
            loc,
        ))
    }

    /// Parse `(type)expr`, falling through to unary expressions
    fn parse_cast(&mut self) -> Result<Expr, ParseError> {
        let is_cast = self.check(&TokenKind::LParen)
            && matches!(
                self.peek_ahead(1).map(|t| &t.kind),
                Some(TokenKind::Int | TokenKind::Char | TokenKind::Void)
            );
        if !is_cast {
            return self.parse_unary();
        }

        let loc = self.current_location();
        self.advance();
        let target = self.parse_type_name()?;
        self.expect_token(TokenKind::RParen, "after cast type")?;
        let operand = self.parse_cast()?;
        if target.class() != TypeClass::Void {
            self.require_value(&operand)?;
        }

        Ok(self.make_expr(ExprKind::Cast(Box::new(operand)), target, loc))
    }

    /// Parse unary operators
    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let loc = self.current_location();

        let op = match self.peek().kind {
            TokenKind::Minus => UnOp::Neg,
            TokenKind::Plus => UnOp::Plus,
            TokenKind::Bang => UnOp::Not,
            TokenKind::Tilde => UnOp::BitNot,
            TokenKind::Star => UnOp::Deref,
            TokenKind::Amp => UnOp::AddrOf,
            TokenKind::PlusPlus => UnOp::PreInc,
            TokenKind::MinusMinus => UnOp::PreDec,
            TokenKind::Sizeof => {
                self.advance();
                return self.parse_sizeof(loc);
            }
            _ => return self.parse_postfix(),
        };
        self.advance();

        let operand = self.parse_cast()?;
        self.build_unary(op, operand, loc)
    }

    /// Type a unary operation and build its node
    fn build_unary(&mut self, op: UnOp, operand: Expr, loc: SourceLocation) -> Result<Expr, ParseError> {
        let ty = match op {
            UnOp::Neg | UnOp::Plus | UnOp::BitNot => {
                self.require_value(&operand)?;
                if operand.ty.is_address() {
                    return Err(ParseError::new(
                        format!("Invalid operand to unary '{}'", op.symbol()),
                        loc,
                    ));
                }
                Type::int()
            }
            UnOp::Not => {
                self.require_value(&operand)?;
                Type::int()
            }
            UnOp::PreInc | UnOp::PreDec | UnOp::PostInc | UnOp::PostDec => {
                if !is_lvalue(&operand) {
                    return Err(ParseError::new(
                        format!("Operand of '{}' is not assignable", op.symbol()),
                        loc,
                    ));
                }
                operand.ty.clone()
            }
            UnOp::Deref => {
                let pointee = operand
                    .ty
                    .decayed()
                    .element_type()
                    .filter(|_| operand.ty.is_address());
                match pointee {
                    Some(ty) if ty.class() != TypeClass::Void => ty,
                    Some(_) => {
                        return Err(ParseError::new("Dereferencing a void pointer", loc));
                    }
                    None => {
                        return Err(ParseError::new(
                            format!("Cannot dereference a value of type {}", operand.ty),
                            loc,
                        ));
                    }
                }
            }
            UnOp::AddrOf => {
                if !is_lvalue(&operand) && !operand.ty.is_array() {
                    return Err(ParseError::new(
                        "Cannot take the address of this expression",
                        loc,
                    ));
                }
                operand.ty.decayed().with_pointer()
            }
        };

        Ok(self.make_expr(
            ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            ty,
            loc,
        ))
    }

    /// Parse the operand of `sizeof`: a parenthesized type or an expression
    fn parse_sizeof(&mut self, loc: SourceLocation) -> Result<Expr, ParseError> {
        let is_type = self.check(&TokenKind::LParen)
            && matches!(
                self.peek_ahead(1).map(|t| &t.kind),
                Some(TokenKind::Int | TokenKind::Char | TokenKind::Void)
            );

        let measured = if is_type {
            self.advance();
            let ty = self.parse_type_name()?;
            let ty = self.parse_sizeof_array_suffix(ty)?;
            self.expect_token(TokenKind::RParen, "after sizeof type")?;
            ty
        } else {
            // The operand is typed but never evaluated
            self.parse_unary()?.ty
        };

        Ok(self.make_expr(ExprKind::Sizeof(measured), Type::int(), loc))
    }

    /// `sizeof(int[4])`
    fn parse_sizeof_array_suffix(&mut self, ty: Type) -> Result<Type, ParseError> {
        if !self.match_token(&TokenKind::LBracket) {
            return Ok(ty);
        }
        let len = match self.peek().kind {
            TokenKind::IntLiteral(n) if n > 0 => n as usize,
            _ => {
                return Err(ParseError::new(
                    "Array size must be a positive integer constant",
                    self.current_location(),
                ))
            }
        };
        self.advance();
        self.expect_token(TokenKind::RBracket, "after array size")?;
        Ok(ty.with_array(len))
    }

    /// Parse postfix operators: `[]`, `++`, `--`
    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;

        loop {
            let loc = self.current_location();
            if self.match_token(&TokenKind::LBracket) {
                let index = self.parse_expression()?;
                self.expect_token(TokenKind::RBracket, "after array index")?;
                expr = self.build_index(expr, index, loc)?;
            } else if self.match_token(&TokenKind::PlusPlus) {
                expr = self.build_unary(UnOp::PostInc, expr, loc)?;
            } else if self.match_token(&TokenKind::MinusMinus) {
                expr = self.build_unary(UnOp::PostDec, expr, loc)?;
            } else {
                break;
            }
        }

        Ok(expr)
    }

    fn build_index(&mut self, array: Expr, index: Expr, loc: SourceLocation) -> Result<Expr, ParseError> {
        if !array.ty.is_address() {
            return Err(ParseError::new(
                format!("Subscripted value of type {} is not an array or pointer", array.ty),
                loc,
            ));
        }
        self.require_value(&index)?;
        if index.ty.is_address() {
            return Err(ParseError::new("Array index must be an integer", index.location));
        }

        let ty = match array.ty.decayed().element_type() {
            Some(ty) if ty.class() != TypeClass::Void => ty,
            _ => {
                return Err(ParseError::new("Subscript of a void pointer", loc));
            }
        };

        Ok(self.make_expr(
            ExprKind::Index {
                array: Box::new(array),
                index: Box::new(index),
            },
            ty,
            loc,
        ))
    }

    /// Parse primary expressions: literals, identifiers, calls, parentheses
    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let loc = self.current_location();

        match self.peek().kind.clone() {
            TokenKind::IntLiteral(n) => {
                self.advance();
                Ok(self.make_expr(ExprKind::IntLiteral(n), Type::int(), loc))
            }
            TokenKind::CharLiteral(c) => {
                self.advance();
                Ok(self.make_expr(ExprKind::CharLiteral(c), Type::char(), loc))
            }
            TokenKind::Ident(name) => {
                self.advance();
                if self.check(&TokenKind::LParen) {
                    return self.parse_call(name, loc);
                }
                match self.scopes.lookup(&name) {
                    Some(Symbol::Variable { id, var_type }) => {
                        let (decl, ty) = (*id, var_type.clone());
                        Ok(self.make_expr(ExprKind::Variable { decl, name }, ty, loc))
                    }
                    Some(Symbol::Function { .. }) => Err(ParseError::new(
                        format!("Function '{}' used as a value", name),
                        loc,
                    )),
                    None => Err(ParseError::new(
                        format!("Undeclared identifier '{}'", name),
                        loc,
                    )),
                }
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expression()?;
                self.expect_token(TokenKind::RParen, "after expression")?;
                let ty = inner.ty.clone();
                Ok(self.make_expr(ExprKind::Paren(Box::new(inner)), ty, loc))
            }
            _ => Err(ParseError::new(
                format!("Expected expression, found {}", self.peek()),
                loc,
            )),
        }
    }

    /// Parse a call; the callee is resolved before its arguments
    fn parse_call(&mut self, name: String, loc: SourceLocation) -> Result<Expr, ParseError> {
        let symbol = match self.scopes.lookup(&name).cloned() {
            Some(symbol) => symbol,
            None => self.declare_builtin(&name, loc).ok_or_else(|| {
                ParseError::new(format!("Call to undeclared function '{}'", name), loc)
            })?,
        };

        let (callee, return_type, param_count) = match symbol {
            Symbol::Function {
                id,
                return_type,
                param_count,
                ..
            } => (id, return_type, param_count),
            Symbol::Variable { .. } => {
                return Err(ParseError::new(
                    format!("'{}' is not a function", name),
                    loc,
                ));
            }
        };

        self.expect_token(TokenKind::LParen, "after function name")?;
        let mut args = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                let arg = self.parse_assignment()?;
                self.require_value(&arg)?;
                args.push(arg);
                if !self.match_token(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect_token(TokenKind::RParen, "after arguments")?;

        if let Some(expected) = param_count {
            if expected != args.len() {
                return Err(ParseError::new(
                    format!(
                        "Function '{}' expects {} argument(s), got {}",
                        name,
                        expected,
                        args.len()
                    ),
                    loc,
                ));
            }
        }

        Ok(self.make_expr(
            ExprKind::Call {
                callee,
                name,
                args,
            },
            return_type,
            loc,
        ))
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::ast::*;
    use crate::parser::parse::Parser;

    fn first_expr(body: &str) -> Expr {
        let source = format!("int main() {{ int x; int *p; int a[4]; char c; {} }}", body);
        let program = Parser::new(&source).unwrap().parse_program().unwrap();
        let function = program.functions().find(|f| f.name == "main").unwrap();
        function
            .body
            .as_ref()
            .unwrap()
            .iter()
            .find_map(|s| match &s.kind {
                StmtKind::Expr(e) => Some(e.clone()),
                _ => None,
            })
            .unwrap()
    }

    #[test]
    fn test_precedence() {
        let expr = first_expr("1 + 2 * 3;");
        match expr.kind {
            ExprKind::Binary {
                op: BinOp::Add,
                right,
                ..
            } => assert!(matches!(right.kind, ExprKind::Binary { op: BinOp::Mul, .. })),
            _ => panic!("Expected addition at the root"),
        }
    }

    #[test]
    fn test_assignment_is_right_associative() {
        let expr = first_expr("x = c = 3;");
        match expr.kind {
            ExprKind::Assign { op: None, rhs, .. } => {
                assert!(matches!(rhs.kind, ExprKind::Assign { .. }))
            }
            _ => panic!("Expected assignment"),
        }
    }

    #[test]
    fn test_pointer_typing() {
        assert_eq!(first_expr("3 + p;").ty, Type::int().with_pointer());
        assert_eq!(first_expr("a + 1;").ty, Type::int().with_pointer());
        assert_eq!(first_expr("p - p;").ty, Type::int());
        assert_eq!(first_expr("c + c;").ty, Type::int());
        assert_eq!(first_expr("p[1];").ty, Type::int());
        assert_eq!(first_expr("(char)x;").ty, Type::char());
        assert_eq!(first_expr("sizeof(int*);").ty, Type::int());
    }

    #[test]
    fn test_compound_assignment_keeps_operator() {
        let expr = first_expr("x -= 2;");
        assert!(matches!(
            expr.kind,
            ExprKind::Assign {
                op: Some(BinOp::Sub),
                ..
            }
        ));
    }

    #[test]
    fn test_sizeof_operand_forms() {
        match first_expr("sizeof a;").kind {
            ExprKind::Sizeof(ty) => assert_eq!(ty, Type::int().with_array(4)),
            _ => panic!("Expected sizeof"),
        }
        match first_expr("sizeof(c);").kind {
            ExprKind::Sizeof(ty) => assert_eq!(ty, Type::char()),
            _ => panic!("Expected sizeof"),
        }
    }

    #[test]
    fn test_invalid_expressions() {
        let cases = [
            "int main() { int *p; p + p; }",
            "int main() { int x; x[0]; }",
            "int main() { int x; x++ = 1; }",
            "int main() { int x; 1 - &x; }",
            "int main() { void *v; *v; }",
            "int main() { PRINT(PRINT(1)); }",
            "int main() { return (1; }",
        ];
        for source in cases {
            let result = Parser::new(source).unwrap().parse_program();
            assert!(result.is_err(), "expected error for {source}");
        }
    }
}
