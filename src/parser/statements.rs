//! Statement parsing implementation
//!
//! This module handles parsing of all supported C statement types:
//!
//! - Variable declarations: `int x = 42, a[3];`
//! - Control flow: `if`, `while`, `for`
//! - `return` with or without a value
//! - Compound statements: `{ ... }` (each opens a new scope)
//! - Expression statements and the empty statement
//!
//! # Grammar
//!
//! ```text
//! statement ::= var_decl | if_stmt | while_stmt | for_stmt
//!             | return_stmt | block | expr_stmt | ";"
//! ```

use crate::parser::ast::*;
use crate::parser::lexer::TokenKind;
use crate::parser::parse::{ParseError, Parser};

impl Parser {
    /// Parse block statements (inside braces, excluding the braces themselves)
    pub(crate) fn parse_block_statements(&mut self) -> Result<Vec<Stmt>, ParseError> {
        let mut statements = Vec::new();

        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            statements.push(self.parse_statement()?);
        }

        Ok(statements)
    }

    /// Parse a statement
    pub(crate) fn parse_statement(&mut self) -> Result<Stmt, ParseError> {
        let loc = self.current_location();

        match self.peek().kind {
            TokenKind::Return => {
                self.advance();
                self.parse_return_statement(loc)
            }
            TokenKind::If => {
                self.advance();
                self.parse_if_statement(loc)
            }
            TokenKind::While => {
                self.advance();
                self.parse_while_statement(loc)
            }
            TokenKind::For => {
                self.advance();
                self.parse_for_statement(loc)
            }
            TokenKind::LBrace => {
                self.advance();
                let statements = self.parse_scoped_block()?;
                Ok(self.make_stmt(StmtKind::Block(statements), loc))
            }
            TokenKind::Semicolon => {
                self.advance();
                Ok(self.make_stmt(StmtKind::Empty, loc))
            }
            _ if self.is_type_keyword() => self.parse_variable_declaration(),
            _ => {
                let expr = self.parse_expression()?;
                self.expect_token(TokenKind::Semicolon, "after expression")?;
                Ok(self.make_stmt(StmtKind::Expr(expr), loc))
            }
        }
    }

    /// Parse the rest of a `{ ... }` block in its own scope
    fn parse_scoped_block(&mut self) -> Result<Vec<Stmt>, ParseError> {
        self.scopes.push();
        let statements = self.parse_block_statements();
        self.scopes.pop();
        let statements = statements?;
        self.expect_token(TokenKind::RBrace, "after block")?;
        Ok(statements)
    }

    fn parse_return_statement(&mut self, loc: SourceLocation) -> Result<Stmt, ParseError> {
        let expr = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };

        self.expect_token(TokenKind::Semicolon, "after return")?;
        Ok(self.make_stmt(StmtKind::Return(expr), loc))
    }

    fn parse_if_statement(&mut self, loc: SourceLocation) -> Result<Stmt, ParseError> {
        self.expect_token(TokenKind::LParen, "after 'if'")?;
        let condition = self.parse_expression()?;
        self.expect_token(TokenKind::RParen, "after if condition")?;

        let then_branch = self.parse_statement_or_block()?;

        let else_branch = if self.match_token(&TokenKind::Else) {
            Some(self.parse_statement_or_block()?)
        } else {
            None
        };

        Ok(self.make_stmt(
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            },
            loc,
        ))
    }

    fn parse_while_statement(&mut self, loc: SourceLocation) -> Result<Stmt, ParseError> {
        self.expect_token(TokenKind::LParen, "after 'while'")?;
        let condition = self.parse_expression()?;
        self.expect_token(TokenKind::RParen, "after while condition")?;

        let body = self.parse_statement_or_block()?;

        Ok(self.make_stmt(StmtKind::While { condition, body }, loc))
    }

    /// Parse `for (init; condition; increment) body`; the initializer may
    /// declare variables scoped to the loop
    fn parse_for_statement(&mut self, loc: SourceLocation) -> Result<Stmt, ParseError> {
        self.expect_token(TokenKind::LParen, "after 'for'")?;
        self.scopes.push();
        let result = self.parse_for_clauses(loc);
        self.scopes.pop();
        result
    }

    fn parse_for_clauses(&mut self, loc: SourceLocation) -> Result<Stmt, ParseError> {
        let init_loc = self.current_location();
        let init = if self.match_token(&TokenKind::Semicolon) {
            None
        } else if self.is_type_keyword() {
            // Declaration includes the semicolon
            Some(Box::new(self.parse_variable_declaration()?))
        } else {
            let expr = self.parse_expression()?;
            self.expect_token(TokenKind::Semicolon, "after for initializer")?;
            Some(Box::new(self.make_stmt(StmtKind::Expr(expr), init_loc)))
        };

        let condition = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect_token(TokenKind::Semicolon, "after for condition")?;

        let increment = if self.check(&TokenKind::RParen) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect_token(TokenKind::RParen, "after for clauses")?;

        let body = self.parse_statement_or_block()?;

        Ok(self.make_stmt(
            StmtKind::For {
                init,
                condition,
                increment,
                body,
            },
            loc,
        ))
    }

    /// Parse a local declaration statement: `type declarator, ...;`
    pub(crate) fn parse_variable_declaration(&mut self) -> Result<Stmt, ParseError> {
        let loc = self.current_location();
        if self.match_token(&TokenKind::Extern) {
            return Err(ParseError::new(
                "'extern' is only supported at file scope",
                loc,
            ));
        }
        let base = self.parse_type_specifier()?;

        let mut decls = vec![self.parse_declarator(&base)?];
        while self.match_token(&TokenKind::Comma) {
            decls.push(self.parse_declarator(&base)?);
        }

        self.expect_token(TokenKind::Semicolon, "after variable declaration")?;
        Ok(self.make_stmt(StmtKind::Decl(decls), loc))
    }

    /// Parse statement or block (for if/while/for bodies)
    pub(crate) fn parse_statement_or_block(&mut self) -> Result<Vec<Stmt>, ParseError> {
        if self.match_token(&TokenKind::LBrace) {
            self.parse_scoped_block()
        } else {
            // A lone declaration still gets a scope of its own
            self.scopes.push();
            let statement = self.parse_statement();
            self.scopes.pop();
            Ok(vec![statement?])
        }
    }
}
