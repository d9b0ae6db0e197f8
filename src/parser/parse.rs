//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct and core parsing infrastructure,
//! including the error type, token helpers, node/declaration numbering and the
//! main parse entry point.
//!
//! # Parser Architecture
//!
//! The Parser uses a recursive descent approach with the following organization:
//! - This module: Parser struct, helper methods, and coordination
//! - `declarations`: top-level functions, prototypes, globals and declarators
//! - `statements`: statements (if, while, for, return, blocks, ...)
//! - `expressions`: expressions with one method per precedence level
//! - `scope`: lexical scopes mapping names to declaration identities
//!
//! Name resolution and typing happen while parsing, so the [`Program`] handed
//! to the interpreter is already resolved: every variable reference carries
//! its [`DeclId`] and every expression its static [`Type`].

use crate::parser::ast::*;
use crate::parser::lexer::{LexError, Lexer, Token, TokenKind};
use crate::parser::scope::Scopes;
use thiserror::Error;

/// Parser error type
#[derive(Debug, Clone, Error)]
#[error("Parse error at line {}, column {}: {message}", .location.line, .location.column)]
pub struct ParseError {
    pub message: String,
    pub location: SourceLocation,
}

impl ParseError {
    pub(crate) fn new(message: impl Into<String>, location: SourceLocation) -> Self {
        ParseError {
            message: message.into(),
            location,
        }
    }
}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        ParseError {
            message: err.message,
            location: err.location,
        }
    }
}

/// Recursive descent parser for the C subset
pub struct Parser {
    pub(crate) tokens: Vec<Token>,
    pub(crate) position: usize,
    pub(crate) scopes: Scopes,
    /// Built-ins declared on first use, prepended to the program
    pub(crate) implicit_decls: Vec<FunctionDecl>,
    next_node: NodeId,
    next_decl: DeclId,
}

impl Parser {
    pub fn new(source: &str) -> Result<Self, ParseError> {
        let mut lexer = Lexer::new(source);
        let tokens = lexer.tokenize()?;
        Ok(Self {
            tokens,
            position: 0,
            scopes: Scopes::new(),
            implicit_decls: Vec::new(),
            next_node: 0,
            next_decl: 0,
        })
    }

    /// Parse the entire program (top-level declarations)
    pub fn parse_program(&mut self) -> Result<Program, ParseError> {
        let mut items = Vec::new();

        while !self.is_at_end() {
            self.parse_top_level_declaration(&mut items)?;
        }

        let mut program = Program::new();
        program.items = self
            .implicit_decls
            .drain(..)
            .map(TopLevel::Function)
            .chain(items)
            .collect();

        Ok(program)
    }

    // ===== Numbering =====

    pub(crate) fn next_node_id(&mut self) -> NodeId {
        let id = self.next_node;
        self.next_node += 1;
        id
    }

    pub(crate) fn next_decl_id(&mut self) -> DeclId {
        let id = self.next_decl;
        self.next_decl += 1;
        id
    }

    pub(crate) fn make_expr(&mut self, kind: ExprKind, ty: Type, location: SourceLocation) -> Expr {
        Expr {
            id: self.next_node_id(),
            kind,
            ty,
            location,
        }
    }

    pub(crate) fn make_stmt(&mut self, kind: StmtKind, location: SourceLocation) -> Stmt {
        Stmt {
            id: self.next_node_id(),
            kind,
            location,
        }
    }

    // ===== Token helpers =====

    pub(crate) fn is_type_keyword(&self) -> bool {
        matches!(
            self.peek().kind,
            TokenKind::Int | TokenKind::Char | TokenKind::Void | TokenKind::Extern
        )
    }

    pub(crate) fn match_token(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        &self.peek().kind == kind
    }

    pub(crate) fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.position += 1;
        }
        self.previous()
    }

    pub(crate) fn is_at_end(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Eof)
    }

    pub(crate) fn peek(&self) -> &Token {
        &self.tokens[self.position]
    }

    pub(crate) fn peek_ahead(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.position + n)
    }

    pub(crate) fn previous(&self) -> &Token {
        &self.tokens[self.position.saturating_sub(1)]
    }

    pub(crate) fn previous_location(&self) -> SourceLocation {
        self.previous().location
    }

    pub(crate) fn current_location(&self) -> SourceLocation {
        self.peek().location
    }

    pub(crate) fn expect_token(&mut self, kind: TokenKind, context: &str) -> Result<(), ParseError> {
        if self.check(&kind) {
            self.advance();
            Ok(())
        } else {
            Err(ParseError::new(
                format!("Expected {} {}, found {}", kind, context, self.peek()),
                self.current_location(),
            ))
        }
    }

    pub(crate) fn expect_identifier(&mut self) -> Result<String, ParseError> {
        if let TokenKind::Ident(name) = &self.peek().kind {
            let name = name.clone();
            self.advance();
            Ok(name)
        } else {
            Err(ParseError::new(
                format!("Expected identifier, found {}", self.peek()),
                self.current_location(),
            ))
        }
    }
}
