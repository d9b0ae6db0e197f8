//! Declaration parsing implementation
//!
//! This module handles declarations at file and block scope:
//!
//! - Function definitions: `type name(params) { ... }`
//! - Function prototypes: `[extern] type name(params);`
//! - Variable declarations: `type a, *p = init, arr[N];`
//! - Type specifiers, pointer prefixes and array suffixes
//!
//! # Grammar
//!
//! ```text
//! top_level   ::= ["extern"] specifier (function | declarators ";")
//! function    ::= pointer* identifier "(" params ")" (";" | block)
//! declarators ::= declarator ("," declarator)*
//! declarator  ::= pointer* identifier ["[" int "]"] ["=" expression]
//! specifier   ::= "int" | "char" | "void"
//! ```
//!
//! Every declarator registers its name in the current scope as soon as it is
//! parsed, so initializers and function bodies resolve against it.

use crate::interpreter::constants::{
    ALLOCATE_BUILTIN, DEALLOCATE_BUILTIN, PRINT_BUILTIN, READ_BUILTIN,
};
use crate::parser::ast::*;
use crate::parser::lexer::TokenKind;
use crate::parser::parse::{ParseError, Parser};
use crate::parser::scope::Symbol;

/// Signature of a reserved built-in: return type and parameter types
pub(crate) fn builtin_signature(name: &str) -> Option<(Type, Vec<Type>)> {
    let void_ptr = Type::void().with_pointer();
    match name {
        READ_BUILTIN => Some((Type::int(), Vec::new())),
        PRINT_BUILTIN => Some((Type::void(), vec![Type::int()])),
        ALLOCATE_BUILTIN => Some((void_ptr, vec![Type::int()])),
        DEALLOCATE_BUILTIN => Some((Type::void(), vec![void_ptr])),
        _ => None,
    }
}

impl Parser {
    /// Parse one top-level declaration, appending the resulting items
    pub(crate) fn parse_top_level_declaration(
        &mut self,
        items: &mut Vec<TopLevel>,
    ) -> Result<(), ParseError> {
        self.match_token(&TokenKind::Extern);
        let base = self.parse_type_specifier()?;

        let location = self.current_location();
        let declarator_type = self.parse_pointer_prefix(base.clone());
        let name = self.expect_identifier()?;

        if self.check(&TokenKind::LParen) {
            let function = self.parse_function_rest(name, declarator_type, location)?;
            items.push(TopLevel::Function(function));
            return Ok(());
        }

        let first = self.finish_declarator(name, declarator_type, location)?;
        items.push(TopLevel::Global(first));
        while self.match_token(&TokenKind::Comma) {
            let decl = self.parse_declarator(&base)?;
            items.push(TopLevel::Global(decl));
        }
        self.expect_token(TokenKind::Semicolon, "after declaration")
    }

    /// Parse `int`, `char` or `void`
    pub(crate) fn parse_type_specifier(&mut self) -> Result<Type, ParseError> {
        let base = match self.peek().kind {
            TokenKind::Int => BaseType::Int,
            TokenKind::Char => BaseType::Char,
            TokenKind::Void => BaseType::Void,
            _ => {
                return Err(ParseError::new(
                    format!("Expected type, found {}", self.peek()),
                    self.current_location(),
                ))
            }
        };
        self.advance();
        Ok(Type::new(base))
    }

    /// Parse a full type name as used in casts and `sizeof(type)`
    pub(crate) fn parse_type_name(&mut self) -> Result<Type, ParseError> {
        let base = self.parse_type_specifier()?;
        Ok(self.parse_pointer_prefix(base))
    }

    pub(crate) fn parse_pointer_prefix(&mut self, mut ty: Type) -> Type {
        while self.match_token(&TokenKind::Star) {
            ty = ty.with_pointer();
        }
        ty
    }

    /// Parse an optional `[N]` suffix
    fn parse_array_suffix(&mut self, ty: Type) -> Result<Type, ParseError> {
        if !self.match_token(&TokenKind::LBracket) {
            return Ok(ty);
        }

        let location = self.current_location();
        let len = match self.peek().kind {
            TokenKind::IntLiteral(n) if n > 0 => n as usize,
            _ => {
                return Err(ParseError::new(
                    "Array size must be a positive integer constant",
                    location,
                ))
            }
        };
        self.advance();
        self.expect_token(TokenKind::RBracket, "after array size")?;

        if self.check(&TokenKind::LBracket) {
            return Err(ParseError::new(
                "Multi-dimensional arrays are not supported",
                self.current_location(),
            ));
        }

        Ok(ty.with_array(len))
    }

    /// Parse a declarator after the specifier has been consumed
    pub(crate) fn parse_declarator(&mut self, base: &Type) -> Result<VarDecl, ParseError> {
        let location = self.current_location();
        let ty = self.parse_pointer_prefix(base.clone());
        let name = self.expect_identifier()?;
        self.finish_declarator(name, ty, location)
    }

    /// Array suffix, scope registration and optional initializer
    fn finish_declarator(
        &mut self,
        name: String,
        ty: Type,
        location: SourceLocation,
    ) -> Result<VarDecl, ParseError> {
        let var_type = self.parse_array_suffix(ty)?;

        if var_type.base == BaseType::Void && var_type.pointer_depth == 0 {
            return Err(ParseError::new(
                format!("Variable '{}' declared void", name),
                location,
            ));
        }
        if self.scopes.lookup_local(&name).is_some() {
            return Err(ParseError::new(
                format!("Redeclaration of '{}'", name),
                location,
            ));
        }

        let id = self.next_decl_id();
        self.scopes.declare(
            name.clone(),
            Symbol::Variable {
                id,
                var_type: var_type.clone(),
            },
        );

        let init = if self.match_token(&TokenKind::Eq) {
            if var_type.is_array() {
                return Err(ParseError::new(
                    "Array initializers are not supported",
                    self.previous_location(),
                ));
            }
            Some(self.parse_expression()?)
        } else {
            None
        };

        Ok(VarDecl {
            id,
            name,
            var_type,
            init,
            location,
        })
    }

    /// Parse the parameter list and either `;` or a body
    fn parse_function_rest(
        &mut self,
        name: String,
        return_type: Type,
        location: SourceLocation,
    ) -> Result<FunctionDecl, ParseError> {
        self.expect_token(TokenKind::LParen, "after function name")?;
        let (params, unspecified) = self.parse_parameter_list()?;
        self.expect_token(TokenKind::RParen, "after parameters")?;

        let has_body = self.check(&TokenKind::LBrace);
        let param_count = if unspecified && !has_body {
            None
        } else {
            Some(params.len())
        };

        let id = self.register_function(&name, &return_type, param_count, has_body, location)?;

        let body = if has_body {
            self.advance();
            self.scopes.push();
            for param in &params {
                if param.name.is_empty() {
                    self.scopes.pop();
                    return Err(ParseError::new(
                        format!("Unnamed parameter in definition of '{}'", name),
                        location,
                    ));
                }
                if self.scopes.lookup_local(&param.name).is_some() {
                    self.scopes.pop();
                    return Err(ParseError::new(
                        format!("Duplicate parameter '{}'", param.name),
                        location,
                    ));
                }
                self.scopes.declare(
                    param.name.clone(),
                    Symbol::Variable {
                        id: param.id,
                        var_type: param.param_type.clone(),
                    },
                );
            }
            let statements = self.parse_block_statements();
            self.scopes.pop();
            let statements = statements?;
            self.expect_token(TokenKind::RBrace, "after function body")?;
            Some(statements)
        } else {
            self.expect_token(TokenKind::Semicolon, "after function prototype")?;
            None
        };

        Ok(FunctionDecl {
            id,
            name,
            params,
            return_type,
            body,
            location,
        })
    }

    /// Merge a function declaration into file scope, reusing the identity of
    /// an earlier prototype
    fn register_function(
        &mut self,
        name: &str,
        return_type: &Type,
        param_count: Option<usize>,
        has_body: bool,
        location: SourceLocation,
    ) -> Result<DeclId, ParseError> {
        let existing = self.scopes.lookup_file(name).cloned();
        let (id, known_count, defined) = match existing {
            Some(Symbol::Function {
                id,
                return_type: previous,
                param_count: known,
                defined,
            }) => {
                if &previous != return_type {
                    return Err(ParseError::new(
                        format!("Conflicting return type for '{}'", name),
                        location,
                    ));
                }
                (id, known, defined)
            }
            Some(Symbol::Variable { .. }) => {
                return Err(ParseError::new(
                    format!("'{}' redeclared as a function", name),
                    location,
                ))
            }
            None => (self.next_decl_id(), None, false),
        };

        if defined && has_body {
            return Err(ParseError::new(
                format!("Redefinition of function '{}'", name),
                location,
            ));
        }
        if let (Some(known), Some(new)) = (known_count, param_count) {
            if known != new {
                return Err(ParseError::new(
                    format!("Conflicting parameter count for '{}'", name),
                    location,
                ));
            }
        }

        self.scopes.declare_file(
            name.to_string(),
            Symbol::Function {
                id,
                return_type: return_type.clone(),
                param_count: param_count.or(known_count),
                defined: defined || has_body,
            },
        );
        Ok(id)
    }

    /// Parse parameters; the flag reports an empty `()` list
    fn parse_parameter_list(&mut self) -> Result<(Vec<Param>, bool), ParseError> {
        let mut params = Vec::new();

        if self.check(&TokenKind::RParen) {
            return Ok((params, true));
        }

        // (void) means no parameters
        if self.check(&TokenKind::Void)
            && matches!(self.peek_ahead(1).map(|t| &t.kind), Some(TokenKind::RParen))
        {
            self.advance();
            return Ok((params, false));
        }

        loop {
            let base = self.parse_type_specifier()?;
            let mut param_type = self.parse_pointer_prefix(base);
            let name = if let TokenKind::Ident(name) = &self.peek().kind {
                let name = name.clone();
                self.advance();
                name
            } else {
                String::new()
            };

            // Array parameters decay to pointers
            if self.match_token(&TokenKind::LBracket) {
                if let TokenKind::IntLiteral(_) = self.peek().kind {
                    self.advance();
                }
                self.expect_token(TokenKind::RBracket, "in array parameter")?;
                param_type = param_type.with_pointer();
            }

            if param_type.base == BaseType::Void && param_type.pointer_depth == 0 {
                return Err(ParseError::new(
                    "Parameter declared void",
                    self.previous_location(),
                ));
            }

            params.push(Param {
                id: self.next_decl_id(),
                name,
                param_type,
            });

            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }

        Ok((params, false))
    }

    /// Declare a reserved built-in at file scope on first use
    pub(crate) fn declare_builtin(
        &mut self,
        name: &str,
        location: SourceLocation,
    ) -> Option<Symbol> {
        let (return_type, param_types) = builtin_signature(name)?;
        let id = self.next_decl_id();
        let params = param_types
            .into_iter()
            .map(|param_type| Param {
                id: self.next_decl_id(),
                name: String::new(),
                param_type,
            })
            .collect::<Vec<_>>();

        let symbol = Symbol::Function {
            id,
            return_type: return_type.clone(),
            param_count: Some(params.len()),
            defined: false,
        };
        self.scopes.declare_file(name.to_string(), symbol.clone());
        self.implicit_decls.push(FunctionDecl {
            id,
            name: name.to_string(),
            params,
            return_type,
            body: None,
            location,
        });
        Some(symbol)
    }
}
