//! Lexer (tokenizer) for C source code
//!
//! Converts raw source text into a flat [`Token`] stream consumed by the parser.
//! Preprocessor lines (`#include`, `#define`, ...) are skipped rather than
//! parsed; the front-end has no preprocessor.

use super::ast::SourceLocation;
use std::fmt;
use thiserror::Error;

/// Token kinds produced by the lexer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    // Literals
    IntLiteral(i64),
    CharLiteral(i8),

    // Identifiers
    Ident(String),

    // Keywords
    Int,
    Char,
    Void,
    Extern,
    If,
    Else,
    While,
    For,
    Return,
    Sizeof,

    // Arithmetic
    Plus,
    Minus,
    Star,
    Slash,
    Percent,

    // Comparison
    EqEq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,

    // Logical
    AndAnd,
    OrOr,
    Bang,

    // Bitwise
    Amp,
    Pipe,
    Caret,
    Tilde,
    LtLt,
    GtGt,

    // Assignment
    Eq,
    PlusEq,
    MinusEq,
    StarEq,
    SlashEq,
    PercentEq,

    // Increment/Decrement
    PlusPlus,
    MinusMinus,

    // Punctuation
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Semicolon,
    Comma,

    Eof,
}

/// A token together with the location where it starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub location: SourceLocation,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TokenKind::IntLiteral(n) => return write!(f, "int literal {}", n),
            TokenKind::CharLiteral(c) => {
                let byte = *c as u8;
                return if byte.is_ascii_graphic() || byte == b' ' {
                    write!(f, "char literal '{}'", byte as char)
                } else {
                    write!(f, "char literal '\\x{:02x}'", byte)
                };
            }
            TokenKind::Ident(s) => return write!(f, "identifier '{}'", s),
            TokenKind::Int => "'int'",
            TokenKind::Char => "'char'",
            TokenKind::Void => "'void'",
            TokenKind::Extern => "'extern'",
            TokenKind::If => "'if'",
            TokenKind::Else => "'else'",
            TokenKind::While => "'while'",
            TokenKind::For => "'for'",
            TokenKind::Return => "'return'",
            TokenKind::Sizeof => "'sizeof'",
            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::Star => "'*'",
            TokenKind::Slash => "'/'",
            TokenKind::Percent => "'%'",
            TokenKind::EqEq => "'=='",
            TokenKind::NotEq => "'!='",
            TokenKind::Lt => "'<'",
            TokenKind::Le => "'<='",
            TokenKind::Gt => "'>'",
            TokenKind::Ge => "'>='",
            TokenKind::AndAnd => "'&&'",
            TokenKind::OrOr => "'||'",
            TokenKind::Bang => "'!'",
            TokenKind::Amp => "'&'",
            TokenKind::Pipe => "'|'",
            TokenKind::Caret => "'^'",
            TokenKind::Tilde => "'~'",
            TokenKind::LtLt => "'<<'",
            TokenKind::GtGt => "'>>'",
            TokenKind::Eq => "'='",
            TokenKind::PlusEq => "'+='",
            TokenKind::MinusEq => "'-='",
            TokenKind::StarEq => "'*='",
            TokenKind::SlashEq => "'/='",
            TokenKind::PercentEq => "'%='",
            TokenKind::PlusPlus => "'++'",
            TokenKind::MinusMinus => "'--'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::Semicolon => "';'",
            TokenKind::Comma => "','",
            TokenKind::Eof => "end of file",
        };
        f.write_str(text)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.kind.fmt(f)
    }
}

/// Lexer error type
#[derive(Debug, Clone, Error)]
#[error("Lexer error at line {}, column {}: {message}", .location.line, .location.column)]
pub struct LexError {
    pub message: String,
    pub location: SourceLocation,
}

/// Lexer for C source code
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    /// Create a new lexer for the given source string.
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
        }
    }

    /// Tokenize the entire input
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace_and_comments()?;

            if self.is_at_end() {
                tokens.push(Token {
                    kind: TokenKind::Eof,
                    location: self.current_location(),
                });
                break;
            }

            if self.peek() == Some('#') {
                self.skip_preprocessor_directive();
                continue;
            }

            tokens.push(self.next_token()?);
        }

        Ok(tokens)
    }

    /// Get next token
    fn next_token(&mut self) -> Result<Token, LexError> {
        let location = self.current_location();
        let ch = self.advance().ok_or_else(|| LexError {
            message: "Unexpected end of file".to_string(),
            location,
        })?;

        let kind = match ch {
            '\'' => self.char_literal(location)?,
            '0'..='9' => self.number_literal(ch, location)?,
            'a'..='z' | 'A'..='Z' | '_' => self.identifier_or_keyword(ch),

            '+' => self.pick(&[('+', TokenKind::PlusPlus), ('=', TokenKind::PlusEq)], TokenKind::Plus),
            '-' => self.pick(
                &[('-', TokenKind::MinusMinus), ('=', TokenKind::MinusEq)],
                TokenKind::Minus,
            ),
            '*' => self.pick(&[('=', TokenKind::StarEq)], TokenKind::Star),
            '/' => self.pick(&[('=', TokenKind::SlashEq)], TokenKind::Slash),
            '%' => self.pick(&[('=', TokenKind::PercentEq)], TokenKind::Percent),
            '=' => self.pick(&[('=', TokenKind::EqEq)], TokenKind::Eq),
            '!' => self.pick(&[('=', TokenKind::NotEq)], TokenKind::Bang),
            '<' => self.pick(&[('=', TokenKind::Le), ('<', TokenKind::LtLt)], TokenKind::Lt),
            '>' => self.pick(&[('=', TokenKind::Ge), ('>', TokenKind::GtGt)], TokenKind::Gt),
            '&' => self.pick(&[('&', TokenKind::AndAnd)], TokenKind::Amp),
            '|' => self.pick(&[('|', TokenKind::OrOr)], TokenKind::Pipe),
            '^' => TokenKind::Caret,
            '~' => TokenKind::Tilde,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            ';' => TokenKind::Semicolon,
            ',' => TokenKind::Comma,

            _ => {
                return Err(LexError {
                    message: format!("Unexpected character: '{}'", ch),
                    location,
                })
            }
        };

        Ok(Token { kind, location })
    }

    /// Consume a second character if it matches one of `pairs`, otherwise
    /// produce the single-character `fallback`
    fn pick(&mut self, pairs: &[(char, TokenKind)], fallback: TokenKind) -> TokenKind {
        for (next, kind) in pairs {
            if self.peek() == Some(*next) {
                self.advance();
                return kind.clone();
            }
        }
        fallback
    }

    /// Parse character literal (opening quote already consumed)
    fn char_literal(&mut self, location: SourceLocation) -> Result<TokenKind, LexError> {
        let ch = self.advance().ok_or_else(|| LexError {
            message: "Unexpected end of file in character literal".to_string(),
            location,
        })?;

        let value = if ch == '\\' {
            let escaped = self.advance().ok_or_else(|| LexError {
                message: "Unexpected end of file in character literal".to_string(),
                location,
            })?;

            match escaped {
                'n' => b'\n' as i8,
                't' => b'\t' as i8,
                'r' => b'\r' as i8,
                '\\' => b'\\' as i8,
                '\'' => b'\'' as i8,
                '"' => b'"' as i8,
                '0' => 0,
                'x' => {
                    let mut hex = String::new();
                    while let Some(c) = self.peek() {
                        if c.is_ascii_hexdigit() && hex.len() < 2 {
                            hex.push(c);
                            self.advance();
                        } else {
                            break;
                        }
                    }
                    u8::from_str_radix(&hex, 16)
                        .map(|v| v as i8)
                        .map_err(|_| LexError {
                            message: format!("Invalid hex escape sequence: \\x{}", hex),
                            location,
                        })?
                }
                _ => {
                    return Err(LexError {
                        message: format!("Unknown escape sequence: \\{}", escaped),
                        location,
                    });
                }
            }
        } else if ch.is_ascii() {
            ch as u8 as i8
        } else {
            return Err(LexError {
                message: format!("Non-ASCII character literal: '{}'", ch),
                location,
            });
        };

        if self.advance() != Some('\'') {
            return Err(LexError {
                message: "Expected closing quote in character literal".to_string(),
                location,
            });
        }

        Ok(TokenKind::CharLiteral(value))
    }

    /// Parse decimal integer literal
    fn number_literal(
        &mut self,
        first_digit: char,
        location: SourceLocation,
    ) -> Result<TokenKind, LexError> {
        let mut num_str = String::new();
        num_str.push(first_digit);

        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                num_str.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        let value = num_str.parse::<i64>().map_err(|_| LexError {
            message: format!("Invalid integer literal: {}", num_str),
            location,
        })?;

        Ok(TokenKind::IntLiteral(value))
    }

    /// Parse identifier or keyword
    fn identifier_or_keyword(&mut self, first_char: char) -> TokenKind {
        let mut ident = String::new();
        ident.push(first_char);

        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                ident.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        match ident.as_str() {
            "int" => TokenKind::Int,
            "char" => TokenKind::Char,
            "void" => TokenKind::Void,
            "extern" => TokenKind::Extern,
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "while" => TokenKind::While,
            "for" => TokenKind::For,
            "return" => TokenKind::Return,
            "sizeof" => TokenKind::Sizeof,
            _ => TokenKind::Ident(ident),
        }
    }

    /// Skip whitespace and comments
    fn skip_whitespace_and_comments(&mut self) -> Result<(), LexError> {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.advance();
                }
                Some('/') => {
                    if self.peek_ahead(1) == Some('/') {
                        self.skip_line_comment();
                    } else if self.peek_ahead(1) == Some('*') {
                        self.skip_block_comment()?;
                    } else {
                        break;
                    }
                }
                _ => break,
            }
        }
        Ok(())
    }

    /// Skip single-line comment (// ...)
    fn skip_line_comment(&mut self) {
        while let Some(ch) = self.advance() {
            if ch == '\n' {
                break;
            }
        }
    }

    /// Skip multi-line comment (/* ... */)
    fn skip_block_comment(&mut self) -> Result<(), LexError> {
        let start_loc = self.current_location();
        self.advance(); // '/'
        self.advance(); // '*'

        while !self.is_at_end() {
            if self.peek() == Some('*') && self.peek_ahead(1) == Some('/') {
                self.advance();
                self.advance();
                return Ok(());
            }
            self.advance();
        }

        Err(LexError {
            message: "Unterminated block comment".to_string(),
            location: start_loc,
        })
    }

    /// Skip preprocessor directive (#include, etc.)
    fn skip_preprocessor_directive(&mut self) {
        while let Some(ch) = self.advance() {
            if ch == '\n' {
                break;
            }
        }
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_ahead(&self, n: usize) -> Option<char> {
        self.input.get(self.position + n).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = *self.input.get(self.position)?;
        self.position += 1;

        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }

        Some(ch)
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    fn current_location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_simple_tokens() {
        let tokens = kinds("int main() { return 0; }");
        assert_eq!(
            tokens,
            vec![
                TokenKind::Int,
                TokenKind::Ident("main".to_string()),
                TokenKind::LParen,
                TokenKind::RParen,
                TokenKind::LBrace,
                TokenKind::Return,
                TokenKind::IntLiteral(0),
                TokenKind::Semicolon,
                TokenKind::RBrace,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_operators() {
        let tokens = kinds("++ -- += -= == != && || << >= %=");
        assert_eq!(
            &tokens[..11],
            &[
                TokenKind::PlusPlus,
                TokenKind::MinusMinus,
                TokenKind::PlusEq,
                TokenKind::MinusEq,
                TokenKind::EqEq,
                TokenKind::NotEq,
                TokenKind::AndAnd,
                TokenKind::OrOr,
                TokenKind::LtLt,
                TokenKind::Ge,
                TokenKind::PercentEq,
            ]
        );
    }

    #[test]
    fn test_comments_and_preprocessor() {
        let tokens = kinds("#include <stdio.h>\nint x; // c\n/* block\n */ extern");
        assert_eq!(
            tokens,
            vec![
                TokenKind::Int,
                TokenKind::Ident("x".to_string()),
                TokenKind::Semicolon,
                TokenKind::Extern,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_char_literals() {
        let tokens = kinds(r"'a' '\n' '\x7f' '\xff'");
        assert_eq!(tokens[0], TokenKind::CharLiteral(97));
        assert_eq!(tokens[1], TokenKind::CharLiteral(10));
        assert_eq!(tokens[2], TokenKind::CharLiteral(127));
        assert_eq!(tokens[3], TokenKind::CharLiteral(-1));
    }

    #[test]
    fn test_locations() {
        let tokens = Lexer::new("int\n  x;").tokenize().unwrap();
        assert_eq!(tokens[1].location, SourceLocation::new(2, 3));
    }

    #[test]
    fn test_errors() {
        assert!(Lexer::new("int $x;").tokenize().is_err());
        assert!(Lexer::new("/* open").tokenize().is_err());
        assert!(Lexer::new("'ab'").tokenize().is_err());
    }
}
