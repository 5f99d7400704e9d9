//! Support for reading Lisp programs from source text.

use std::fmt;

use crate::data::Symbols;

pub mod ast;
mod parse;
pub mod token;

pub use ast::{Lambda, Literal, Node, Operator};
pub use token::{Keyword, Lexer, Token, TokenKind};

/// Parse the source as a program: a sequence of top-level statements.
///
/// Symbols are interned into the provided table.
/// The first malformed statement fails the whole parse.
pub fn parse_program(symbols: &mut Symbols, input: &str) -> ReadResult<Vec<Node>> {
    parse::Parser::new(symbols, input).program()
}

/// Error from reading a program.
///
/// The parser does not try to recover; this describes the first token that did not fit.
///
/// An interactive reader may see input that is malformed, e.g. "())", that no additional input can fix.
/// This is distinct from input that ends early, e.g. "(()": more input may fix the issue.
/// [`ParseError::is_incomplete`] covers this distinction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    /// Kind of the offending token.
    pub kind: TokenKind,
    /// Text of the offending token.
    pub text: String,
    pub line: usize,
    pub column: usize,
}

impl ParseError {
    pub(crate) fn new(message: impl Into<String>, token: &Token) -> Self {
        ParseError {
            message: message.into(),
            kind: token.kind,
            text: token.text.to_owned(),
            line: token.line,
            column: token.column_start,
        }
    }

    /// True if the input ended before the statement did.
    pub fn is_incomplete(&self) -> bool {
        self.kind == TokenKind::Eof
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "parse error at line {}, column {}: {}",
            self.line, self.column, self.message
        )
    }
}

impl std::error::Error for ParseError {}

/// The main result type for this module.
pub type ReadResult<T> = Result<T, ParseError>;
