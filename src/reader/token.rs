//! Module for extracting Lisp tokens from source text.
//!
//! The lexer is lazy: tokens are produced one at a time from a cursor into the input.
//! It has two modes of consumption, which share the same rule table:
//! - [`Lexer::eat`] skips whitespace, line ends and comments, and is what the parser uses.
//! - [`Lexer::eat_all`] returns every token, including that trivia,
//!   so that the concatenated token texts reproduce the input exactly.
//!   This is what presentation (e.g. syntax coloring) works from.
//!
//! Unrecognized input is not an error at this level; it produces a
//! [`TokenKind::Unrecognized`] token, and the consumer decides what to do with it.

use std::fmt;

/// The reserved words that introduce special forms.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Keyword {
    Define,
    Lambda,
    If,
    Begin,
    Set,
    Cons,
}

impl Keyword {
    pub const ALL: [Keyword; 6] = [
        Keyword::Define,
        Keyword::Lambda,
        Keyword::If,
        Keyword::Begin,
        Keyword::Set,
        Keyword::Cons,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::Define => "define",
            Keyword::Lambda => "lambda",
            Keyword::If => "if",
            Keyword::Begin => "begin",
            Keyword::Set => "set!",
            Keyword::Cons => "cons",
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TokenKind {
    LParen,
    RParen,
    Quote,
    Keyword(Keyword),
    Number,
    String,
    Boolean,
    Symbol,
    Comment,
    Whitespace,
    Eol,
    Eof,
    Unrecognized,
}

impl TokenKind {
    /// Trivia is skipped by the parser, but kept for presentation.
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            TokenKind::Comment | TokenKind::Whitespace | TokenKind::Eol
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::LParen | TokenKind::RParen | TokenKind::Quote => write!(f, "punctuation"),
            TokenKind::Keyword(_) => write!(f, "keyword"),
            TokenKind::Number => write!(f, "number"),
            TokenKind::String => write!(f, "string"),
            TokenKind::Boolean => write!(f, "boolean"),
            TokenKind::Symbol => write!(f, "symbol"),
            TokenKind::Comment => write!(f, "comment"),
            TokenKind::Whitespace => write!(f, "whitespace"),
            TokenKind::Eol => write!(f, "end of line"),
            TokenKind::Eof => write!(f, "end of input"),
            TokenKind::Unrecognized => write!(f, "unrecognized input"),
        }
    }
}

/// A token along with its position in the input.
///
/// Lines and columns are 1-indexed; `column_end` is one past the last character.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub line: usize,
    pub column_start: usize,
    pub column_end: usize,
}

impl Token<'_> {
    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

mod regex {
    use super::{Keyword, TokenKind};
    use regex::Regex;
    use std::sync::OnceLock;

    pub(super) struct Rule {
        pub kind: TokenKind,
        pub pattern: Regex,
        /// The match only counts if it is not immediately followed by a symbol character.
        pub whole_word: bool,
    }

    fn rule(kind: TokenKind, pattern: &str, whole_word: bool) -> Rule {
        let pattern = Regex::new(pattern)
            .unwrap_or_else(|e| panic!("could not compile regex for {kind}: {e}"));
        Rule {
            kind,
            pattern,
            whole_word,
        }
    }

    /// Tokenizing rules, in priority order.
    /// Keywords come before symbols, and decimals before integers.
    pub(super) fn rules() -> &'static [Rule] {
        static RULES: OnceLock<Vec<Rule>> = OnceLock::new();
        RULES.get_or_init(|| {
            let mut rules = vec![
                rule(TokenKind::Comment, r"\A;;[^\n]*", false),
                rule(TokenKind::Eol, r"\A\r?\n", false),
                rule(TokenKind::Whitespace, r"\A[^\S\n]+", false),
                rule(TokenKind::LParen, r"\A\(", false),
                rule(TokenKind::RParen, r"\A\)", false),
                rule(TokenKind::Quote, r"\A'", false),
            ];
            rules.extend(Keyword::ALL.into_iter().map(|keyword| {
                rule(
                    TokenKind::Keyword(keyword),
                    &format!(r"\A{}", regex::escape(keyword.as_str())),
                    true,
                )
            }));
            rules.extend([
                rule(TokenKind::Boolean, r"\A#[tf]", true),
                rule(TokenKind::Number, r"\A[+-]?[0-9]+\.[0-9]*", false),
                rule(TokenKind::Number, r"\A[+-]?[0-9]+", false),
                rule(TokenKind::String, r#"\A"[^"]*""#, false),
                rule(
                    TokenKind::Symbol,
                    r"\A[A-Za-z+\-*/_?!~{}\[\]=<>%][A-Za-z0-9+\-*/_?!~{}\[\]=<>%]*",
                    false,
                ),
            ]);
            rules
        })
    }
}

/// Whether the character may appear after the first character of a symbol.
fn is_symbol_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "+-*/_?!~{}[]=<>%".contains(c)
}

/// A cursor over source text, producing tokens on demand.
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    input: &'a str,
    cursor: usize,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer {
            input,
            cursor: 0,
            line: 1,
            column: 1,
        }
    }

    /// Match the next token at the cursor, without moving it.
    fn next_raw(&self) -> (TokenKind, &'a str) {
        let rest = &self.input[self.cursor..];
        let Some(first) = rest.chars().next() else {
            return (TokenKind::Eof, "");
        };

        for rule in regex::rules() {
            let Some(found) = rule.pattern.find(rest) else {
                continue;
            };
            if rule.whole_word && rest[found.end()..].starts_with(is_symbol_char) {
                continue;
            }
            return (rule.kind, found.as_str());
        }
        (TokenKind::Unrecognized, &rest[..first.len_utf8()])
    }

    /// Consume the next token, whatever it is.
    /// At the end of input this returns an (empty) end-of-input token, and does not advance.
    pub fn eat_all(&mut self) -> Token<'a> {
        let (kind, text) = self.next_raw();
        let line = self.line;
        let column_start = self.column;

        self.cursor += text.len();
        for ch in text.chars() {
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }

        Token {
            kind,
            text,
            line,
            column_start,
            column_end: self.column,
        }
    }

    /// Consume the next significant token, skipping over trivia.
    pub fn eat(&mut self) -> Token<'a> {
        loop {
            let token = self.eat_all();
            if !token.kind.is_trivia() {
                return token;
            }
        }
    }

    /// Peek at a significant token without consuming anything.
    /// Offset 0 is the token the next `eat` returns; past the end, this is end-of-input.
    pub fn lookahead(&self, offset: usize) -> Token<'a> {
        let mut peek = self.clone();
        for _ in 0..offset {
            peek.eat();
        }
        peek.eat()
    }

    /// Iterate over every remaining token, trivia included, up to (not including) end-of-input.
    pub fn with_trivia(self) -> WithTrivia<'a> {
        WithTrivia { lexer: self }
    }
}

/// Iterates over significant tokens, up to (not including) end-of-input.
impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let token = self.eat();
        (token.kind != TokenKind::Eof).then_some(token)
    }
}

/// See [`Lexer::with_trivia`].
pub struct WithTrivia<'a> {
    lexer: Lexer<'a>,
}

impl<'a> Iterator for WithTrivia<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let token = self.lexer.eat_all();
        (token.kind != TokenKind::Eof).then_some(token)
    }
}
