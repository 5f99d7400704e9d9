//! Recursive-descent parser.
//!
//! Grammar, with one token of lookahead and no backtracking:
//!
//! ```text
//! program    := statement* EOF
//! statement  := atom | quoted | form
//! atom       := number | string | boolean | symbol
//! quoted     := "'" symbol | "'" list
//! list       := "(" (atom | list)* ")"
//! form       := "(" "define" symbol statement ")"
//!             | "(" "define" "(" symbol params ")" body ")"
//!             | "(" "lambda" "(" params ")" body ")"
//!             | "(" "if" statement statement statement ")"
//!             | "(" "begin" body ")"
//!             | "(" "set!" symbol statement ")"
//!             | "(" "cons" statement statement ")"
//!             | "(" symbol statement* ")"
//!             | "(" "(" "lambda" "(" params ")" body ")" statement* ")"
//! params     := symbol*
//! body       := statement+
//! ```

use std::rc::Rc;

use super::ast::{Lambda, Literal, Node, Operator};
use super::token::{Keyword, Lexer, Token, TokenKind};
use super::{ParseError, ReadResult};
use crate::data::{Sym, Symbols};

pub(super) struct Parser<'a, 's> {
    lexer: Lexer<'a>,
    symbols: &'s mut Symbols,
}

/// How a token is named in error messages.
fn describe(token: &Token) -> String {
    match token.kind {
        TokenKind::Eof => "end of input".to_owned(),
        kind => format!("{kind} `{}`", token.text),
    }
}

impl<'a, 's> Parser<'a, 's> {
    pub fn new(symbols: &'s mut Symbols, input: &'a str) -> Self {
        Parser {
            lexer: Lexer::new(input),
            symbols,
        }
    }

    pub fn program(mut self) -> ReadResult<Vec<Node>> {
        let mut statements = Vec::new();
        while !self.lexer.lookahead(0).is(TokenKind::Eof) {
            statements.push(self.statement()?);
        }
        Ok(statements)
    }

    fn statement(&mut self) -> ReadResult<Node> {
        match self.lexer.lookahead(0).kind {
            TokenKind::Symbol | TokenKind::Number | TokenKind::Boolean | TokenKind::String => {
                let token = self.lexer.eat();
                self.atom(&token).map(Node::from)
            }
            TokenKind::Quote => self.quoted(),
            _ => self.form(),
        }
    }

    /// Convert a literal-typed token into its value.
    fn atom(&mut self, token: &Token) -> ReadResult<Literal> {
        match token.kind {
            TokenKind::Symbol => Ok(Literal::Symbol(self.symbols.intern(token.text))),
            TokenKind::Boolean => Ok(Literal::Boolean(token.text == "#t")),
            TokenKind::String => {
                let content = &token.text[1..token.text.len() - 1];
                Ok(Literal::String(content.into()))
            }
            TokenKind::Number => token.text.parse().map(Literal::Number).map_err(|e| {
                ParseError::new(format!("could not read number `{}`: {e}", token.text), token)
            }),
            _ => Err(ParseError::new(
                format!("unexpected {}, expecting a literal", describe(token)),
                token,
            )),
        }
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> ReadResult<Token<'a>> {
        let token = self.lexer.eat();
        if token.is(kind) {
            Ok(token)
        } else {
            Err(ParseError::new(
                format!("unexpected {}, expecting {what}", describe(&token)),
                &token,
            ))
        }
    }

    fn open(&mut self) -> ReadResult<()> {
        self.expect(TokenKind::LParen, "'('").map(|_| ())
    }

    fn close(&mut self) -> ReadResult<()> {
        self.expect(TokenKind::RParen, "')'").map(|_| ())
    }

    fn symbol(&mut self) -> ReadResult<Sym> {
        let token = self.expect(TokenKind::Symbol, "a symbol")?;
        Ok(self.symbols.intern(token.text))
    }

    /// A sub-expression that a form requires.
    /// Reports the missing part by name if the form closes early.
    fn operand(&mut self, form: Keyword, part: &str) -> ReadResult<Box<Node>> {
        let next = self.lexer.lookahead(0);
        if next.is(TokenKind::RParen) {
            return Err(ParseError::new(
                format!("`{}` is missing its {part}", form.as_str()),
                &next,
            ));
        }
        self.statement().map(Box::new)
    }

    /// Statements up to (not including) the closing paren.
    fn statements(&mut self) -> ReadResult<Vec<Node>> {
        let mut statements = Vec::new();
        while !self.lexer.lookahead(0).is(TokenKind::RParen) {
            statements.push(self.statement()?);
        }
        Ok(statements)
    }

    /// A non-empty sequence of statements.
    fn body(&mut self, form: Keyword) -> ReadResult<Vec<Node>> {
        let next = self.lexer.lookahead(0);
        let body = self.statements()?;
        if body.is_empty() {
            return Err(ParseError::new(
                format!("`{}` requires at least one body expression", form.as_str()),
                &next,
            ));
        }
        Ok(body)
    }

    /// Parameter names, up to (not including) the closing paren.
    fn params(&mut self) -> ReadResult<Vec<Sym>> {
        let mut params = Vec::new();
        while !self.lexer.lookahead(0).is(TokenKind::RParen) {
            let token = self.lexer.eat();
            if !token.is(TokenKind::Symbol) {
                return Err(ParseError::new(
                    format!("{} cannot be used as a parameter name", describe(&token)),
                    &token,
                ));
            }
            let sym = self.symbols.intern(token.text);
            if params.contains(&sym) {
                return Err(ParseError::new(
                    format!("duplicate parameter name `{}`", token.text),
                    &token,
                ));
            }
            params.push(sym);
        }
        Ok(params)
    }

    /// The remainder of a lambda, after the `lambda` keyword.
    fn lambda(&mut self) -> ReadResult<Rc<Lambda>> {
        self.open()?;
        let params = self.params()?;
        self.close()?;
        let body = self.body(Keyword::Lambda)?;
        self.close()?;
        Ok(Rc::new(Lambda { params, body }))
    }

    fn quoted(&mut self) -> ReadResult<Node> {
        self.expect(TokenKind::Quote, "'")?;
        if self.lexer.lookahead(0).is(TokenKind::LParen) {
            return Ok(Node::LiteralList(self.literal_list()?));
        }
        let token = self.lexer.eat();
        if !token.is(TokenKind::Symbol) {
            return Err(ParseError::new(
                format!(
                    "cannot quote {}; only a symbol or a list can be quoted",
                    describe(&token)
                ),
                &token,
            ));
        }
        Ok(Node::Quoted(self.symbols.intern(token.text)))
    }

    fn literal_list(&mut self) -> ReadResult<Vec<Literal>> {
        self.open()?;
        let mut items = Vec::new();
        loop {
            match self.lexer.lookahead(0).kind {
                TokenKind::RParen => break,
                TokenKind::LParen => items.push(Literal::List(self.literal_list()?)),
                _ => {
                    let token = self.lexer.eat();
                    items.push(self.atom(&token)?);
                }
            }
        }
        self.close()?;
        Ok(items)
    }

    /// A parenthesized form: special form or application.
    fn form(&mut self) -> ReadResult<Node> {
        self.open()?;
        let head = self.lexer.eat();
        let operator = match head.kind {
            TokenKind::Keyword(keyword) => return self.special_form(keyword),
            TokenKind::LParen => {
                self.expect(TokenKind::Keyword(Keyword::Lambda), "a lambda declaration")?;
                Operator::Lambda(self.lambda()?)
            }
            TokenKind::Symbol => Operator::Symbol(self.symbols.intern(head.text)),
            _ => {
                return Err(ParseError::new(
                    format!(
                        "unexpected {}, expecting a symbol, keyword or lambda declaration",
                        describe(&head)
                    ),
                    &head,
                ))
            }
        };
        let arguments = self.statements()?;
        self.close()?;
        Ok(Node::Apply {
            operator,
            arguments,
        })
    }

    /// The remainder of a special form, after its keyword.
    fn special_form(&mut self, keyword: Keyword) -> ReadResult<Node> {
        let node = match keyword {
            Keyword::Define => {
                if self.lexer.lookahead(0).is(TokenKind::LParen) {
                    // Function shorthand: (define (name params...) body...)
                    self.open()?;
                    let name = self.symbol()?;
                    let params = self.params()?;
                    self.close()?;
                    let body = self.body(keyword)?;
                    let value = Node::Lambda(Rc::new(Lambda { params, body }));
                    Node::Define {
                        name,
                        value: Box::new(value),
                    }
                } else {
                    let name = self.symbol()?;
                    let value = self.operand(keyword, "value")?;
                    Node::Define { name, value }
                }
            }
            Keyword::Lambda => {
                // lambda() consumes our closing paren.
                return Ok(Node::Lambda(self.lambda()?));
            }
            Keyword::If => Node::If {
                condition: self.operand(keyword, "condition")?,
                then: self.operand(keyword, "then branch")?,
                otherwise: self.operand(keyword, "else branch")?,
            },
            Keyword::Begin => Node::Begin(self.body(keyword)?),
            Keyword::Set => {
                let name = self.symbol()?;
                let value = self.operand(keyword, "value")?;
                Node::Set { name, value }
            }
            Keyword::Cons => {
                let car = self.operand(keyword, "car")?;
                let cdr = self.operand(keyword, "cdr")?;
                Node::Cons(car, cdr)
            }
        };
        self.close()?;
        Ok(node)
    }
}
