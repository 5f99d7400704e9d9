//! Syntax tree produced by the parser.
//!
//! Special forms are resolved at parse time, so the evaluator never has to
//! inspect a list to decide what kind of form it is.

use std::rc::Rc;

use crate::data::Sym;

/// A statement: anything that can appear at top level or as a sub-expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Symbol(Sym),
    Number(f64),
    String(Rc<str>),
    Boolean(bool),
    /// `'name`
    Quoted(Sym),
    /// `'(a "b" (1 2))`: data, never evaluated.
    LiteralList(Vec<Literal>),
    /// `(cons car cdr)`
    Cons(Box<Node>, Box<Node>),
    /// `(define name value)`, or the desugared `(define (name args...) body...)`.
    Define { name: Sym, value: Box<Node> },
    Lambda(Rc<Lambda>),
    If {
        condition: Box<Node>,
        then: Box<Node>,
        otherwise: Box<Node>,
    },
    /// Non-empty.
    Begin(Vec<Node>),
    Set { name: Sym, value: Box<Node> },
    Apply {
        operator: Operator,
        arguments: Vec<Node>,
    },
}

/// An element of a quoted list.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Symbol(Sym),
    Number(f64),
    String(Rc<str>),
    Boolean(bool),
    List(Vec<Literal>),
}

/// A literal in statement position. A symbol there is a variable reference;
/// a list can only be data.
impl From<Literal> for Node {
    fn from(literal: Literal) -> Self {
        match literal {
            Literal::Symbol(sym) => Node::Symbol(sym),
            Literal::Number(n) => Node::Number(n),
            Literal::String(s) => Node::String(s),
            Literal::Boolean(b) => Node::Boolean(b),
            Literal::List(items) => Node::LiteralList(items),
        }
    }
}

/// Parameters and body of a function.
///
/// Shared between the syntax tree and every closure created from it.
#[derive(Debug, Clone, PartialEq)]
pub struct Lambda {
    /// Unique, in order.
    pub params: Vec<Sym>,
    /// Non-empty.
    pub body: Vec<Node>,
}

/// What appears in the operator position of an application.
#[derive(Debug, Clone, PartialEq)]
pub enum Operator {
    Symbol(Sym),
    Lambda(Rc<Lambda>),
}
