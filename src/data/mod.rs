//! Lisp data types.
//!
//! Runtime values are a closed set: numbers, strings, symbols, booleans,
//! the empty list (`Null`), pairs, closures and references to native functions.
//!
//! Scopes live in an arena owned by the [`Environment`]. Closures refer to their
//! defining frame by index rather than by pointer, so a closure stored in the
//! frame it captures does not form a reference cycle; the whole arena is freed
//! when the environment is dropped.
//!
//! Two conventions apply to the empty list, `Null`:
//! -   It is false, like `#f`, `0` and `""`.
//! -   It renders as empty text. As the terminator of a list it just closes the parenthesis.

use std::fmt;
use std::rc::Rc;

use crate::reader::Lambda;

mod environment;
mod symbols;

pub use environment::{Environment, EnvironmentStats, FrameId};
pub use symbols::{Sym, Symbols};

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    String(Rc<str>),
    Symbol(Sym),
    Boolean(bool),
    Null,
    Pair(Rc<Pair>),
    Closure(Rc<Closure>),
    Native(NativeRef),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pair {
    pub car: Value,
    pub cdr: Value,
}

/// A user-defined function: a lambda, plus the frame it was created in.
#[derive(Debug, Clone, PartialEq)]
pub struct Closure {
    pub lambda: Rc<Lambda>,
    pub env: FrameId,
}

impl Closure {
    pub fn arity(&self) -> usize {
        self.lambda.params.len()
    }
}

/// The name of a function in the native registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NativeRef(Rc<str>);

impl NativeRef {
    pub fn new(name: impl Into<Rc<str>>) -> Self {
        NativeRef(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.into())
    }
}

impl Value {
    pub fn cons(car: Value, cdr: Value) -> Value {
        Value::Pair(Rc::new(Pair { car, cdr }))
    }

    /// Build a proper list: a right-nested chain of pairs, terminated by `Null`.
    pub fn list<I>(values: I) -> Value
    where
        I: IntoIterator<Item = Value>,
        I::IntoIter: DoubleEndedIterator,
    {
        values
            .into_iter()
            .rev()
            .fold(Value::Null, |cdr, car| Value::cons(car, cdr))
    }

    /// Whether the value selects the "then" branch of a conditional.
    ///
    /// False values are exactly: `#f`, the number zero, the empty string, and `Null`.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Boolean(b) => *b,
            Value::Number(n) => *n != 0.0,
            Value::String(s) => !s.is_empty(),
            Value::Null => false,
            Value::Symbol(_) | Value::Pair(_) | Value::Closure(_) | Value::Native(_) => true,
        }
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, Value::Closure(_) | Value::Native(_))
    }

    /// Name of the value's type, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Symbol(_) => "symbol",
            Value::Boolean(_) => "boolean",
            Value::Null => "null",
            Value::Pair(_) => "pair",
            Value::Closure(_) => "function",
            Value::Native(_) => "native function",
        }
    }

    /// Canonical textual form. Symbols are resolved through the given table.
    pub fn display<'a>(&'a self, symbols: &'a Symbols) -> Display<'a> {
        Display {
            value: self,
            symbols,
        }
    }
}

/// See [`Value::display`].
pub struct Display<'a> {
    value: &'a Value,
    symbols: &'a Symbols,
}

impl fmt::Display for Display<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbols = self.symbols;
        match self.value {
            Value::Number(n) => write!(f, "{n}"),
            Value::String(s) => write!(f, "{s}"),
            Value::Symbol(sym) => write!(f, "{}", symbols.resolve(*sym)),
            Value::Boolean(true) => write!(f, "#t"),
            Value::Boolean(false) => write!(f, "#f"),
            Value::Null => Ok(()),
            Value::Closure(closure) => write!(f, "function {}", closure.arity()),
            Value::Native(native) => write!(f, "native {}", native.name()),
            Value::Pair(pair) => {
                write!(f, "({}", pair.car.display(symbols))?;
                let mut tail = &pair.cdr;
                loop {
                    match tail {
                        Value::Pair(next) => {
                            write!(f, " {}", next.car.display(symbols))?;
                            tail = &next.cdr;
                        }
                        Value::Null => break,
                        improper => {
                            write!(f, " . {}", improper.display(symbols))?;
                            break;
                        }
                    }
                }
                write!(f, ")")
            }
        }
    }
}
